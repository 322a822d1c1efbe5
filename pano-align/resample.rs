use image::Rgb;
use pano_core::{Homography, Point, RgbImage};
use rayon::prelude::*;

/// Inverse-mapping image warp onto a fixed-size output grid
pub trait Resampler: Send + Sync {
    /// Output pixel `(x, y)` samples `source` at `inverse(x, y)`; samples that
    /// fall outside `source` (or at infinity) are zero.
    fn warp(&self, source: &RgbImage, inverse: &Homography, width: u32, height: u32) -> RgbImage;
}

/// First-order (bilinear) interpolation with a constant zero border
#[derive(Debug, Clone, Copy, Default)]
pub struct BilinearResampler;

impl BilinearResampler {
    /// Sample at fractional `(x, y)`, reading zero outside the image
    #[inline]
    pub fn sample(source: &RgbImage, x: f64, y: f64) -> Rgb<f32> {
        let (w, h) = (source.width() as i64, source.height() as i64);
        // Anything further than one pixel outside has no support
        if !(x > -1.0 && y > -1.0 && x < w as f64 && y < h as f64) {
            return Rgb([0.0; 3]);
        }
        let x0 = x.floor() as i64;
        let y0 = y.floor() as i64;
        let fx = (x - x0 as f64) as f32;
        let fy = (y - y0 as f64) as f32;

        let fetch = |px: i64, py: i64| -> [f32; 3] {
            if px < 0 || py < 0 || px >= w || py >= h {
                [0.0; 3]
            } else {
                source.get_pixel(px as u32, py as u32).0
            }
        };
        let p00 = fetch(x0, y0);
        let p10 = fetch(x0 + 1, y0);
        let p01 = fetch(x0, y0 + 1);
        let p11 = fetch(x0 + 1, y0 + 1);

        let mut out = [0.0f32; 3];
        for c in 0..3 {
            let top = p00[c] * (1.0 - fx) + p10[c] * fx;
            let bottom = p01[c] * (1.0 - fx) + p11[c] * fx;
            out[c] = top * (1.0 - fy) + bottom * fy;
        }
        Rgb(out)
    }
}

impl Resampler for BilinearResampler {
    fn warp(&self, source: &RgbImage, inverse: &Homography, width: u32, height: u32) -> RgbImage {
        let mut out = RgbImage::new(width, height);
        if width == 0 || height == 0 || source.width() == 0 || source.height() == 0 {
            return out;
        }
        let row_len = width as usize * 3;
        out.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
            for (x, px) in row.chunks_exact_mut(3).enumerate() {
                let Some(p) = inverse.apply(&Point::new(x as f64, y as f64)) else {
                    continue;
                };
                px.copy_from_slice(&Self::sample(source, p.x, p.y).0);
            }
        });
        out
    }
}
