use image::Rgb;
use pano_core::filter::{gaussian_blur_plane, Border};
use pano_core::RgbImage;

/// Shrinks a patch to `out_size x out_size` without aliasing
pub trait AreaDownsampler: Send + Sync {
    fn downsample(&self, patch: &RgbImage, out_size: u32) -> RgbImage;
}

/// Gaussian pre-filter (`sigma = (scale - 1) / 2`, mirrored borders) followed
/// by bilinear sampling at output pixel centres. Value range is preserved.
#[derive(Debug, Clone, Copy, Default)]
pub struct GaussianAreaDownsampler;

impl AreaDownsampler for GaussianAreaDownsampler {
    fn downsample(&self, patch: &RgbImage, out_size: u32) -> RgbImage {
        let (w, h) = (patch.width() as usize, patch.height() as usize);
        if w == 0 || h == 0 || out_size == 0 {
            return RgbImage::new(out_size, out_size);
        }
        let scale_x = w as f32 / out_size as f32;
        let scale_y = h as f32 / out_size as f32;
        // Isotropic filter, patches are square
        let sigma = ((scale_x.max(scale_y) - 1.0) / 2.0).max(0.0);

        let planes: Vec<Vec<f32>> = (0..3)
            .map(|c| {
                let plane: Vec<f32> = patch.pixels().map(|p| p[c]).collect();
                gaussian_blur_plane(&plane, w, h, sigma, Border::Mirror)
            })
            .collect();

        RgbImage::from_fn(out_size, out_size, |ox, oy| {
            let sx = (ox as f32 + 0.5) * scale_x - 0.5;
            let sy = (oy as f32 + 0.5) * scale_y - 0.5;
            Rgb([
                bilinear_clamped(&planes[0], w, h, sx, sy),
                bilinear_clamped(&planes[1], w, h, sx, sy),
                bilinear_clamped(&planes[2], w, h, sx, sy),
            ])
        })
    }
}

/// Bilinear interpolation, coordinates clamped to the plane
fn bilinear_clamped(plane: &[f32], width: usize, height: usize, x: f32, y: f32) -> f32 {
    let x = x.clamp(0.0, (width - 1) as f32);
    let y = y.clamp(0.0, (height - 1) as f32);
    let x0 = x.floor() as usize;
    let y0 = y.floor() as usize;
    let x1 = (x0 + 1).min(width - 1);
    let y1 = (y0 + 1).min(height - 1);
    let dx = x - x0 as f32;
    let dy = y - y0 as f32;

    let p00 = plane[y0 * width + x0];
    let p10 = plane[y0 * width + x1];
    let p01 = plane[y1 * width + x0];
    let p11 = plane[y1 * width + x1];

    let top = p00 * (1.0 - dx) + p10 * dx;
    let bottom = p01 * (1.0 - dx) + p11 * dx;
    top * (1.0 - dy) + bottom * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_patch_stays_constant() {
        let patch = RgbImage::from_pixel(40, 40, Rgb([0.2, 0.5, 3.0]));
        let out = GaussianAreaDownsampler.downsample(&patch, 8);
        assert_eq!(out.dimensions(), (8, 8));
        for p in out.pixels() {
            assert!((p[0] - 0.2).abs() < 1e-5);
            assert!((p[1] - 0.5).abs() < 1e-5);
            assert!((p[2] - 3.0).abs() < 1e-4);
        }
    }

    #[test]
    fn test_high_frequency_is_suppressed() {
        // Single-pixel stripes alias badly under nearest-neighbour sampling
        let patch = RgbImage::from_fn(40, 40, |x, _| {
            let v = if x % 2 == 0 { 1.0 } else { 0.0 };
            Rgb([v, v, v])
        });
        let out = GaussianAreaDownsampler.downsample(&patch, 8);
        for p in out.pixels() {
            assert!((p[0] - 0.5).abs() < 0.05, "aliased value {}", p[0]);
        }
    }

    #[test]
    fn test_identity_size_is_copy() {
        let patch = RgbImage::from_fn(5, 5, |x, y| Rgb([x as f32, y as f32, 1.0]));
        let out = GaussianAreaDownsampler.downsample(&patch, 5);
        assert_eq!(out, patch);
    }
}
