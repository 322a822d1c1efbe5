use image::{ImageBuffer, Luma};
use pano_core::filter::{gaussian_blur_plane, Border};
use pano_core::{ResponseMap, RgbImage};
use rayon::prelude::*;

use crate::error::{DetectError, DetectResult};

/// Single-channel float image
pub type GrayImage = ImageBuffer<Luma<f32>, Vec<f32>>;

/// Produces a same-size corner strength grid for an image
pub trait CornerResponse: Send + Sync {
    fn response(&self, image: &RgbImage) -> ResponseMap;
}

/// Luminance conversion (`0.2125 R + 0.7154 G + 0.0721 B`)
pub fn to_grayscale(image: &RgbImage) -> GrayImage {
    let (w, h) = image.dimensions();
    let data = image
        .pixels()
        .map(|p| 0.2125 * p[0] + 0.7154 * p[1] + 0.0721 * p[2])
        .collect();
    // Length always matches w * h
    GrayImage::from_raw(w, h, data).unwrap_or_else(|| GrayImage::new(w, h))
}

/// Harris corner measure `det(M) - k * trace(M)^2` over a Gaussian-weighted
/// structure tensor.
#[derive(Debug, Clone, Copy)]
pub struct HarrisResponse {
    k: f32,
    sigma: f32,
}

impl Default for HarrisResponse {
    fn default() -> Self {
        Self { k: 0.05, sigma: 1.0 }
    }
}

impl HarrisResponse {
    pub fn new(k: f32, sigma: f32) -> DetectResult<Self> {
        if !(k.is_finite() && k > 0.0 && sigma.is_finite() && sigma > 0.0) {
            return Err(DetectError::InvalidHarrisParams { k, sigma });
        }
        Ok(Self { k, sigma })
    }

    pub fn k(&self) -> f32 {
        self.k
    }

    pub fn sigma(&self) -> f32 {
        self.sigma
    }

    /// Response for a grayscale image
    pub fn response_gray(&self, gray: &GrayImage) -> ResponseMap {
        let (w, h) = (gray.width() as usize, gray.height() as usize);
        if w == 0 || h == 0 {
            return ResponseMap::empty();
        }
        let img = gray.as_raw();

        // Per-pixel tensor products, rows in parallel
        let products: Vec<(f32, f32, f32)> = (0..h)
            .into_par_iter()
            .flat_map_iter(|y| {
                (0..w).map(move |x| {
                    let (gx, gy) = sobel_gradients(img, w, h, x, y);
                    (gx * gx, gy * gy, gx * gy)
                })
            })
            .collect();

        let ixx: Vec<f32> = products.iter().map(|p| p.0).collect();
        let iyy: Vec<f32> = products.iter().map(|p| p.1).collect();
        let ixy: Vec<f32> = products.iter().map(|p| p.2).collect();

        let sxx = gaussian_blur_plane(&ixx, w, h, self.sigma, Border::Zero);
        let syy = gaussian_blur_plane(&iyy, w, h, self.sigma, Border::Zero);
        let sxy = gaussian_blur_plane(&ixy, w, h, self.sigma, Border::Zero);

        let k = self.k;
        let data: Vec<f32> = sxx
            .par_iter()
            .zip(syy.par_iter())
            .zip(sxy.par_iter())
            .map(|((&a, &b), &c)| {
                let det = a * b - c * c;
                let trace = a + b;
                det - k * trace * trace
            })
            .collect();

        ResponseMap::from_raw(w, h, data).unwrap_or_else(ResponseMap::empty)
    }
}

impl CornerResponse for HarrisResponse {
    fn response(&self, image: &RgbImage) -> ResponseMap {
        self.response_gray(&to_grayscale(image))
    }
}

/// Sobel gradients scaled by 1/8; zero on the one-pixel border
#[inline]
fn sobel_gradients(img: &[f32], width: usize, height: usize, x: usize, y: usize) -> (f32, f32) {
    if x == 0 || y == 0 || x + 1 >= width || y + 1 >= height {
        return (0.0, 0.0);
    }
    let at = |xx: usize, yy: usize| img[yy * width + xx];

    // Sobel X kernel: [-1, 0, 1; -2, 0, 2; -1, 0, 1]
    let gx = at(x + 1, y - 1) + 2.0 * at(x + 1, y) + at(x + 1, y + 1)
        - at(x - 1, y - 1)
        - 2.0 * at(x - 1, y)
        - at(x - 1, y + 1);

    // Sobel Y kernel: [-1, -2, -1; 0, 0, 0; 1, 2, 1]
    let gy = at(x - 1, y + 1) + 2.0 * at(x, y + 1) + at(x + 1, y + 1)
        - at(x - 1, y - 1)
        - 2.0 * at(x, y - 1)
        - at(x + 1, y - 1);

    (gx / 8.0, gy / 8.0)
}
