use image::imageops;
use log::debug;
use pano_core::{Homography, Point, RgbImage};

use crate::config::CompositorConfig;
use crate::error::{AlignError, AlignResult};
use crate::resample::{BilinearResampler, Resampler};

/// Two equally sized canvases ready for blending
#[derive(Debug, Clone)]
pub struct Composition {
    /// Image 1 pasted unchanged at `offset`
    pub base: RgbImage,
    /// Image 2 warped into the canvas frame
    pub warped: RgbImage,
    /// Translation `(tx, ty)` from image 1 coordinates to canvas coordinates
    pub offset: (u32, u32),
}

impl Composition {
    pub fn dimensions(&self) -> (u32, u32) {
        self.base.dimensions()
    }
}

/// Lays out image 1 and the warped image 2 on a shared canvas
#[derive(Debug, Clone, Default)]
pub struct CanvasCompositor<S = BilinearResampler> {
    cfg: CompositorConfig,
    resampler: S,
}

impl CanvasCompositor<BilinearResampler> {
    pub fn new(cfg: CompositorConfig) -> Self {
        Self::with_resampler(cfg, BilinearResampler)
    }
}

impl<S: Resampler> CanvasCompositor<S> {
    pub fn with_resampler(cfg: CompositorConfig, resampler: S) -> Self {
        Self { cfg, resampler }
    }

    pub fn config(&self) -> &CompositorConfig {
        &self.cfg
    }

    /// Compose `image2` onto `image1`'s frame. `homography` maps image 2
    /// coordinates to image 1 coordinates.
    pub fn compose(
        &self,
        image1: &RgbImage,
        image2: &RgbImage,
        homography: &Homography,
    ) -> AlignResult<Composition> {
        let (w1, h1) = (image1.width() as f64, image1.height() as f64);
        let (w2, h2) = (image2.width() as f64, image2.height() as f64);

        let mut corners = vec![
            Point::new(0.0, 0.0),
            Point::new(w1, 0.0),
            Point::new(w1, h1),
            Point::new(0.0, h1),
        ];
        for c in [
            Point::new(0.0, 0.0),
            Point::new(w2, 0.0),
            Point::new(w2, h2),
            Point::new(0.0, h2),
        ] {
            let mapped = homography
                .apply(&c)
                .ok_or(AlignError::DegenerateTransform("image 2 corner maps to infinity"))?;
            corners.push(mapped);
        }

        let (min_x, min_y, max_x, max_y) = corners.iter().fold(
            (f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY),
            |(a, b, c, d), p| (a.min(p.x), b.min(p.y), c.max(p.x), d.max(p.y)),
        );
        let (min_x, min_y) = (min_x.floor(), min_y.floor());
        let (max_x, max_y) = (max_x.ceil(), max_y.ceil());

        let width = max_x - min_x;
        let height = max_y - min_y;
        let max_pixels = self.cfg.max_canvas_pixels;
        if !(width.is_finite() && height.is_finite())
            || width > u32::MAX as f64
            || height > u32::MAX as f64
            || width * height > max_pixels as f64
        {
            return Err(AlignError::CanvasTooLarge {
                width: width.min(u64::MAX as f64) as u64,
                height: height.min(u64::MAX as f64) as u64,
                max_pixels,
            });
        }
        let (width, height) = (width as u32, height as u32);

        // Image 1's origin is among the corners, so both offsets are >= 0
        let (tx, ty) = (-min_x, -min_y);
        let to_canvas = homography.pre_translate(tx, ty);
        let inverse = to_canvas
            .inverse()
            .ok_or(AlignError::DegenerateTransform("canvas transform is not invertible"))?;

        let warped = self.resampler.warp(image2, &inverse, width, height);
        let mut base = RgbImage::new(width, height);
        imageops::replace(&mut base, image1, tx as i64, ty as i64);

        debug!("canvas {}x{}, offset ({}, {})", width, height, tx, ty);
        Ok(Composition {
            base,
            warped,
            offset: (tx as u32, ty as u32),
        })
    }
}
