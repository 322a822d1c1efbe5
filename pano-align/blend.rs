//! Canvas merging and border trimming.
//!
//! A canvas pixel counts as painted when any channel is strictly positive.
//! Genuinely black source pixels are therefore indistinguishable from
//! unpainted canvas; callers that need the distinction pass explicit masks to
//! [`blend_with_coverage`].

use image::imageops;
use log::{debug, warn};
use pano_core::RgbImage;

use crate::error::{AlignError, AlignResult};

/// Default threshold below which a channel counts as black when cropping
pub const DEFAULT_CROP_TOLERANCE: f32 = 1e-3;

/// Row-major flag per pixel, true where any channel is > 0
pub fn coverage_mask(image: &RgbImage) -> Vec<bool> {
    image.pixels().map(|p| p.0.iter().any(|&v| v > 0.0)).collect()
}

/// Average where both canvases are painted, otherwise whichever is painted
pub fn blend_average(base: &RgbImage, warped: &RgbImage) -> AlignResult<RgbImage> {
    check_shapes(base, warped)?;
    blend_with_coverage(base, &coverage_mask(base), warped, &coverage_mask(warped))
}

/// [`blend_average`] with caller-supplied coverage masks
pub fn blend_with_coverage(
    base: &RgbImage,
    base_mask: &[bool],
    warped: &RgbImage,
    warped_mask: &[bool],
) -> AlignResult<RgbImage> {
    check_shapes(base, warped)?;
    let n = (base.width() as usize) * (base.height() as usize);
    if base_mask.len() != n || warped_mask.len() != n {
        return Err(AlignError::ShapeMismatch {
            first: base.dimensions(),
            second: warped.dimensions(),
        });
    }

    let mut out = base.clone();
    let mut overlap = 0usize;
    for (((dst, src), &m1), &m2) in out
        .pixels_mut()
        .zip(warped.pixels())
        .zip(base_mask)
        .zip(warped_mask)
    {
        match (m1, m2) {
            (true, true) => {
                overlap += 1;
                for c in 0..3 {
                    dst[c] = 0.5 * dst[c] + 0.5 * src[c];
                }
            }
            (false, true) => *dst = *src,
            (_, false) => {}
        }
    }
    debug!("blended {}x{} canvas, {} overlapping pixels", out.width(), out.height(), overlap);
    Ok(out)
}

/// Crop to the bounding box of pixels with any channel above `tolerance`.
/// An image with no such pixel is returned unchanged.
pub fn crop_nonzero(image: &RgbImage, tolerance: f32) -> RgbImage {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for (x, y, p) in image.enumerate_pixels() {
        if p.0.iter().any(|&v| v > tolerance) {
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((x0, y0, x1, y1)) => (x0.min(x), y0.min(y), x1.max(x), y1.max(y)),
            });
        }
    }

    match bounds {
        Some((x0, y0, x1, y1)) => {
            imageops::crop_imm(image, x0, y0, x1 - x0 + 1, y1 - y0 + 1).to_image()
        }
        None => {
            warn!("nothing above tolerance {} to crop to, returning image as is", tolerance);
            image.clone()
        }
    }
}

fn check_shapes(first: &RgbImage, second: &RgbImage) -> AlignResult<()> {
    if first.dimensions() != second.dimensions() {
        return Err(AlignError::ShapeMismatch {
            first: first.dimensions(),
            second: second.dimensions(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    #[test]
    fn test_coverage_any_channel() {
        let mut img = RgbImage::new(3, 1);
        img.put_pixel(1, 0, Rgb([0.0, 0.0, 0.2]));
        img.put_pixel(2, 0, Rgb([-1.0, 0.0, 0.0]));
        assert_eq!(coverage_mask(&img), vec![false, true, false]);
    }

    #[test]
    fn test_blend_rules() {
        let mut base = RgbImage::new(3, 1);
        let mut warped = RgbImage::new(3, 1);
        base.put_pixel(0, 0, Rgb([1.0, 1.0, 1.0]));
        base.put_pixel(1, 0, Rgb([1.0, 0.0, 0.5]));
        warped.put_pixel(1, 0, Rgb([0.0, 1.0, 0.5]));
        warped.put_pixel(2, 0, Rgb([0.3, 0.3, 0.3]));

        let out = blend_average(&base, &warped).unwrap();
        assert_eq!(out.get_pixel(0, 0).0, [1.0, 1.0, 1.0]);
        assert_eq!(out.get_pixel(1, 0).0, [0.5, 0.5, 0.5]);
        assert_eq!(out.get_pixel(2, 0).0, [0.3, 0.3, 0.3]);
    }

    #[test]
    fn test_shape_mismatch() {
        let err = blend_average(&RgbImage::new(2, 2), &RgbImage::new(3, 2)).unwrap_err();
        assert_eq!(err, AlignError::ShapeMismatch { first: (2, 2), second: (3, 2) });
    }

    #[test]
    fn test_explicit_coverage_keeps_black_pixels() {
        // A genuinely black image 1 pixel overlapping image 2
        let base = RgbImage::new(1, 1);
        let warped = RgbImage::from_pixel(1, 1, Rgb([0.8, 0.8, 0.8]));
        let implicit = blend_average(&base, &warped).unwrap();
        assert_eq!(implicit.get_pixel(0, 0).0, [0.8, 0.8, 0.8]);
        let explicit = blend_with_coverage(&base, &[true], &warped, &[true]).unwrap();
        assert_eq!(explicit.get_pixel(0, 0).0, [0.4, 0.4, 0.4]);
        assert!(blend_with_coverage(&base, &[], &warped, &[true]).is_err());
    }

    #[test]
    fn test_crop_to_content() {
        let mut img = RgbImage::new(10, 8);
        img.put_pixel(2, 3, Rgb([0.5, 0.0, 0.0]));
        img.put_pixel(6, 5, Rgb([0.0, 0.0, 0.7]));
        img.put_pixel(8, 7, Rgb([5e-4, 0.0, 0.0]));
        let out = crop_nonzero(&img, DEFAULT_CROP_TOLERANCE);
        assert_eq!(out.dimensions(), (5, 3));
        assert_eq!(out.get_pixel(0, 0).0, [0.5, 0.0, 0.0]);
        assert_eq!(out.get_pixel(4, 2).0, [0.0, 0.0, 0.7]);
    }

    #[test]
    fn test_crop_all_black_is_unchanged() {
        let img = RgbImage::from_pixel(4, 3, Rgb([1e-4, 0.0, 0.0]));
        assert_eq!(crop_nonzero(&img, DEFAULT_CROP_TOLERANCE), img);
    }

    fn arb_canvas() -> impl Strategy<Value = RgbImage> {
        (1u32..8, 1u32..8).prop_flat_map(|(w, h)| {
            prop::collection::vec(prop_oneof![Just(0.0f32), 0.01f32..4.0], (w * h * 3) as usize)
                .prop_map(move |data| RgbImage::from_raw(w, h, data).unwrap())
        })
    }

    proptest! {
        #[test]
        fn prop_disjoint_canvases_union(canvas in arb_canvas(), split in 0.0f64..1.0) {
            // Split every pixel between two canvases, never both
            let (w, h) = canvas.dimensions();
            let cut = (split * w as f64) as u32;
            let base = RgbImage::from_fn(w, h, |x, y| if x < cut { *canvas.get_pixel(x, y) } else { Rgb([0.0; 3]) });
            let warped = RgbImage::from_fn(w, h, |x, y| if x >= cut { *canvas.get_pixel(x, y) } else { Rgb([0.0; 3]) });
            prop_assert_eq!(blend_average(&base, &warped).unwrap(), canvas);
        }

        #[test]
        fn prop_full_overlap_is_average(a in 0.01f32..4.0, b in 0.01f32..4.0, w in 1u32..6, h in 1u32..6) {
            let base = RgbImage::from_pixel(w, h, Rgb([a, a, a]));
            let warped = RgbImage::from_pixel(w, h, Rgb([b, 0.0, b]));
            let out = blend_average(&base, &warped).unwrap();
            for p in out.pixels() {
                prop_assert_eq!(p.0, [0.5 * a + 0.5 * b, 0.5 * a, 0.5 * a + 0.5 * b]);
            }
        }

        #[test]
        fn prop_crop_is_idempotent(canvas in arb_canvas()) {
            let once = crop_nonzero(&canvas, DEFAULT_CROP_TOLERANCE);
            let twice = crop_nonzero(&once, DEFAULT_CROP_TOLERANCE);
            prop_assert_eq!(once, twice);
        }
    }
}
