use log::debug;
use pano_core::{PixelCoord, RgbImage};
use rayon::prelude::*;

use crate::config::DescriptorConfig;
use crate::downsample::{AreaDownsampler, GaussianAreaDownsampler};
use crate::error::DescribeResult;

/// Keeps flat patches from dividing by zero
const STD_EPSILON: f32 = 1e-8;

const CHANNELS: usize = 3;

/// What happened to one keypoint during description
#[derive(Debug, Clone, PartialEq)]
pub enum DescriptorOutcome {
    Kept(Vec<f32>),
    /// The patch would leave the image
    DroppedOutOfBounds,
}

/// Descriptors of the keypoints that survived, one row per keypoint.
///
/// `keypoints()[i]` is the keypoint that produced `row(i)`.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptorSet {
    dim: usize,
    data: Vec<f32>,
    keypoints: Vec<PixelCoord>,
    dropped: usize,
}

impl DescriptorSet {
    /// Empty set whose rows would have length `dim`
    pub fn empty(dim: usize) -> Self {
        Self {
            dim,
            data: Vec::new(),
            keypoints: Vec::new(),
            dropped: 0,
        }
    }

    /// Row-major descriptor data with one keypoint per row.
    /// Returns `None` if `data.len() != keypoints.len() * dim`.
    pub fn from_parts(dim: usize, data: Vec<f32>, keypoints: Vec<PixelCoord>) -> Option<Self> {
        if data.len() != keypoints.len() * dim {
            return None;
        }
        Some(Self {
            dim,
            data,
            keypoints,
            dropped: 0,
        })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.keypoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keypoints.is_empty()
    }

    /// Row length (`out_size^2 * channels`), fixed even when empty
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// `(rows, dim)`
    pub fn shape(&self) -> (usize, usize) {
        (self.len(), self.dim)
    }

    pub fn row(&self, i: usize) -> &[f32] {
        &self.data[i * self.dim..(i + 1) * self.dim]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f32]> + '_ {
        (0..self.len()).map(move |i| self.row(i))
    }

    /// Keypoints aligned with the rows
    pub fn keypoints(&self) -> &[PixelCoord] {
        &self.keypoints
    }

    /// How many input keypoints were dropped
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}

/// Builds bias/gain normalised patch descriptors
#[derive(Debug, Clone)]
pub struct DescriptorBuilder<D = GaussianAreaDownsampler> {
    cfg: DescriptorConfig,
    downsampler: D,
}

impl DescriptorBuilder<GaussianAreaDownsampler> {
    pub fn new(cfg: DescriptorConfig) -> DescribeResult<Self> {
        Self::with_downsampler(cfg, GaussianAreaDownsampler)
    }
}

impl<D: AreaDownsampler> DescriptorBuilder<D> {
    pub fn with_downsampler(cfg: DescriptorConfig, downsampler: D) -> DescribeResult<Self> {
        cfg.validate()?;
        Ok(Self { cfg, downsampler })
    }

    pub fn config(&self) -> &DescriptorConfig {
        &self.cfg
    }

    /// Length of every emitted descriptor
    pub fn descriptor_len(&self) -> usize {
        self.cfg.descriptor_len(CHANNELS)
    }

    /// One outcome per input keypoint, in input order
    pub fn describe_each(&self, image: &RgbImage, keypoints: &[PixelCoord]) -> Vec<DescriptorOutcome> {
        keypoints
            .par_iter()
            .map(|&kp| match self.extract_patch(image, kp) {
                Some(patch) => DescriptorOutcome::Kept(self.describe_patch(&patch)),
                None => DescriptorOutcome::DroppedOutOfBounds,
            })
            .collect()
    }

    /// Descriptors of the keypoints whose patch fits inside the image.
    /// Out-of-bounds keypoints are skipped; the rest keep their relative order.
    pub fn describe(&self, image: &RgbImage, keypoints: &[PixelCoord]) -> DescriptorSet {
        let outcomes = self.describe_each(image, keypoints);
        let mut set = DescriptorSet::empty(self.descriptor_len());
        for (kp, outcome) in keypoints.iter().zip(outcomes) {
            match outcome {
                DescriptorOutcome::Kept(v) => {
                    set.data.extend_from_slice(&v);
                    set.keypoints.push(*kp);
                }
                DescriptorOutcome::DroppedOutOfBounds => set.dropped += 1,
            }
        }
        debug!(
            "described {} of {} keypoints ({} out of bounds)",
            set.len(),
            keypoints.len(),
            set.dropped
        );
        set
    }

    /// Patch rows `[y - r, y - r + patch_size)`, same for columns, `r = patch_size / 2`
    fn extract_patch(&self, image: &RgbImage, kp: PixelCoord) -> Option<RgbImage> {
        let size = self.cfg.patch_size;
        let r = size / 2;
        let (w, h) = (image.width() as usize, image.height() as usize);
        if kp.row < r || kp.col < r || kp.row - r + size > h || kp.col - r + size > w {
            return None;
        }
        let (x0, y0) = ((kp.col - r) as u32, (kp.row - r) as u32);
        Some(RgbImage::from_fn(size as u32, size as u32, |x, y| {
            *image.get_pixel(x0 + x, y0 + y)
        }))
    }

    fn describe_patch(&self, patch: &RgbImage) -> Vec<f32> {
        let small = self.downsampler.downsample(patch, self.cfg.out_size as u32);
        let mut v = small.into_raw();
        normalize(&mut v);
        v
    }
}

/// Subtract the mean, divide by the (population) standard deviation
pub fn normalize(v: &mut [f32]) {
    if v.is_empty() {
        return;
    }
    let n = v.len() as f32;
    let mean = v.iter().sum::<f32>() / n;
    let var = v.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
    let std = var.sqrt();
    for x in v.iter_mut() {
        *x = (*x - mean) / (std + STD_EPSILON);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use proptest::prelude::*;

    fn textured(w: u32, h: u32) -> RgbImage {
        RgbImage::from_fn(w, h, |x, y| {
            let v = ((x * 31 + y * 17) % 23) as f32 / 23.0;
            Rgb([v, 1.0 - v, (v * 0.5 + 0.25)])
        })
    }

    fn mean_std(v: &[f32]) -> (f32, f32) {
        let n = v.len() as f32;
        let mean = v.iter().sum::<f32>() / n;
        let var = v.iter().map(|x| (x - mean) * (x - mean)).sum::<f32>() / n;
        (mean, var.sqrt())
    }

    fn builder(patch_size: usize, out_size: usize) -> DescriptorBuilder {
        DescriptorBuilder::new(DescriptorConfig { patch_size, out_size }).unwrap()
    }

    #[test]
    fn test_invalid_config() {
        let result = DescriptorBuilder::new(DescriptorConfig { patch_size: 0, out_size: 8 });
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_keypoints_keep_shape() {
        let set = builder(40, 8).describe(&textured(64, 64), &[]);
        assert_eq!(set.shape(), (0, 8 * 8 * 3));
        assert!(set.is_empty());
    }

    #[test]
    fn test_out_of_bounds_keypoints_dropped_in_order() {
        let img = textured(100, 80);
        let kps = vec![
            PixelCoord::new(40, 50),
            PixelCoord::new(5, 50),  // too close to the top
            PixelCoord::new(30, 30),
            PixelCoord::new(40, 81), // patch would run past the right edge
            PixelCoord::new(60, 20),
        ];
        let b = builder(40, 8);

        let outcomes = b.describe_each(&img, &kps);
        assert_eq!(outcomes.len(), 5);
        assert_eq!(outcomes[1], DescriptorOutcome::DroppedOutOfBounds);
        assert_eq!(outcomes[3], DescriptorOutcome::DroppedOutOfBounds);

        let set = b.describe(&img, &kps);
        assert_eq!(set.len(), 3);
        assert_eq!(set.dropped(), 2);
        assert_eq!(
            set.keypoints(),
            &[PixelCoord::new(40, 50), PixelCoord::new(30, 30), PixelCoord::new(60, 20)]
        );
        if let DescriptorOutcome::Kept(v) = &outcomes[2] {
            assert_eq!(set.row(1), v.as_slice());
        } else {
            panic!("expected descriptor for keypoint 2");
        }
    }

    #[test]
    fn test_patch_touching_border_is_kept() {
        // r = 20: rows 0..40 and cols 0..40 are exactly in bounds
        let img = textured(40, 40);
        let set = builder(40, 8).describe(&img, &[PixelCoord::new(20, 20)]);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_flat_patch_is_finite() {
        let img = RgbImage::from_pixel(50, 50, Rgb([0.3, 0.3, 0.3]));
        let set = builder(40, 8).describe(&img, &[PixelCoord::new(25, 25)]);
        let row = set.row(0);
        assert!(row.iter().all(|v| v.is_finite()));
        assert!(row.iter().all(|v| *v == row[0]));
    }

    #[test]
    fn test_brightness_and_contrast_invariance() {
        let img = textured(60, 60);
        let brighter = RgbImage::from_fn(60, 60, |x, y| {
            let p = img.get_pixel(x, y);
            Rgb([p[0] * 2.0 + 0.5, p[1] * 2.0 + 0.5, p[2] * 2.0 + 0.5])
        });
        let b = builder(40, 8);
        let kp = [PixelCoord::new(30, 30)];
        let a = b.describe(&img, &kp);
        let c = b.describe(&brighter, &kp);
        for (x, y) in a.row(0).iter().zip(c.row(0)) {
            assert!((x - y).abs() < 1e-3);
        }
    }

    proptest! {
        #[test]
        fn prop_descriptors_are_normalised(
            kps in prop::collection::vec((0usize..70, 0usize..70), 0..12),
        ) {
            let img = textured(70, 70);
            let kps: Vec<PixelCoord> = kps.into_iter().map(|(r, c)| PixelCoord::new(r, c)).collect();
            let set = builder(20, 5).describe(&img, &kps);
            prop_assert!(set.len() <= kps.len());
            prop_assert_eq!(set.len() + set.dropped(), kps.len());
            prop_assert_eq!(set.dim(), 75);
            for row in set.rows() {
                let (mean, std) = mean_std(row);
                prop_assert!(mean.abs() < 1e-4);
                prop_assert!((std - 1.0).abs() < 1e-3);
            }
        }
    }
}
