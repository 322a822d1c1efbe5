use crate::config::PipelineConfig;
use crate::error::StitchResult;
use crate::Stitcher;

/// Fluent API builder for stitcher configuration
#[derive(Debug, Clone, Default)]
pub struct StitcherBuilder {
    config: PipelineConfig,
}

impl StitcherBuilder {
    /// Create new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Create builder from existing configuration
    pub fn from_config(config: PipelineConfig) -> Self {
        Self { config }
    }

    /// Set the local-maximum window (odd)
    pub fn window_size(mut self, window_size: usize) -> Self {
        self.config.selector.window_size = window_size;
        self
    }

    /// Set the relative corner strength threshold
    pub fn threshold_rel(mut self, threshold_rel: f32) -> Self {
        self.config.selector.threshold_rel = threshold_rel;
        self
    }

    /// Set the border margin for keypoints
    pub fn edge_margin(mut self, edge_margin: usize) -> Self {
        self.config.selector.edge_margin = edge_margin;
        self
    }

    /// Set Harris `k` and structure tensor sigma
    pub fn harris(mut self, k: f32, sigma: f32) -> Self {
        self.config.selector.harris_k = k;
        self.config.selector.harris_sigma = sigma;
        self
    }

    /// Set descriptor patch side and downsampled side
    pub fn patch(mut self, patch_size: usize, out_size: usize) -> Self {
        self.config.descriptor.patch_size = patch_size;
        self.config.descriptor.out_size = out_size;
        self
    }

    /// Set the nearest-neighbour ratio test threshold
    pub fn ratio(mut self, ratio: f32) -> Self {
        self.config.matcher.ratio = ratio;
        self
    }

    /// Enable/disable mutual nearest-neighbour check
    pub fn cross_check(mut self, enable: bool) -> Self {
        self.config.matcher.cross_check = enable;
        self
    }

    /// Set the RANSAC inlier distance in pixels
    pub fn residual_threshold(mut self, threshold: f64) -> Self {
        self.config.ransac.residual_threshold = threshold;
        self
    }

    /// Set the RANSAC trial budget
    pub fn max_trials(mut self, max_trials: usize) -> Self {
        self.config.ransac.max_trials = max_trials;
        self
    }

    /// Set the minimum inlier count for an accepted homography
    pub fn min_inliers(mut self, min_inliers: usize) -> Self {
        self.config.ransac.min_inliers = min_inliers;
        self
    }

    /// Fix the RANSAC seed for reproducible output
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.ransac.seed = Some(seed);
        self
    }

    /// Set the canvas size limit
    pub fn max_canvas_pixels(mut self, max_pixels: u64) -> Self {
        self.config.compositor.max_canvas_pixels = max_pixels;
        self
    }

    /// Set the black level used when trimming
    pub fn crop_tolerance(mut self, tolerance: f32) -> Self {
        self.config.crop_tolerance = tolerance;
        self
    }

    /// Set number of threads
    pub fn threads(mut self, n_threads: usize) -> Self {
        self.config.n_threads = n_threads;
        self
    }

    /// Apply fast preset
    pub fn preset_fast(mut self) -> Self {
        self.config = PipelineConfig::fast_preset();
        self
    }

    /// Apply robust preset
    pub fn preset_robust(mut self) -> Self {
        self.config = PipelineConfig::robust_preset();
        self
    }

    /// Build the stitcher, validating the configuration
    pub fn build(self) -> StitchResult<Stitcher> {
        Stitcher::new(self.config)
    }

    /// Get configuration summary
    pub fn summary(&self) -> String {
        self.config.summary()
    }

    /// Extract configuration
    pub fn to_config(self) -> PipelineConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StitchError;

    #[test]
    fn test_builder_sets_fields() {
        let cfg = StitcherBuilder::new()
            .window_size(7)
            .threshold_rel(0.02)
            .edge_margin(12)
            .patch(24, 6)
            .ratio(0.75)
            .cross_check(false)
            .residual_threshold(1.5)
            .max_trials(300)
            .seed(4)
            .threads(2)
            .to_config();
        assert_eq!(cfg.selector.window_size, 7);
        assert_eq!(cfg.selector.edge_margin, 12);
        assert_eq!(cfg.descriptor.patch_size, 24);
        assert_eq!(cfg.descriptor.out_size, 6);
        assert!(!cfg.matcher.cross_check);
        assert_eq!(cfg.ransac.max_trials, 300);
        assert_eq!(cfg.ransac.seed, Some(4));
        assert_eq!(cfg.n_threads, 2);
    }

    #[test]
    fn test_preset_then_override() {
        let cfg = StitcherBuilder::new().preset_robust().max_trials(10).to_config();
        assert_eq!(cfg.name.as_deref(), Some("Robust"));
        assert_eq!(cfg.ransac.max_trials, 10);
    }

    #[test]
    fn test_build_validates() {
        assert!(matches!(
            StitcherBuilder::new().window_size(10).build(),
            Err(StitchError::Detect(_))
        ));
        assert!(StitcherBuilder::new().threads(1).build().is_ok());
    }

    #[test]
    fn test_round_trip_through_config() {
        let cfg = StitcherBuilder::new().preset_fast().seed(1).to_config();
        let again = cfg.clone().to_builder().to_config();
        assert_eq!(cfg, again);
    }
}
