use crate::error::{AlignError, AlignResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Robust homography fitting settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RansacConfig {
    /// Point pairs drawn per trial (4 fixes a homography)
    pub min_samples: usize,
    /// Reprojection distance, in pixels, below which a pair is an inlier
    pub residual_threshold: f64,
    /// Number of random samples drawn
    pub max_trials: usize,
    /// Fewer inliers than this counts as no consensus
    pub min_inliers: usize,
    /// Seed for reproducible sampling (None draws from OS entropy)
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub seed: Option<u64>,
}

impl Default for RansacConfig {
    fn default() -> Self {
        Self {
            min_samples: 4,
            residual_threshold: 3.0,
            max_trials: 2000,
            min_inliers: 4,
            seed: None,
        }
    }
}

impl RansacConfig {
    pub fn validate(&self) -> AlignResult<()> {
        if self.min_samples < 4 {
            return Err(AlignError::InvalidConfig("min_samples must be at least 4"));
        }
        if !(self.residual_threshold.is_finite() && self.residual_threshold > 0.0) {
            return Err(AlignError::InvalidConfig("residual_threshold must be positive"));
        }
        if self.max_trials == 0 {
            return Err(AlignError::InvalidConfig("max_trials must be positive"));
        }
        Ok(())
    }
}

/// Canvas construction settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CompositorConfig {
    /// Refuse canvases with more pixels than this
    pub max_canvas_pixels: u64,
}

impl Default for CompositorConfig {
    fn default() -> Self {
        Self {
            max_canvas_pixels: 100_000_000,
        }
    }
}
