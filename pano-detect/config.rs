use crate::error::{DetectError, DetectResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Keypoint selection settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SelectorConfig {
    /// Odd side length of the local-maximum window
    pub window_size: usize,
    /// Keep responses above `threshold_rel * max(response)`
    pub threshold_rel: f32,
    /// Drop keypoints within this many pixels of a border
    pub edge_margin: usize,
    /// Harris sensitivity `k`
    pub harris_k: f32,
    /// Gaussian weighting of the structure tensor
    pub harris_sigma: f32,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            window_size: 11,
            threshold_rel: 0.01,
            edge_margin: 20,
            harris_k: 0.05,
            harris_sigma: 1.0,
        }
    }
}

impl SelectorConfig {
    pub fn validate(&self) -> DetectResult<()> {
        if self.window_size == 0 || self.window_size % 2 == 0 {
            return Err(DetectError::InvalidWindowSize(self.window_size));
        }
        if !self.threshold_rel.is_finite() || self.threshold_rel < 0.0 {
            return Err(DetectError::InvalidThreshold(self.threshold_rel));
        }
        if !(self.harris_k > 0.0 && self.harris_k.is_finite())
            || !(self.harris_sigma > 0.0 && self.harris_sigma.is_finite())
        {
            return Err(DetectError::InvalidHarrisParams {
                k: self.harris_k,
                sigma: self.harris_sigma,
            });
        }
        Ok(())
    }

    pub fn summary(&self) -> String {
        format!(
            "window={}, threshold_rel={}, edge={}, harris(k={}, sigma={})",
            self.window_size, self.threshold_rel, self.edge_margin, self.harris_k, self.harris_sigma
        )
    }
}
