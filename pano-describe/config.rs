use crate::error::{DescribeError, DescribeResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Patch descriptor settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DescriptorConfig {
    /// Side of the square patch cut around each keypoint
    pub patch_size: usize,
    /// Side of the downsampled patch
    pub out_size: usize,
}

impl Default for DescriptorConfig {
    fn default() -> Self {
        Self {
            patch_size: 40,
            out_size: 8,
        }
    }
}

impl DescriptorConfig {
    pub fn validate(&self) -> DescribeResult<()> {
        if self.patch_size == 0 || self.out_size == 0 {
            return Err(DescribeError::InvalidPatchSize {
                patch_size: self.patch_size,
                out_size: self.out_size,
            });
        }
        Ok(())
    }

    /// Descriptor length for an image with `channels` channels
    pub fn descriptor_len(&self, channels: usize) -> usize {
        self.out_size * self.out_size * channels
    }
}

/// Nearest-neighbour matching settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct MatcherConfig {
    /// Lowe ratio between best and second-best distance
    pub ratio: f32,
    /// Keep only mutual nearest neighbours
    pub cross_check: bool,
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            ratio: 0.8,
            cross_check: true,
        }
    }
}

impl MatcherConfig {
    pub fn validate(&self) -> DescribeResult<()> {
        if !(self.ratio > 0.0 && self.ratio <= 1.0) {
            return Err(DescribeError::InvalidRatio(self.ratio));
        }
        Ok(())
    }
}
