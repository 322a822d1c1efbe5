use pano_align::{CompositorConfig, RansacConfig, DEFAULT_CROP_TOLERANCE};
use pano_describe::{DescriptorConfig, MatcherConfig};
use pano_detect::SelectorConfig;

use crate::builder::StitcherBuilder;
use crate::error::{StitchError, StitchResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Complete pipeline configuration with all stage settings
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PipelineConfig {
    pub selector: SelectorConfig,
    pub descriptor: DescriptorConfig,
    pub matcher: MatcherConfig,
    pub ransac: RansacConfig,
    pub compositor: CompositorConfig,
    /// Channel level treated as black when trimming the panorama
    pub crop_tolerance: f32,
    /// Worker threads for the stitcher's pool
    pub n_threads: usize,
    /// Metadata
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub description: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineConfig {
    /// Create new configuration with default settings
    pub fn new() -> Self {
        Self {
            selector: SelectorConfig::default(),
            descriptor: DescriptorConfig::default(),
            matcher: MatcherConfig::default(),
            ransac: RansacConfig::default(),
            compositor: CompositorConfig::default(),
            crop_tolerance: DEFAULT_CROP_TOLERANCE,
            n_threads: pano_core::default_threads(),
            name: None,
            description: None,
        }
    }

    /// Fewer, stronger keypoints and a shorter RANSAC budget
    pub fn fast_preset() -> Self {
        Self {
            selector: SelectorConfig {
                window_size: 15,
                threshold_rel: 0.05,
                ..SelectorConfig::default()
            },
            descriptor: DescriptorConfig {
                patch_size: 32,
                out_size: 8,
            },
            ransac: RansacConfig {
                max_trials: 500,
                ..RansacConfig::default()
            },
            name: Some("Fast".to_string()),
            description: Some("Sparse keypoints and a short consensus search".to_string()),
            ..Self::new()
        }
    }

    /// Dense keypoints, strict matching and a long RANSAC budget
    pub fn robust_preset() -> Self {
        Self {
            selector: SelectorConfig {
                window_size: 9,
                threshold_rel: 0.005,
                ..SelectorConfig::default()
            },
            matcher: MatcherConfig {
                ratio: 0.7,
                cross_check: true,
            },
            ransac: RansacConfig {
                residual_threshold: 2.0,
                max_trials: 5000,
                min_inliers: 8,
                ..RansacConfig::default()
            },
            name: Some("Robust".to_string()),
            description: Some("Dense keypoints with strict matching for difficult pairs".to_string()),
            ..Self::new()
        }
    }

    /// Add metadata to configuration
    pub fn with_metadata(mut self, name: &str, description: &str) -> Self {
        self.name = Some(name.to_string());
        self.description = Some(description.to_string());
        self
    }

    /// Convert to StitcherBuilder for further customization
    pub fn to_builder(self) -> StitcherBuilder {
        StitcherBuilder::from_config(self)
    }

    /// Generate human-readable summary
    pub fn summary(&self) -> String {
        format!(
            "PipelineConfig{}: select[{}], patch={}->{}, ratio={}{}, ransac(threshold={}, trials={}, seed={}), crop_tol={}, threads={}",
            self.name.as_deref().map(|n| format!(" '{}'", n)).unwrap_or_default(),
            self.selector.summary(),
            self.descriptor.patch_size,
            self.descriptor.out_size,
            self.matcher.ratio,
            if self.matcher.cross_check { " (cross-checked)" } else { "" },
            self.ransac.residual_threshold,
            self.ransac.max_trials,
            self.ransac.seed.map_or("entropy".to_string(), |s| s.to_string()),
            self.crop_tolerance,
            self.n_threads
        )
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> StitchResult<()> {
        self.selector.validate()?;
        self.descriptor.validate()?;
        self.matcher.validate()?;
        self.ransac.validate()?;
        if self.compositor.max_canvas_pixels == 0 {
            return Err(StitchError::Config("max_canvas_pixels must be positive".to_string()));
        }
        if !(self.crop_tolerance.is_finite() && self.crop_tolerance >= 0.0) {
            return Err(StitchError::Config(format!(
                "crop_tolerance must be finite and >= 0, got {}",
                self.crop_tolerance
            )));
        }
        if self.n_threads == 0 {
            return Err(StitchError::Config("n_threads must be at least 1".to_string()));
        }
        Ok(())
    }

    /// Save configuration to JSON file
    #[cfg(feature = "serde")]
    pub fn save_json<P: AsRef<std::path::Path>>(&self, path: P) -> StitchResult<()> {
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// Load configuration from JSON file
    #[cfg(feature = "serde")]
    pub fn load_json<P: AsRef<std::path::Path>>(path: P) -> StitchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Save configuration to TOML file
    #[cfg(feature = "serde")]
    pub fn save_toml<P: AsRef<std::path::Path>>(&self, path: P) -> StitchResult<()> {
        std::fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    /// Load configuration from TOML file
    #[cfg(feature = "serde")]
    pub fn load_toml<P: AsRef<std::path::Path>>(path: P) -> StitchResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Load from a `.json` or `.toml` file, picked by extension
    #[cfg(feature = "serde")]
    pub fn load<P: AsRef<std::path::Path>>(path: P) -> StitchResult<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::load_json(path),
            Some("toml") => Self::load_toml(path),
            _ => Err(StitchError::Config(format!(
                "unknown config format for {} (expected .json or .toml)",
                path.display()
            ))),
        }
    }

    /// Serialize to JSON string
    #[cfg(feature = "serde")]
    pub fn to_json(&self) -> StitchResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Deserialize from JSON string
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> StitchResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML string
    #[cfg(feature = "serde")]
    pub fn to_toml(&self) -> StitchResult<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Deserialize from TOML string
    #[cfg(feature = "serde")]
    pub fn from_toml(toml_str: &str) -> StitchResult<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }
}
