use pano_align::AlignError;
use pano_describe::DescribeError;
use pano_detect::DetectError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StitchError {
    #[error("Keypoint selection failed: {0}")]
    Detect(#[from] DetectError),
    #[error("Description failed: {0}")]
    Describe(#[from] DescribeError),
    #[error("Alignment failed: {0}")]
    Align(#[from] AlignError),
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Invalid configuration: {0}")]
    Config(String),
    #[cfg(feature = "serde")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[cfg(feature = "serde")]
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[cfg(feature = "serde")]
    #[error("TOML serialization error: {0}")]
    TomlWrite(#[from] toml::ser::Error),
}

pub type StitchResult<T> = Result<T, StitchError>;
