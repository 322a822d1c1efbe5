use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DetectError {
    #[error("Invalid window size: {0} (must be odd and >= 1)")]
    InvalidWindowSize(usize),
    #[error("Invalid relative threshold: {0} (must be finite and >= 0)")]
    InvalidThreshold(f32),
    #[error("Invalid Harris parameters: k={k}, sigma={sigma}")]
    InvalidHarrisParams { k: f32, sigma: f32 },
}

pub type DetectResult<T> = Result<T, DetectError>;
