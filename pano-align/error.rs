use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum AlignError {
    #[error("Match {match_index}: keypoint index {index} out of range for image {image} ({len} keypoints)")]
    MatchIndexOutOfRange {
        match_index: usize,
        image: u8,
        index: usize,
        len: usize,
    },
    #[error("Point count mismatch: {src} source vs {dst} destination points")]
    PointCountMismatch { src: usize, dst: usize },
    #[error("Insufficient correspondences: need at least {needed}, got {got}")]
    InsufficientCorrespondences { needed: usize, got: usize },
    #[error("No consensus homography after {trials} trials (best inlier count {best_inliers})")]
    NoConsensus { trials: usize, best_inliers: usize },
    #[error("Invalid RANSAC configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("Degenerate transform: {0}")]
    DegenerateTransform(&'static str),
    #[error("Canvas {width}x{height} exceeds the limit of {max_pixels} pixels")]
    CanvasTooLarge {
        width: u64,
        height: u64,
        max_pixels: u64,
    },
    #[error("Canvas shape mismatch: {first:?} vs {second:?}")]
    ShapeMismatch { first: (u32, u32), second: (u32, u32) },
}

pub type AlignResult<T> = Result<T, AlignError>;
