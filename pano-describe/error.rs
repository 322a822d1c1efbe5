use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum DescribeError {
    #[error("Invalid patch size {patch_size} / output size {out_size} (both must be > 0)")]
    InvalidPatchSize { patch_size: usize, out_size: usize },
    #[error("Invalid ratio: {0} (must be in (0, 1])")]
    InvalidRatio(f32),
    #[error("Descriptor length mismatch: {first} vs {second}")]
    DimensionMismatch { first: usize, second: usize },
}

pub type DescribeResult<T> = Result<T, DescribeError>;
