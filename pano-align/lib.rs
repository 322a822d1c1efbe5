pub mod blend;
pub mod compose;
pub mod config;
pub mod dlt;
pub mod error;
pub mod estimator;
pub mod geometry;
pub mod ransac;
pub mod resample;

pub use blend::{blend_average, blend_with_coverage, coverage_mask, crop_nonzero, DEFAULT_CROP_TOLERANCE};
pub use compose::{CanvasCompositor, Composition};
pub use config::{CompositorConfig, RansacConfig};
pub use dlt::{fit_homography, transfer_error};
pub use error::{AlignError, AlignResult};
pub use estimator::{Estimate, HomographyEstimator};
pub use geometry::{to_point_pairs, PointPairs};
pub use ransac::{ransac, RansacModel, RansacOutcome, RansacParams};
pub use resample::{BilinearResampler, Resampler};
