pub mod config;
pub mod descriptor;
pub mod downsample;
pub mod error;
pub mod matcher;

pub use config::{DescriptorConfig, MatcherConfig};
pub use descriptor::{normalize, DescriptorBuilder, DescriptorOutcome, DescriptorSet};
pub use downsample::{AreaDownsampler, GaussianAreaDownsampler};
pub use error::{DescribeError, DescribeResult};
pub use matcher::{DescriptorMatcher, RatioMatcher};
