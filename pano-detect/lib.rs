pub mod config;
pub mod error;
pub mod harris;
pub mod nms;
pub mod selector;

pub use config::SelectorConfig;
pub use error::{DetectError, DetectResult};
pub use harris::{to_grayscale, CornerResponse, GrayImage, HarrisResponse};
pub use nms::{discard_edges, select_local_maxima};
pub use selector::KeypointSelector;
