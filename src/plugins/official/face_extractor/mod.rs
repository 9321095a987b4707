//! Azure face and emotion extraction stage.

pub mod config;
pub mod stage;

pub use config::{FaceExtractorConfig, FaceExtractorConfigBuilder, ResolvedConfig};
pub use stage::{AzureFaceExtractor, PLUGIN_NAME};
