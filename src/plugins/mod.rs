//! Stage lifecycle, host contexts and the built-in plugins.

pub mod context;
pub mod official;
pub mod registry;
pub mod traits;
pub mod types;

pub use context::{CollectingEmitter, StageConfigurer, SubmitterContext, TransformContext};
pub use registry::PluginRegistry;
pub use traits::{Emitter, Transform};
pub use types::{Deferred, PluginMetadata, PluginType, RuntimeArguments, StageProperties};
