// src/plugins/traits/mod.rs
use async_trait::async_trait;

use crate::core::schema::StructuredRecord;
use crate::plugins::context::{StageConfigurer, SubmitterContext, TransformContext};
use crate::plugins::types::PluginMetadata;
use crate::utils::error::Result;

/// Receives the records a stage produces for one input.
pub trait Emitter: Send {
    fn emit(&mut self, record: StructuredRecord);
}

/// Lifecycle of a record transform as a pipeline host drives it:
/// `configure_pipeline` at deploy time, `prepare_run` at submission,
/// then `initialize`, any number of `transform` calls, and `destroy`.
#[async_trait]
pub trait Transform: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;

    fn configure_pipeline(&self, configurer: &mut StageConfigurer) -> Result<()>;

    fn prepare_run(&self, context: &mut SubmitterContext) -> Result<()>;

    async fn initialize(&mut self, context: &TransformContext) -> Result<()>;

    async fn transform(&self, input: &StructuredRecord, emitter: &mut dyn Emitter) -> Result<()>;

    async fn destroy(&mut self) -> Result<()> {
        Ok(())
    }
}
