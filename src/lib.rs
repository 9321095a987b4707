pub mod core;
pub mod plugins;
pub mod utils;

use std::sync::Arc;

use bytes::Bytes;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::{
    core::schema::{Field, Schema, StructuredRecord},
    plugins::{
        Emitter, PluginRegistry, StageConfigurer, SubmitterContext, Transform, TransformContext,
    },
    utils::{
        config::Config,
        error::{ExtractorError, Result},
    },
};

/// Drives one configured stage through its lifecycle and feeds it images.
pub struct Application {
    config: Arc<Config>,
    input_schema: Arc<Schema>,
    output_schema: Option<Arc<Schema>>,
    stage: Box<dyn Transform>,
}

impl Application {
    pub fn new(config: Config) -> Result<Self> {
        info!(plugin = %config.pipeline.plugin, "Creating pipeline stage...");
        let stage = PluginRegistry::with_builtin_plugins()
            .create(&config.pipeline.plugin, &config.pipeline.properties)?;
        Ok(Self::with_stage(config, stage))
    }

    pub fn with_stage(config: Config, stage: Box<dyn Transform>) -> Self {
        let input_schema = Arc::new(Schema::record(
            "input",
            vec![Field::new(
                config.input.field_name.clone(),
                Schema::nullable_of(Schema::Bytes),
            )],
        ));

        Self {
            config: Arc::new(config),
            input_schema,
            output_schema: None,
            stage,
        }
    }

    pub fn input_schema(&self) -> &Arc<Schema> {
        &self.input_schema
    }

    /// Declared by the stage during `start`.
    pub fn output_schema(&self) -> Option<&Arc<Schema>> {
        self.output_schema.as_ref()
    }

    /// Runs configure, submit and initialize in order.
    pub async fn start(&mut self, cancellation: CancellationToken) -> Result<()> {
        let stage_name = self.config.pipeline.plugin.clone();
        let arguments = self.config.pipeline.arguments.clone();

        info!("Configuring pipeline...");
        let mut configurer = StageConfigurer::new(&stage_name, Some(self.input_schema.clone()));
        self.stage.configure_pipeline(&mut configurer)?;
        self.output_schema = configurer.output_schema().cloned();

        info!("Preparing run...");
        let mut submitter =
            SubmitterContext::new(&stage_name, Some(self.input_schema.clone()), arguments.clone());
        self.stage.prepare_run(&mut submitter)?;

        info!("Initializing stage...");
        let context = TransformContext::new(stage_name, arguments).with_cancellation(cancellation);
        self.stage.initialize(&context).await?;

        info!("Application successfully started");
        Ok(())
    }

    pub fn input_record(&self, image: Bytes) -> Result<StructuredRecord> {
        StructuredRecord::builder(self.input_schema.clone())
            .set(&self.config.input.field_name, image)
            .and_then(|builder| builder.build())
            .map_err(|e| ExtractorError::Config(e.to_string()))
    }

    pub async fn process(&self, image: Bytes, emitter: &mut dyn Emitter) -> Result<()> {
        let record = self.input_record(image)?;
        self.stage.transform(&record, emitter).await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        info!("Shutting down application...");
        self.stage.destroy().await?;
        info!("Application shutdown complete");
        Ok(())
    }
}
