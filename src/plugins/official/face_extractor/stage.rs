// src/plugins/official/face_extractor/stage.rs
use std::sync::Arc;

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::config::FaceExtractorConfig;
use crate::core::correlation::{output_schema, ImageRecords};
use crate::core::detection::{detect, AzureCognitiveClient, FaceDetector};
use crate::core::schema::{StructuredRecord, Value};
use crate::plugins::context::{StageConfigurer, SubmitterContext, TransformContext};
use crate::plugins::traits::{Emitter, Transform};
use crate::plugins::types::{PluginMetadata, PluginType, StageProperties};
use crate::utils::error::{ExtractorError, Result};

pub const PLUGIN_NAME: &str = "AzureFaceExtractor";

/// State that only exists between `initialize` and `destroy`.
struct StageRuntime {
    stage_name: String,
    detector: Arc<dyn FaceDetector>,
    continue_on_error: bool,
    cancellation: CancellationToken,
}

/// Extracts faces, their attributes and their emotions from an image field
/// using the Azure Face and Emotion APIs. Emits one record per face.
pub struct AzureFaceExtractor {
    metadata: PluginMetadata,
    config: FaceExtractorConfig,
    injected_detector: Option<Arc<dyn FaceDetector>>,
    runtime: Option<StageRuntime>,
}

impl AzureFaceExtractor {
    pub fn new(config: FaceExtractorConfig) -> Self {
        Self {
            metadata: PluginMetadata {
                id: Uuid::new_v4(),
                name: PLUGIN_NAME.to_string(),
                plugin_type: PluginType::Transform,
                description: "Extracts faces and emotions from images using Azure Cognitive Services."
                    .to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            config,
            injected_detector: None,
            runtime: None,
        }
    }

    pub fn from_properties(properties: &StageProperties) -> Result<Self> {
        Ok(Self::new(FaceExtractorConfig::from_properties(properties)?))
    }

    /// Uses `detector` instead of building an Azure client at `initialize`.
    pub fn with_detector(config: FaceExtractorConfig, detector: Arc<dyn FaceDetector>) -> Self {
        let mut stage = Self::new(config);
        stage.injected_detector = Some(detector);
        stage
    }

    pub fn config(&self) -> &FaceExtractorConfig {
        &self.config
    }

    fn image_bytes(&self, input: &StructuredRecord) -> Result<Option<bytes::Bytes>> {
        match input.get(&self.config.source_field_name) {
            Some(Value::Bytes(image)) if !image.is_empty() => Ok(Some(image.clone())),
            Some(Value::Bytes(_)) | Some(Value::Null) | None => Ok(None),
            Some(other) => Err(ExtractorError::Config(format!(
                "Source field '{}' holds a {} value instead of bytes",
                self.config.source_field_name,
                other.kind()
            ))),
        }
    }
}

#[async_trait]
impl Transform for AzureFaceExtractor {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn configure_pipeline(&self, configurer: &mut StageConfigurer) -> Result<()> {
        let (input_schema, collector) = configurer.validation_parts();
        self.config.validate(input_schema, collector);
        configurer.failure_collector().get_or_throw()?;

        configurer.set_output_schema(output_schema());
        Ok(())
    }

    fn prepare_run(&self, context: &mut SubmitterContext) -> Result<()> {
        let (input_schema, collector) = context.validation_parts();
        self.config.validate(input_schema, collector);
        context.failure_collector().get_or_throw()?;
        Ok(())
    }

    async fn initialize(&mut self, context: &TransformContext) -> Result<()> {
        let resolved = self.config.resolve(&context.arguments)?;

        let detector: Arc<dyn FaceDetector> = match &self.injected_detector {
            Some(detector) => detector.clone(),
            None => {
                info!(
                    face_endpoint = %resolved.detector.face_endpoint,
                    emotion_endpoint = %resolved.detector.emotion_endpoint,
                    "Creating Azure Cognitive Services client"
                );
                Arc::new(AzureCognitiveClient::new(
                    resolved.detector,
                    resolved.faces_subscription_key,
                    resolved.emotion_subscription_key,
                )?)
            }
        };

        info!(
            stage = %context.stage_name,
            source_field = %self.config.source_field_name,
            continue_on_error = resolved.continue_on_error,
            "Face extractor initialized"
        );

        self.runtime = Some(StageRuntime {
            stage_name: context.stage_name.clone(),
            detector,
            continue_on_error: resolved.continue_on_error,
            cancellation: context.cancellation.clone(),
        });
        Ok(())
    }

    async fn transform(&self, input: &StructuredRecord, emitter: &mut dyn Emitter) -> Result<()> {
        let runtime = self.runtime.as_ref().ok_or_else(|| {
            ExtractorError::Plugin(format!("{} used before initialize", PLUGIN_NAME))
        })?;

        let Some(image) = self.image_bytes(input)? else {
            debug!(stage = %runtime.stage_name, "No image data in record");
            return Ok(());
        };

        let detected = tokio::select! {
            biased;
            _ = runtime.cancellation.cancelled() => return Err(ExtractorError::Cancelled),
            result = detect(runtime.detector.as_ref(), image) => result,
        };

        let detections = match detected {
            Ok(detections) => detections,
            Err(e) if runtime.continue_on_error => {
                warn!(
                    stage = %runtime.stage_name,
                    error = %e,
                    "Failed to detect faces. Ignoring because continue on error is true."
                );
                return Ok(());
            }
            Err(e) => return Err(e.into()),
        };

        let mut records = ImageRecords::new(&detections, runtime.continue_on_error);
        let mut emitted = 0usize;
        for record in records.by_ref() {
            emitter.emit(record?);
            emitted += 1;
        }

        debug!(
            stage = %runtime.stage_name,
            faces = detections.faces.len(),
            emotions = detections.emotions.len(),
            emitted,
            skipped = records.skipped(),
            "Image processed"
        );
        Ok(())
    }

    async fn destroy(&mut self) -> Result<()> {
        if let Some(runtime) = self.runtime.take() {
            info!(stage = %runtime.stage_name, "Face extractor destroyed");
        }
        Ok(())
    }
}
