// src/utils/config.rs
use std::collections::HashMap;
use std::path::Path;

use config::builder::DefaultState;
use config::{Config as ConfigLib, ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;

use crate::plugins::types::property;
use crate::utils::error::{ExtractorError, Result};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub logging: LoggingConfig,
    pub input: InputConfig,
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Name of the bytes field the runner stores each image under.
    pub field_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub plugin: String,
    #[serde(default)]
    pub properties: HashMap<String, String>,
    #[serde(default)]
    pub arguments: HashMap<String, String>,
}

impl PipelineConfig {
    /// Property lookup that tolerates the key case folding some sources apply.
    pub fn property(&self, name: &str) -> Option<&str> {
        property(&self.properties, name)
    }

    pub fn argument(&self, name: &str) -> Option<&str> {
        property(&self.arguments, name)
    }
}

impl Config {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load(
            Self::defaults()?
                .add_source(File::with_name("config/default").required(false))
                .add_source(File::with_name("config/local").required(false)),
        )
    }

    /// Loads defaults, then the given file, then the environment.
    pub fn new_from_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::load(Self::defaults()?.add_source(File::from(path.as_ref())))
    }

    fn defaults() -> std::result::Result<ConfigBuilder<DefaultState>, ConfigError> {
        ConfigLib::builder()
            .set_default("logging.level", "info")?
            .set_default("input.field_name", "body")?
            .set_default("pipeline.plugin", "AzureFaceExtractor")?
            .set_default("pipeline.properties.sourceFieldName", "body")?
            .set_default("pipeline.properties.continueOnError", "false")
    }

    fn load(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        // e.g. FACE_EXTRACTOR__PIPELINE__ARGUMENTS__FACES_KEY
        let config = builder
            .add_source(Environment::with_prefix("FACE_EXTRACTOR").separator("__"))
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pipeline.plugin.trim().is_empty() {
            return Err(ExtractorError::Config("pipeline.plugin must be set".into()));
        }
        if self.input.field_name.trim().is_empty() {
            return Err(ExtractorError::Config("input.field_name must be set".into()));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ExtractorError::Config("logging.level must be set".into()));
        }

        Ok(())
    }
}

impl From<ConfigError> for ExtractorError {
    fn from(error: ConfigError) -> Self {
        ExtractorError::Config(error.to_string())
    }
}
