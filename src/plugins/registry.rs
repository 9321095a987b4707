// src/plugins/registry.rs
use std::collections::HashMap;

use tracing::debug;

use crate::plugins::official::face_extractor::{AzureFaceExtractor, PLUGIN_NAME};
use crate::plugins::traits::Transform;
use crate::plugins::types::StageProperties;
use crate::utils::error::{ExtractorError, Result};

/// Builds a stage from its raw properties.
pub type TransformFactory = fn(&StageProperties) -> Result<Box<dyn Transform>>;

/// Maps plugin names to the factories that construct them.
#[derive(Default)]
pub struct PluginRegistry {
    factories: HashMap<String, TransformFactory>,
}

fn azure_face_extractor(properties: &StageProperties) -> Result<Box<dyn Transform>> {
    Ok(Box::new(AzureFaceExtractor::from_properties(properties)?))
}

impl PluginRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_plugins() -> Self {
        let mut registry = Self::new();
        registry.factories.insert(PLUGIN_NAME.to_string(), azure_face_extractor);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: TransformFactory) -> Result<()> {
        let name = name.into();
        if self.factories.contains_key(&name) {
            return Err(ExtractorError::Plugin(format!(
                "Plugin '{}' is already registered",
                name
            )));
        }
        debug!(plugin = %name, "Registered plugin");
        self.factories.insert(name, factory);
        Ok(())
    }

    pub fn create(&self, name: &str, properties: &StageProperties) -> Result<Box<dyn Transform>> {
        let factory = self
            .factories
            .get(name)
            .ok_or_else(|| ExtractorError::Plugin(format!("Unknown plugin '{}'", name)))?;
        factory(properties)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}
