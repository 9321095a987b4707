// src/utils/error.rs
use thiserror::Error;

use crate::core::correlation::MappingError;
use crate::core::detection::DetectionError;
use crate::core::validation::ValidationException;

#[derive(Debug, Error)]
pub enum ExtractorError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Configuration error: {0}")]
    Validation(#[from] ValidationException),

    #[error("Detection service error: {0}")]
    Detection(#[from] DetectionError),

    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    #[error("Plugin error: {0}")]
    Plugin(String),

    #[error("Processing cancelled")]
    Cancelled,
}

impl ExtractorError {
    /// Configuration problems are fatal regardless of continue-on-error.
    pub fn is_configuration(&self) -> bool {
        matches!(self, ExtractorError::Config(_) | ExtractorError::Validation(_))
    }
}

pub type Result<T> = std::result::Result<T, ExtractorError>;
