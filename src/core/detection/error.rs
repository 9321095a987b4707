// src/core/detection/error.rs
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DetectionError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Service responded with status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Failed to decode service response: {0}")]
    Decode(String),

    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Client setup error: {0}")]
    Client(String),
}

pub type Result<T> = std::result::Result<T, DetectionError>;
