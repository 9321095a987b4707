// src/core/detection/client.rs
use async_trait::async_trait;
use bytes::Bytes;
use tracing::debug;

use super::error::Result;
use super::types::{DetectedEmotion, DetectedFace};

/// Remote face and emotion detection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait FaceDetector: Send + Sync {
    async fn find_faces(&self, image: Bytes) -> Result<Vec<DetectedFace>>;
    async fn find_emotions(&self, image: Bytes) -> Result<Vec<DetectedEmotion>>;
}

/// Both detection results for one image.
#[derive(Debug, Clone)]
pub struct Detections {
    pub image: Bytes,
    pub faces: Vec<DetectedFace>,
    pub emotions: Vec<DetectedEmotion>,
}

/// Runs the face call, then the emotion call. Each call gets its own handle
/// on the image buffer, so neither can observe the other consuming it.
pub async fn detect<D>(detector: &D, image: Bytes) -> Result<Detections>
where
    D: FaceDetector + ?Sized,
{
    let faces = detector.find_faces(image.clone()).await?;
    let emotions = detector.find_emotions(image.clone()).await?;

    debug!(
        image_bytes = image.len(),
        faces = faces.len(),
        emotions = emotions.len(),
        "Detection complete"
    );

    Ok(Detections {
        image,
        faces,
        emotions,
    })
}
