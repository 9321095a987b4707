// src/core/detection/azure.rs
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{header::CONTENT_TYPE, Client};
use serde::de::DeserializeOwned;
use tracing::debug;

use super::client::FaceDetector;
use super::error::{DetectionError, Result};
use super::types::{DetectedEmotion, DetectedFace};

pub const DEFAULT_ENDPOINT: &str = "https://westus.api.cognitive.microsoft.com";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";
const FACE_DETECT_PATH: &str = "/face/v1.0/detect";
const EMOTION_RECOGNIZE_PATH: &str = "/emotion/v1.0/recognize";
const FACE_ATTRIBUTES: &str = "age,gender,smile,facialHair,glasses,headPose";

/// Opaque API credential. Never shown by `Debug`.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct SubscriptionKey(String);

impl SubscriptionKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for SubscriptionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SubscriptionKey(***)")
    }
}

impl FromStr for SubscriptionKey {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DetectorSettings {
    pub face_endpoint: String,
    pub emotion_endpoint: String,
    pub request_timeout: Duration,
}

impl Default for DetectorSettings {
    fn default() -> Self {
        Self {
            face_endpoint: DEFAULT_ENDPOINT.to_string(),
            emotion_endpoint: DEFAULT_ENDPOINT.to_string(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

/// Client for the Azure Face and Emotion REST APIs. Each API is authorized
/// with its own subscription key.
pub struct AzureCognitiveClient {
    http_client: Client,
    settings: DetectorSettings,
    faces_key: SubscriptionKey,
    emotion_key: SubscriptionKey,
}

impl AzureCognitiveClient {
    pub fn new(
        settings: DetectorSettings,
        faces_key: SubscriptionKey,
        emotion_key: SubscriptionKey,
    ) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(settings.request_timeout)
            .build()
            .map_err(|e| DetectionError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            settings,
            faces_key,
            emotion_key,
        })
    }

    pub fn settings(&self) -> &DetectorSettings {
        &self.settings
    }

    async fn post_image<T: DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
        key: &SubscriptionKey,
        image: Bytes,
    ) -> Result<T> {
        debug!(url = %url, image_bytes = image.len(), "Calling cognitive service");

        let response = self
            .http_client
            .post(&url)
            .header(SUBSCRIPTION_KEY_HEADER, key.expose())
            .header(CONTENT_TYPE, "application/octet-stream")
            .query(query)
            .body(image)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DetectionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| self.transport_error(e))?;

        serde_json::from_slice(&body).map_err(|e| DetectionError::Decode(e.to_string()))
    }

    fn transport_error(&self, error: reqwest::Error) -> DetectionError {
        if error.is_timeout() {
            DetectionError::Timeout(self.settings.request_timeout)
        } else {
            DetectionError::Transport(error.to_string())
        }
    }
}

fn endpoint_url(base: &str, path: &str) -> String {
    format!("{}{}", base.trim_end_matches('/'), path)
}

#[async_trait]
impl FaceDetector for AzureCognitiveClient {
    async fn find_faces(&self, image: Bytes) -> Result<Vec<DetectedFace>> {
        let url = endpoint_url(&self.settings.face_endpoint, FACE_DETECT_PATH);
        let query = [
            ("returnFaceId", "true"),
            ("returnFaceLandmarks", "false"),
            ("returnFaceAttributes", FACE_ATTRIBUTES),
        ];
        self.post_image(url, &query, &self.faces_key, image).await
    }

    async fn find_emotions(&self, image: Bytes) -> Result<Vec<DetectedEmotion>> {
        let url = endpoint_url(&self.settings.emotion_endpoint, EMOTION_RECOGNIZE_PATH);
        self.post_image(url, &[], &self.emotion_key, image).await
    }
}
