// src/plugins/official/face_extractor/config.rs
use std::time::Duration;

use crate::core::detection::{DetectorSettings, SubscriptionKey};
use crate::core::schema::Schema;
use crate::core::validation::{self, FailureCollector, ValidationException};
use crate::plugins::types::{property, Deferred, RuntimeArguments, StageProperties};
use crate::utils::error::{ExtractorError, Result};

pub const SOURCE_FIELD_NAME: &str = "sourceFieldName";
pub const CONTINUE_ON_ERROR: &str = "continueOnError";
pub const FACES_SUBSCRIPTION_KEY: &str = "facesSubscriptionKey";
pub const EMOTION_SUBSCRIPTION_KEY: &str = "emotionSubscriptionKey";
pub const FACE_ENDPOINT: &str = "faceEndpoint";
pub const EMOTION_ENDPOINT: &str = "emotionEndpoint";
pub const REQUEST_TIMEOUT_SECONDS: &str = "requestTimeoutSeconds";

#[derive(Debug, Clone, PartialEq)]
pub struct FaceExtractorConfig {
    pub source_field_name: String,
    pub continue_on_error: Deferred<bool>,
    pub faces_subscription_key: Deferred<SubscriptionKey>,
    pub emotion_subscription_key: Deferred<SubscriptionKey>,
    pub face_endpoint: Option<String>,
    pub emotion_endpoint: Option<String>,
    pub request_timeout: Option<Duration>,
}

/// Everything macro-dependent, resolved against the runtime arguments.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub continue_on_error: bool,
    pub faces_subscription_key: SubscriptionKey,
    pub emotion_subscription_key: SubscriptionKey,
    pub detector: DetectorSettings,
}

fn non_blank<'a>(properties: &'a StageProperties, name: &str) -> Option<&'a str> {
    property(properties, name).filter(|value| !value.trim().is_empty())
}

impl FaceExtractorConfig {
    pub fn builder() -> FaceExtractorConfigBuilder {
        FaceExtractorConfigBuilder::default()
    }

    /// Parses host properties. Only literal values are interpreted here;
    /// macros wait for [`FaceExtractorConfig::resolve`].
    pub fn from_properties(properties: &StageProperties) -> Result<Self> {
        let continue_on_error = match non_blank(properties, CONTINUE_ON_ERROR) {
            Some(raw) => Deferred::parse(CONTINUE_ON_ERROR, raw)?,
            None => Deferred::Value(false),
        };
        let faces_subscription_key = match non_blank(properties, FACES_SUBSCRIPTION_KEY) {
            Some(raw) => Deferred::parse(FACES_SUBSCRIPTION_KEY, raw)?,
            None => Deferred::Value(SubscriptionKey::default()),
        };
        let emotion_subscription_key = match non_blank(properties, EMOTION_SUBSCRIPTION_KEY) {
            Some(raw) => Deferred::parse(EMOTION_SUBSCRIPTION_KEY, raw)?,
            None => Deferred::Value(SubscriptionKey::default()),
        };
        let request_timeout = non_blank(properties, REQUEST_TIMEOUT_SECONDS)
            .map(|raw| {
                raw.trim()
                    .parse::<u64>()
                    .ok()
                    .filter(|secs| *secs > 0)
                    .map(Duration::from_secs)
                    .ok_or_else(|| {
                        ExtractorError::Config(format!(
                            "Property '{}' must be a positive number of seconds, got '{}'",
                            REQUEST_TIMEOUT_SECONDS, raw
                        ))
                    })
            })
            .transpose()?;

        Ok(Self {
            source_field_name: property(properties, SOURCE_FIELD_NAME)
                .unwrap_or_default()
                .trim()
                .to_string(),
            continue_on_error,
            faces_subscription_key,
            emotion_subscription_key,
            face_endpoint: non_blank(properties, FACE_ENDPOINT).map(str::to_string),
            emotion_endpoint: non_blank(properties, EMOTION_ENDPOINT).map(str::to_string),
            request_timeout,
        })
    }

    pub fn validate(&self, input_schema: Option<&Schema>, collector: &mut FailureCollector) {
        validation::validate_source_field(
            input_schema,
            &self.source_field_name,
            SOURCE_FIELD_NAME,
            collector,
        );
    }

    pub fn validate_strict(
        &self,
        input_schema: Option<&Schema>,
        stage: &str,
    ) -> std::result::Result<(), ValidationException> {
        validation::validate_source_field_strict(
            input_schema,
            &self.source_field_name,
            SOURCE_FIELD_NAME,
            stage,
        )
    }

    pub fn resolve(&self, arguments: &RuntimeArguments) -> Result<ResolvedConfig> {
        let continue_on_error = self.continue_on_error.resolve(CONTINUE_ON_ERROR, arguments)?;
        let faces_subscription_key = self
            .faces_subscription_key
            .resolve(FACES_SUBSCRIPTION_KEY, arguments)?;
        let emotion_subscription_key = self
            .emotion_subscription_key
            .resolve(EMOTION_SUBSCRIPTION_KEY, arguments)?;

        for (name, key) in [
            (FACES_SUBSCRIPTION_KEY, &faces_subscription_key),
            (EMOTION_SUBSCRIPTION_KEY, &emotion_subscription_key),
        ] {
            if key.is_empty() {
                return Err(ExtractorError::Config(format!(
                    "Property '{}' must be a non-empty subscription key",
                    name
                )));
            }
        }

        let mut detector = DetectorSettings::default();
        if let Some(endpoint) = &self.face_endpoint {
            detector.face_endpoint = endpoint.clone();
        }
        if let Some(endpoint) = &self.emotion_endpoint {
            detector.emotion_endpoint = endpoint.clone();
        }
        if let Some(timeout) = self.request_timeout {
            detector.request_timeout = timeout;
        }

        Ok(ResolvedConfig {
            continue_on_error,
            faces_subscription_key,
            emotion_subscription_key,
            detector,
        })
    }
}

#[derive(Debug, Default)]
pub struct FaceExtractorConfigBuilder {
    source_field_name: String,
    continue_on_error: Option<Deferred<bool>>,
    faces_subscription_key: Option<Deferred<SubscriptionKey>>,
    emotion_subscription_key: Option<Deferred<SubscriptionKey>>,
    face_endpoint: Option<String>,
    emotion_endpoint: Option<String>,
    request_timeout: Option<Duration>,
}

impl FaceExtractorConfigBuilder {
    pub fn source_field_name(mut self, name: impl Into<String>) -> Self {
        self.source_field_name = name.into();
        self
    }

    pub fn continue_on_error(mut self, value: impl Into<Deferred<bool>>) -> Self {
        self.continue_on_error = Some(value.into());
        self
    }

    pub fn faces_subscription_key(mut self, key: impl Into<Deferred<SubscriptionKey>>) -> Self {
        self.faces_subscription_key = Some(key.into());
        self
    }

    pub fn emotion_subscription_key(mut self, key: impl Into<Deferred<SubscriptionKey>>) -> Self {
        self.emotion_subscription_key = Some(key.into());
        self
    }

    pub fn face_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.face_endpoint = Some(endpoint.into());
        self
    }

    pub fn emotion_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.emotion_endpoint = Some(endpoint.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> FaceExtractorConfig {
        FaceExtractorConfig {
            source_field_name: self.source_field_name,
            continue_on_error: self.continue_on_error.unwrap_or(Deferred::Value(false)),
            faces_subscription_key: self
                .faces_subscription_key
                .unwrap_or_else(|| Deferred::Value(SubscriptionKey::default())),
            emotion_subscription_key: self
                .emotion_subscription_key
                .unwrap_or_else(|| Deferred::Value(SubscriptionKey::default())),
            face_endpoint: self.face_endpoint,
            emotion_endpoint: self.emotion_endpoint,
            request_timeout: self.request_timeout,
        }
    }
}
