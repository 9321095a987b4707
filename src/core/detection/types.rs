// src/core/detection/types.rs
use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaceRectangle {
    pub left: i32,
    pub top: i32,
    #[serde(default)]
    pub width: i32,
    #[serde(default)]
    pub height: i32,
}

impl FaceRectangle {
    /// Key used to pair a face with its emotion result.
    pub fn origin(&self) -> (i32, i32) {
        (self.left, self.top)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedFace {
    #[serde(default)]
    pub face_id: Option<String>,
    pub face_rectangle: FaceRectangle,
    #[serde(default, deserialize_with = "lenient")]
    pub face_attributes: Option<FaceAttributes>,
}

/// Decodes an optional attribute, turning an unreadable value into `None`.
/// The mapper then rejects that one face instead of the whole response
/// failing to decode.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Attributes the face service returns when asked for them. Every entry is
/// optional on the wire, and an entry that does not decode is treated as
/// absent.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceAttributes {
    #[serde(default, deserialize_with = "lenient")]
    pub age: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub gender: Option<Gender>,
    #[serde(default, deserialize_with = "lenient")]
    pub smile: Option<f64>,
    #[serde(default, deserialize_with = "lenient")]
    pub facial_hair: Option<FacialHair>,
    #[serde(default, deserialize_with = "lenient")]
    pub glasses: Option<Glasses>,
    #[serde(default, deserialize_with = "lenient")]
    pub head_pose: Option<HeadPose>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FacialHair {
    #[serde(alias = "moustache")]
    pub mustache: f64,
    pub beard: f64,
    pub sideburns: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HeadPose {
    pub roll: f64,
    pub yaw: f64,
    pub pitch: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn name(&self) -> &'static str {
        match self {
            Gender::Male => "male",
            Gender::Female => "female",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Glasses {
    NoGlasses,
    ReadingGlasses,
    Sunglasses,
    SwimmingGoggles,
}

impl Glasses {
    pub fn name(&self) -> &'static str {
        match self {
            Glasses::NoGlasses => "NoGlasses",
            Glasses::ReadingGlasses => "ReadingGlasses",
            Glasses::Sunglasses => "Sunglasses",
            Glasses::SwimmingGoggles => "SwimmingGoggles",
        }
    }
}

/// Emotion result for one face. Score keys are kept exactly as the service
/// sent them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedEmotion {
    pub face_rectangle: FaceRectangle,
    #[serde(default)]
    pub scores: BTreeMap<String, f64>,
}
