// src/core/correlation/mapper.rs
use std::slice;
use std::sync::{Arc, OnceLock};

use bytes::Bytes;
use tracing::warn;

use super::{find_matching_emotion, normalize_emotion_key, MappingError};
use crate::core::detection::{DetectedEmotion, DetectedFace, Detections, FaceAttributes};
use crate::core::schema::{Field, Schema, StructuredRecord};

pub const RAW_IMAGE_DATA: &str = "raw_image_data";
pub const RECTANGLE_LEFT: &str = "rectangle_left";
pub const RECTANGLE_TOP: &str = "rectangle_top";
pub const RECTANGLE_HEIGHT: &str = "rectangle_height";
pub const RECTANGLE_WIDTH: &str = "rectangle_width";
pub const FACE_ID: &str = "face_id";
pub const AGE: &str = "age";
pub const MUSTACHE: &str = "mustache";
pub const BEARD: &str = "beard";
pub const SIDEBURNS: &str = "sideburns";
pub const GENDER: &str = "gender";
pub const GLASSES: &str = "glasses";
pub const HEAD_POSE_ROLL: &str = "head_pose_roll";
pub const HEAD_POSE_YAW: &str = "head_pose_yaw";
pub const HEAD_POSE_PITCH: &str = "head_pose_pitch";
pub const SMILE: &str = "smile";

pub const EMOTION_FIELDS: [&str; 8] = [
    "happiness",
    "neutral",
    "surprise",
    "fear",
    "anger",
    "contempt",
    "disgust",
    "sadness",
];

/// Every output field with its (non-null) type, in declaration order.
pub const OUTPUT_FIELDS: [(&str, OutputType); 24] = [
    (RAW_IMAGE_DATA, OutputType::Bytes),
    (RECTANGLE_LEFT, OutputType::Int),
    (RECTANGLE_TOP, OutputType::Int),
    (RECTANGLE_HEIGHT, OutputType::Int),
    (RECTANGLE_WIDTH, OutputType::Int),
    (FACE_ID, OutputType::String),
    (AGE, OutputType::Double),
    (MUSTACHE, OutputType::Double),
    (BEARD, OutputType::Double),
    (SIDEBURNS, OutputType::Double),
    (GENDER, OutputType::String),
    (GLASSES, OutputType::String),
    (HEAD_POSE_ROLL, OutputType::Double),
    (HEAD_POSE_YAW, OutputType::Double),
    (HEAD_POSE_PITCH, OutputType::Double),
    (SMILE, OutputType::Double),
    ("happiness", OutputType::Double),
    ("neutral", OutputType::Double),
    ("surprise", OutputType::Double),
    ("fear", OutputType::Double),
    ("anger", OutputType::Double),
    ("contempt", OutputType::Double),
    ("disgust", OutputType::Double),
    ("sadness", OutputType::Double),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputType {
    Bytes,
    Int,
    String,
    Double,
}

impl OutputType {
    fn schema(self) -> Schema {
        match self {
            OutputType::Bytes => Schema::Bytes,
            OutputType::Int => Schema::Int,
            OutputType::String => Schema::String,
            OutputType::Double => Schema::Double,
        }
    }
}

/// The fixed schema of every emitted record. All fields are nullable.
pub fn output_schema() -> Arc<Schema> {
    static SCHEMA: OnceLock<Arc<Schema>> = OnceLock::new();
    SCHEMA
        .get_or_init(|| {
            let fields = OUTPUT_FIELDS
                .iter()
                .map(|(name, kind)| Field::new(*name, Schema::nullable_of(kind.schema())))
                .collect();
            Arc::new(Schema::record("output", fields))
        })
        .clone()
}

fn face_label(face: &DetectedFace) -> String {
    match &face.face_id {
        Some(id) => id.clone(),
        None => format!(
            "at ({}, {})",
            face.face_rectangle.left, face.face_rectangle.top
        ),
    }
}

fn require<T: Copy>(
    face: &DetectedFace,
    value: Option<T>,
    attribute: &'static str,
) -> Result<T, MappingError> {
    value.ok_or_else(|| MappingError::MissingAttribute {
        face: face_label(face),
        attribute,
    })
}

/// Builds the output record for one face and its matched emotion, if any.
pub fn map_face(
    image: &Bytes,
    face: &DetectedFace,
    emotion: Option<&DetectedEmotion>,
) -> Result<StructuredRecord, MappingError> {
    let attributes: &FaceAttributes = face
        .face_attributes
        .as_ref()
        .ok_or_else(|| MappingError::MissingAttribute {
            face: face_label(face),
            attribute: "faceAttributes",
        })?;
    let age = require(face, attributes.age, "age")?;
    let smile = require(face, attributes.smile, "smile")?;
    let facial_hair = require(face, attributes.facial_hair, "facialHair")?;
    let head_pose = require(face, attributes.head_pose, "headPose")?;
    let gender = require(face, attributes.gender, "gender")?;
    let glasses = require(face, attributes.glasses, "glasses")?;
    let rectangle = &face.face_rectangle;

    let mut builder = StructuredRecord::builder(output_schema())
        .set(RAW_IMAGE_DATA, image.clone())?
        .set(RECTANGLE_LEFT, rectangle.left)?
        .set(RECTANGLE_TOP, rectangle.top)?
        .set(RECTANGLE_HEIGHT, rectangle.height)?
        .set(RECTANGLE_WIDTH, rectangle.width)?
        .set(FACE_ID, face.face_id.clone())?
        .set(AGE, age)?
        .set(MUSTACHE, facial_hair.mustache)?
        .set(BEARD, facial_hair.beard)?
        .set(SIDEBURNS, facial_hair.sideburns)?
        .set(GENDER, gender.name())?
        .set(GLASSES, glasses.name())?
        .set(HEAD_POSE_ROLL, head_pose.roll)?
        .set(HEAD_POSE_YAW, head_pose.yaw)?
        .set(HEAD_POSE_PITCH, head_pose.pitch)?
        .set(SMILE, smile)?;

    if let Some(emotion) = emotion {
        for (key, score) in &emotion.scores {
            builder = builder.set(&normalize_emotion_key(key), *score)?;
        }
    }

    Ok(builder.build()?)
}

/// Lazily maps the faces of one image to output records, in detector order.
///
/// With `continue_on_error` a face that fails to map is logged and skipped.
/// Without it the first failure is yielded and the iterator ends.
pub struct ImageRecords<'a> {
    image: &'a Bytes,
    faces: slice::Iter<'a, DetectedFace>,
    emotions: &'a [DetectedEmotion],
    continue_on_error: bool,
    skipped: usize,
    aborted: bool,
}

impl<'a> ImageRecords<'a> {
    pub fn new(detections: &'a Detections, continue_on_error: bool) -> Self {
        Self {
            image: &detections.image,
            faces: detections.faces.iter(),
            emotions: &detections.emotions,
            continue_on_error,
            skipped: 0,
            aborted: false,
        }
    }

    /// Faces dropped so far because they failed to map.
    pub fn skipped(&self) -> usize {
        self.skipped
    }
}

impl Iterator for ImageRecords<'_> {
    type Item = Result<StructuredRecord, MappingError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.aborted {
            return None;
        }

        for face in self.faces.by_ref() {
            let emotion = find_matching_emotion(face, self.emotions);
            match map_face(self.image, face, emotion) {
                Ok(record) => return Some(Ok(record)),
                Err(e) if self.continue_on_error => {
                    self.skipped += 1;
                    warn!(
                        error = %e,
                        "Failed to map detected face. Ignoring because continue on error is true."
                    );
                }
                Err(e) => {
                    self.aborted = true;
                    return Some(Err(e));
                }
            }
        }
        None
    }
}
