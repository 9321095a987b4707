//! Pairs detected faces with emotion results and flattens them into output
//! records.

pub mod mapper;

use thiserror::Error;

use crate::core::detection::{DetectedEmotion, DetectedFace};
use crate::core::schema::RecordError;

pub use mapper::{map_face, output_schema, ImageRecords, EMOTION_FIELDS, OUTPUT_FIELDS};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum MappingError {
    #[error("Face {face} has a missing or unreadable attribute '{attribute}'")]
    MissingAttribute {
        face: String,
        attribute: &'static str,
    },

    #[error(transparent)]
    Record(#[from] RecordError),
}

/// Returns the first emotion whose rectangle starts at the same (left, top)
/// as the face. Later duplicates are ignored.
pub fn find_matching_emotion<'a>(
    face: &DetectedFace,
    emotions: &'a [DetectedEmotion],
) -> Option<&'a DetectedEmotion> {
    let origin = face.face_rectangle.origin();
    emotions
        .iter()
        .find(|emotion| emotion.face_rectangle.origin() == origin)
}

/// Lower-cases a score key and repairs the `suprise` misspelling.
pub fn normalize_emotion_key(key: &str) -> String {
    let key = key.trim().to_lowercase();
    if key == "suprise" {
        "surprise".to_string()
    } else {
        key
    }
}
