//! Remote face and emotion detection.

pub mod azure;
pub mod client;
pub mod error;
pub mod types;

pub use azure::{AzureCognitiveClient, DetectorSettings, SubscriptionKey};
pub use client::{detect, Detections, FaceDetector};
pub use error::DetectionError;
pub use types::{
    DetectedEmotion, DetectedFace, FaceAttributes, FaceRectangle, FacialHair, Gender, Glasses,
    HeadPose,
};
