// tests/integration/azure_client.rs
use std::io::Write;
use std::time::Duration;

use azure_face_extractor::core::detection::{
    AzureCognitiveClient, DetectionError, DetectorSettings, FaceDetector, Gender, Glasses,
    SubscriptionKey,
};
use bytes::Bytes;
use mockito::{Matcher, Server};
use serde_json::json;

use crate::common::{emotion_json, face_json, EMOTION_KEY, FACES_KEY};

const IMAGE: &str = "not-really-a-jpeg";

fn client(endpoint: &str) -> AzureCognitiveClient {
    client_with_timeout(endpoint, Duration::from_secs(5))
}

fn client_with_timeout(endpoint: &str, request_timeout: Duration) -> AzureCognitiveClient {
    let settings = DetectorSettings {
        face_endpoint: endpoint.to_string(),
        emotion_endpoint: endpoint.to_string(),
        request_timeout,
    };
    AzureCognitiveClient::new(
        settings,
        SubscriptionKey::new(FACES_KEY),
        SubscriptionKey::new(EMOTION_KEY),
    )
    .expect("Failed to build client")
}

#[test_log::test(tokio::test)]
async fn test_find_faces_request_shape() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/face/v1.0/detect")
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("returnFaceId".into(), "true".into()),
            Matcher::UrlEncoded("returnFaceLandmarks".into(), "false".into()),
            Matcher::UrlEncoded(
                "returnFaceAttributes".into(),
                "age,gender,smile,facialHair,glasses,headPose".into(),
            ),
        ]))
        .match_header("Ocp-Apim-Subscription-Key", FACES_KEY)
        .match_header("content-type", "application/octet-stream")
        .match_body(IMAGE)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!([face_json("f-1", 10, 20)]).to_string())
        .create_async()
        .await;

    let faces = client(&server.url())
        .find_faces(Bytes::from_static(IMAGE.as_bytes()))
        .await
        .expect("Face detection failed");

    mock.assert_async().await;
    assert_eq!(faces.len(), 1);
    let face = &faces[0];
    assert_eq!(face.face_id.as_deref(), Some("f-1"));
    assert_eq!(face.face_rectangle.origin(), (10, 20));

    let attributes = face.face_attributes.as_ref().expect("attributes missing");
    assert_eq!(attributes.gender, Some(Gender::Female));
    assert_eq!(attributes.glasses, Some(Glasses::ReadingGlasses));
    assert_eq!(attributes.facial_hair.map(|h| h.beard), Some(0.1));
}

#[test_log::test(tokio::test)]
async fn test_find_emotions_uses_emotion_key() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("POST", "/emotion/v1.0/recognize")
        .match_header("Ocp-Apim-Subscription-Key", EMOTION_KEY)
        .match_body(IMAGE)
        .with_status(200)
        .with_body(json!([emotion_json(10, 20), emotion_json(30, 40)]).to_string())
        .create_async()
        .await;

    let emotions = client(&server.url())
        .find_emotions(Bytes::from_static(IMAGE.as_bytes()))
        .await
        .expect("Emotion detection failed");

    mock.assert_async().await;
    assert_eq!(emotions.len(), 2);
    assert_eq!(emotions[1].face_rectangle.origin(), (30, 40));
    assert_eq!(emotions[0].scores.get("Suprise"), Some(&0.03));
}

#[test_log::test(tokio::test)]
async fn test_error_status_maps_to_api_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/face/v1.0/detect")
        .match_query(Matcher::Any)
        .with_status(401)
        .with_body(r#"{"error":{"code":"Unspecified","message":"Access denied"}}"#)
        .create_async()
        .await;

    let err = client(&server.url())
        .find_faces(Bytes::from_static(IMAGE.as_bytes()))
        .await
        .unwrap_err();

    match err {
        DetectionError::Api { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("Access denied"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_malformed_body_maps_to_decode_error() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/emotion/v1.0/recognize")
        .with_status(200)
        .with_body("<html>gateway</html>")
        .create_async()
        .await;

    let err = client(&server.url())
        .find_emotions(Bytes::from_static(IMAGE.as_bytes()))
        .await
        .unwrap_err();

    assert!(matches!(err, DetectionError::Decode(_)));
}

#[test_log::test(tokio::test)]
async fn test_unreachable_endpoint_maps_to_transport_error() {
    // Nothing listens on the discard port.
    let err = client("http://127.0.0.1:9")
        .find_faces(Bytes::from_static(IMAGE.as_bytes()))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DetectionError::Transport(_) | DetectionError::Timeout(_)
    ));
}

#[test_log::test(tokio::test)]
async fn test_slow_response_maps_to_timeout() {
    let mut server = Server::new_async().await;
    let _mock = server
        .mock("POST", "/face/v1.0/detect")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(1500));
            w.write_all(b"[]")
        })
        .create_async()
        .await;

    let timeout = Duration::from_millis(200);
    let err = client_with_timeout(&server.url(), timeout)
        .find_faces(Bytes::from_static(IMAGE.as_bytes()))
        .await
        .unwrap_err();

    match err {
        DetectionError::Timeout(after) => assert_eq!(after, timeout),
        other => panic!("unexpected error: {other:?}"),
    }
}
