// tests/integration/pipeline.rs
use std::sync::Arc;
use std::time::Duration;

use azure_face_extractor::{
    core::detection::DetectionError,
    plugins::{
        official::face_extractor::{AzureFaceExtractor, FaceExtractorConfig},
        CollectingEmitter,
    },
    utils::error::ExtractorError,
    Application,
};
use bytes::Bytes;
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;
use tokio_util::sync::CancellationToken;

use crate::common::{config, emotion_json, face_json, PendingDetector, FIELD};

const IMAGE: &[u8] = b"group-photo";

async fn mock_faces(server: &mut ServerGuard, body: &str, faces: serde_json::Value) -> Mock {
    server
        .mock("POST", "/face/v1.0/detect")
        .match_query(Matcher::Any)
        .match_body(body)
        .with_status(200)
        .with_body(faces.to_string())
        .create_async()
        .await
}

async fn mock_emotions(server: &mut ServerGuard, body: &str, emotions: serde_json::Value) -> Mock {
    server
        .mock("POST", "/emotion/v1.0/recognize")
        .match_body(body)
        .with_status(200)
        .with_body(emotions.to_string())
        .create_async()
        .await
}

async fn started(server: &ServerGuard, continue_on_error: bool) -> Application {
    let mut app = Application::new(config(&server.url(), continue_on_error))
        .expect("Failed to create application");
    app.start(CancellationToken::new())
        .await
        .expect("Failed to start application");
    app
}

#[test_log::test(tokio::test)]
async fn test_image_produces_one_record_per_face() {
    let mut server = mockito::Server::new_async().await;
    let faces = mock_faces(
        &mut server,
        "group-photo",
        json!([face_json("a", 10, 20), face_json("b", 100, 20)]),
    )
    .await;
    let emotions = mock_emotions(&mut server, "group-photo", json!([emotion_json(100, 20)])).await;

    let app = started(&server, false).await;
    assert_eq!(
        app.output_schema().and_then(|s| s.fields()).map(<[_]>::len),
        Some(24)
    );

    let mut emitter = CollectingEmitter::new();
    app.process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .expect("Processing failed");

    faces.assert_async().await;
    emotions.assert_async().await;

    let records = emitter.into_records();
    assert_eq!(records.len(), 2);

    let first = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(first["raw_image_data"], json!(hex::encode(IMAGE)));
    assert_eq!(first["face_id"], json!("a"));
    assert_eq!(first["rectangle_left"], json!(10));
    assert_eq!(first["gender"], json!("female"));
    assert_eq!(first["glasses"], json!("ReadingGlasses"));
    assert_eq!(first["mustache"], json!(0.0));
    assert!(first["happiness"].is_null());

    let second = serde_json::to_value(&records[1]).unwrap();
    assert_eq!(second["face_id"], json!("b"));
    assert_eq!(second["happiness"], json!(0.8));
    assert_eq!(second["surprise"], json!(0.03));
    assert_eq!(second["sadness"], json!(0.02));
}

#[test_log::test(tokio::test)]
async fn test_no_faces_emits_nothing() {
    let mut server = mockito::Server::new_async().await;
    let _faces = mock_faces(&mut server, "group-photo", json!([])).await;
    let _emotions = mock_emotions(&mut server, "group-photo", json!([])).await;
    let app = started(&server, false).await;

    let mut emitter = CollectingEmitter::new();
    app.process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .expect("Processing failed");
    assert!(emitter.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_continue_on_error_skips_failed_image() {
    let mut server = mockito::Server::new_async().await;
    let _broken = server
        .mock("POST", "/face/v1.0/detect")
        .match_query(Matcher::Any)
        .match_body("corrupt")
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;
    let _faces = mock_faces(&mut server, "group-photo", json!([face_json("a", 1, 1)])).await;
    let _emotions = mock_emotions(&mut server, "group-photo", json!([emotion_json(1, 1)])).await;
    let app = started(&server, true).await;

    let mut emitter = CollectingEmitter::new();
    app.process(Bytes::from_static(b"corrupt"), &mut emitter)
        .await
        .expect("Failure should be skipped");
    assert!(emitter.is_empty());

    app.process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .expect("Processing failed");
    assert_eq!(emitter.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_failure_propagates_without_continue_on_error() {
    let mut server = mockito::Server::new_async().await;
    let _broken = server
        .mock("POST", "/face/v1.0/detect")
        .match_query(Matcher::Any)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;
    let app = started(&server, false).await;

    let mut emitter = CollectingEmitter::new();
    let err = app
        .process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        ExtractorError::Detection(DetectionError::Api { status: 503, .. })
    ));
}

fn face_with_unknown_glasses(id: &str, left: i32, top: i32) -> serde_json::Value {
    let mut face = face_json(id, left, top);
    face["faceAttributes"]["glasses"] = json!("Monocle");
    face
}

#[test_log::test(tokio::test)]
async fn test_continue_on_error_skips_only_unreadable_face() {
    let mut server = mockito::Server::new_async().await;
    let _faces = mock_faces(
        &mut server,
        "group-photo",
        json!([face_json("good", 10, 20), face_with_unknown_glasses("odd", 50, 60)]),
    )
    .await;
    let _emotions = mock_emotions(&mut server, "group-photo", json!([])).await;
    let app = started(&server, true).await;

    let mut emitter = CollectingEmitter::new();
    app.process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .expect("Unreadable face should be skipped");

    let records = emitter.into_records();
    assert_eq!(records.len(), 1);
    let only = serde_json::to_value(&records[0]).unwrap();
    assert_eq!(only["face_id"], json!("good"));
}

#[test_log::test(tokio::test)]
async fn test_unreadable_face_is_mapping_error_without_continue_on_error() {
    let mut server = mockito::Server::new_async().await;
    let _faces = mock_faces(
        &mut server,
        "group-photo",
        json!([face_json("good", 10, 20), face_with_unknown_glasses("odd", 50, 60)]),
    )
    .await;
    let _emotions = mock_emotions(&mut server, "group-photo", json!([])).await;
    let app = started(&server, false).await;

    let mut emitter = CollectingEmitter::new();
    let err = app
        .process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .unwrap_err();

    assert!(matches!(err, ExtractorError::Mapping(_)));
    assert_eq!(emitter.len(), 1);
}

#[test_log::test(tokio::test)]
async fn test_start_rejects_unknown_source_field() {
    let mut cfg = config("http://127.0.0.1:9", false);
    cfg.pipeline
        .properties
        .insert("sourceFieldName".into(), "missing".into());
    let mut app = Application::new(cfg).expect("Failed to create application");

    let err = app.start(CancellationToken::new()).await.unwrap_err();
    match err {
        ExtractorError::Validation(exception) => {
            assert_eq!(exception.failures.len(), 1);
            assert!(exception.failures[0].message.contains("missing"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test_log::test(tokio::test)]
async fn test_start_rejects_missing_macro_argument() {
    let mut cfg = config("http://127.0.0.1:9", false);
    cfg.pipeline.arguments.remove("faces_key");
    let mut app = Application::new(cfg).expect("Failed to create application");

    let err = app.start(CancellationToken::new()).await.unwrap_err();
    assert!(err.is_configuration());
}

#[test_log::test(tokio::test)]
async fn test_cancellation_aborts_in_flight_detection() {
    let cfg = config("http://127.0.0.1:9", true);
    let stage_config = FaceExtractorConfig::from_properties(&cfg.pipeline.properties)
        .expect("Invalid properties");
    let stage = AzureFaceExtractor::with_detector(stage_config, Arc::new(PendingDetector));
    let mut app = Application::with_stage(cfg, Box::new(stage));

    let cancellation = CancellationToken::new();
    app.start(cancellation.clone())
        .await
        .expect("Failed to start application");

    let canceller = cancellation.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        canceller.cancel();
    });

    let mut emitter = CollectingEmitter::new();
    let err = app
        .process(Bytes::from_static(IMAGE), &mut emitter)
        .await
        .unwrap_err();
    assert!(matches!(err, ExtractorError::Cancelled));
    assert!(emitter.is_empty());
}

#[test_log::test(tokio::test)]
async fn test_input_record_uses_configured_field() {
    let app = Application::new(config("http://127.0.0.1:9", false))
        .expect("Failed to create application");
    let record = app
        .input_record(Bytes::from_static(IMAGE))
        .expect("Failed to build record");
    assert_eq!(record.get_bytes(FIELD).map(|b| &b[..]), Some(IMAGE));
}
