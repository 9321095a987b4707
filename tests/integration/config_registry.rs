// tests/integration/config_registry.rs
use std::io::Write;

use azure_face_extractor::{
    plugins::{PluginRegistry, PluginType, StageProperties},
    utils::{config::Config, error::ExtractorError},
    Application,
};

use crate::common::config;

#[test]
fn test_config_file_drives_application() {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("Failed to create temp file");
    write!(
        file,
        r#"
[input]
field_name = "photo"

[pipeline.properties]
sourceFieldName = "photo"
facesSubscriptionKey = "literal-faces-key"
emotionSubscriptionKey = "${{emotion}}"
"#
    )
    .expect("Failed to write config");

    let config = Config::new_from_path(file.path()).expect("Failed to load config");
    assert_eq!(config.input.field_name, "photo");
    assert_eq!(config.pipeline.property("emotionSubscriptionKey"), Some("${emotion}"));

    let app = Application::new(config).expect("Failed to create application");
    let field = app.input_schema().field("photo").expect("input field missing");
    assert!(field.schema.is_nullable());
}

#[test]
fn test_registry_builds_named_stage() {
    let registry = PluginRegistry::with_builtin_plugins();
    let properties: StageProperties = config("http://localhost", false).pipeline.properties;

    let stage = registry
        .create("AzureFaceExtractor", &properties)
        .expect("Failed to create stage");
    assert_eq!(stage.metadata().plugin_type, PluginType::Transform);
}

#[test]
fn test_unknown_plugin_is_rejected() {
    let mut cfg = config("http://localhost", false);
    cfg.pipeline.plugin = "FaceBlur".into();

    match Application::new(cfg) {
        Err(ExtractorError::Plugin(message)) => assert!(message.contains("FaceBlur")),
        Err(other) => panic!("unexpected error: {other:?}"),
        Ok(_) => panic!("unknown plugin accepted"),
    }
}

#[test]
fn test_bad_literal_rejected_when_building_stage() {
    let mut cfg = config("http://localhost", false);
    cfg.pipeline
        .properties
        .insert("requestTimeoutSeconds".into(), "soon".into());

    let err = Application::new(cfg).err().expect("bad timeout accepted");
    assert!(err.is_configuration());
}
