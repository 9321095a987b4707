//! Configuration validation against the input schema.
//!
//! Failures are accumulated in a [`FailureCollector`] so a caller sees every
//! problem at once. [`FailureCollector::get_or_throw`] turns a non-empty
//! collector into a [`ValidationException`].

use std::fmt;

use serde::Serialize;

use crate::core::schema::Schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    MissingSchema,
    FieldNotFound,
    InvalidFieldType,
    InvalidProperty,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationFailure {
    pub stage: String,
    pub kind: FailureKind,
    pub message: String,
    pub corrective_action: Option<String>,
    pub config_property: Option<String>,
}

impl ValidationFailure {
    pub fn with_config_property(&mut self, property: impl Into<String>) -> &mut Self {
        self.config_property = Some(property.into());
        self
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(action) = &self.corrective_action {
            write!(f, " {}", action)?;
        }
        if let Some(property) = &self.config_property {
            write!(f, " (property '{}')", property)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ValidationException {
    pub failures: Vec<ValidationFailure>,
}

impl fmt::Display for ValidationException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation failed with {} error(s)", self.failures.len())?;
        for failure in &self.failures {
            write!(f, "; {}", failure)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationException {}

#[derive(Debug, Clone, Default)]
pub struct FailureCollector {
    stage: String,
    failures: Vec<ValidationFailure>,
}

impl FailureCollector {
    pub fn new(stage: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            failures: Vec::new(),
        }
    }

    pub fn add_failure(
        &mut self,
        kind: FailureKind,
        message: impl Into<String>,
        corrective_action: Option<&str>,
    ) -> &mut ValidationFailure {
        self.failures.push(ValidationFailure {
            stage: self.stage.clone(),
            kind,
            message: message.into(),
            corrective_action: corrective_action.map(str::to_string),
            config_property: None,
        });
        let last = self.failures.len() - 1;
        &mut self.failures[last]
    }

    pub fn failures(&self) -> &[ValidationFailure] {
        &self.failures
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn get_or_throw(&self) -> Result<(), ValidationException> {
        if self.failures.is_empty() {
            Ok(())
        } else {
            Err(ValidationException {
                failures: self.failures.clone(),
            })
        }
    }
}

/// Checks that `source_field` names a plain or nullable `bytes` field of
/// `input_schema`. A missing schema or missing field ends validation early
/// since nothing more can be checked.
pub fn validate_source_field(
    input_schema: Option<&Schema>,
    source_field: &str,
    property: &str,
    collector: &mut FailureCollector,
) {
    let Some(input_schema) = input_schema else {
        collector.add_failure(
            FailureKind::MissingSchema,
            "Could not get the input schema to validate.",
            Some("Provide a valid input schema."),
        );
        return;
    };

    if source_field.trim().is_empty() {
        collector
            .add_failure(
                FailureKind::FieldNotFound,
                "Source field name must be specified.",
                Some("Provide the name of the input field holding the image bytes."),
            )
            .with_config_property(property);
        return;
    }

    let Some(field) = input_schema.field(source_field) else {
        collector
            .add_failure(
                FailureKind::FieldNotFound,
                format!(
                    "Source field '{}' must be present in the input schema.",
                    source_field
                ),
                None,
            )
            .with_config_property(property);
        return;
    };

    let schema = field.schema.non_nullable();
    if schema.logical_type().is_some() || !matches!(schema, Schema::Bytes) {
        collector
            .add_failure(
                FailureKind::InvalidFieldType,
                format!(
                    "Source field '{}' is of unexpected type '{}'.",
                    field.name,
                    schema.display_name()
                ),
                Some("Ensure it is of type 'bytes'."),
            )
            .with_config_property(property);
    }
}

/// Throw-on-first-failure form of [`validate_source_field`].
pub fn validate_source_field_strict(
    input_schema: Option<&Schema>,
    source_field: &str,
    property: &str,
    stage: &str,
) -> Result<(), ValidationException> {
    let mut collector = FailureCollector::new(stage);
    validate_source_field(input_schema, source_field, property, &mut collector);
    collector.get_or_throw()
}
