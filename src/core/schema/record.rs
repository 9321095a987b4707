// src/core/schema/record.rs
use std::sync::Arc;

use bytes::Bytes;
use serde::ser::{Serialize, SerializeMap, Serializer};
use thiserror::Error;

use super::types::{LogicalType, Schema};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum RecordError {
    #[error("Schema '{0}' is not a record")]
    NotARecord(String),

    #[error("Field '{0}' is not present in the record schema")]
    UnknownField(String),

    #[error("Field '{field}' of type '{expected}' cannot hold a {actual} value")]
    TypeMismatch {
        field: String,
        expected: String,
        actual: &'static str,
    },

    #[error("Field '{0}' is not nullable")]
    NotNullable(String),
}

/// A single value stored in a record field.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    Bytes(Bytes),
    String(String),
}

impl Value {
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Int(_) => "int",
            Value::Long(_) => "long",
            Value::Float(_) => "float",
            Value::Double(_) => "double",
            Value::Bytes(_) => "bytes",
            Value::String(_) => "string",
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bytes(&self) -> Option<&Bytes> {
        match self {
            Value::Bytes(b) => Some(b),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Double(v) => Some(*v),
            Value::Float(v) => Some(f64::from(*v)),
            _ => None,
        }
    }

    pub fn as_i32(&self) -> Option<i32> {
        match self {
            Value::Int(v) => Some(*v),
            _ => None,
        }
    }

    /// Whether this value can be stored in a field of the given type.
    fn fits(&self, schema: &Schema) -> bool {
        match (self, schema) {
            (Value::Null, schema) => matches!(schema, Schema::Null) || schema.is_nullable(),
            (value, Schema::Union { branches }) => branches.iter().any(|b| value.fits(b)),
            (value, Schema::Logical { logical_type }) => match logical_type {
                LogicalType::Datetime => matches!(value, Value::String(_)),
                other => value.fits(&other.physical()),
            },
            (Value::Boolean(_), Schema::Boolean)
            | (Value::Int(_), Schema::Int)
            | (Value::Long(_), Schema::Long)
            | (Value::Float(_), Schema::Float)
            | (Value::Double(_), Schema::Double)
            | (Value::Bytes(_), Schema::Bytes)
            | (Value::String(_), Schema::String) => true,
            (Value::String(s), Schema::Enum { symbols }) => symbols.iter().any(|sym| sym == s),
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Int(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Long(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Double(v)
    }
}

impl From<Bytes> for Value {
    fn from(v: Bytes) -> Self {
        Value::Bytes(v)
    }
}

impl From<Vec<u8>> for Value {
    fn from(v: Vec<u8>) -> Self {
        Value::Bytes(Bytes::from(v))
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_none(),
            Value::Boolean(v) => serializer.serialize_bool(*v),
            Value::Int(v) => serializer.serialize_i32(*v),
            Value::Long(v) => serializer.serialize_i64(*v),
            Value::Float(v) => serializer.serialize_f32(*v),
            Value::Double(v) => serializer.serialize_f64(*v),
            Value::Bytes(v) => serializer.serialize_str(&hex::encode(v)),
            Value::String(v) => serializer.serialize_str(v),
        }
    }
}

/// A record conforming to a record schema. Values are stored positionally,
/// one per schema field.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRecord {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl StructuredRecord {
    pub fn builder(schema: Arc<Schema>) -> RecordBuilder {
        let width = schema.fields().map_or(0, <[_]>::len);
        RecordBuilder {
            schema,
            values: vec![Value::Null; width],
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.schema
            .field_index(name)
            .and_then(|idx| self.values.get(idx))
    }

    pub fn get_bytes(&self, name: &str) -> Option<&Bytes> {
        self.get(name).and_then(Value::as_bytes)
    }

    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_f64)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Field name and value pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.schema
            .fields()
            .unwrap_or_default()
            .iter()
            .map(|f| f.name.as_str())
            .zip(self.values.iter())
    }
}

impl Serialize for StructuredRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone)]
pub struct RecordBuilder {
    schema: Arc<Schema>,
    values: Vec<Value>,
}

impl RecordBuilder {
    pub fn set(mut self, name: &str, value: impl Into<Value>) -> Result<Self, RecordError> {
        let value = value.into();
        let (idx, field) = self
            .schema
            .fields()
            .and_then(|fields| fields.iter().enumerate().find(|(_, f)| f.name == name))
            .ok_or_else(|| RecordError::UnknownField(name.to_string()))?;

        if value.is_null() && !field.schema.is_nullable() {
            return Err(RecordError::NotNullable(name.to_string()));
        }
        if !value.fits(&field.schema) {
            return Err(RecordError::TypeMismatch {
                field: name.to_string(),
                expected: field.schema.display_name(),
                actual: value.kind(),
            });
        }

        self.values[idx] = value;
        Ok(self)
    }

    pub fn build(self) -> Result<StructuredRecord, RecordError> {
        let fields = match self.schema.as_ref() {
            Schema::Record { fields, .. } => fields,
            other => return Err(RecordError::NotARecord(other.display_name())),
        };

        if let Some((field, _)) = fields
            .iter()
            .zip(self.values.iter())
            .find(|(field, value)| value.is_null() && !field.schema.is_nullable())
        {
            return Err(RecordError::NotNullable(field.name.clone()));
        }

        Ok(StructuredRecord {
            schema: self.schema,
            values: self.values,
        })
    }
}
