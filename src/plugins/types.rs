// src/plugins/types.rs
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utils::error::{ExtractorError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginType {
    Transform,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginMetadata {
    pub id: Uuid,
    pub name: String,
    pub plugin_type: PluginType,
    pub description: String,
    pub version: String,
}

/// Raw stage properties as the host hands them over.
pub type StageProperties = HashMap<String, String>;

/// Runtime arguments used to resolve macro properties.
pub type RuntimeArguments = HashMap<String, String>;

/// Looks a key up exactly, then ignoring ASCII case. Layered config
/// sources may fold keys to lower case.
pub fn property<'a>(map: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    map.get(name)
        .or_else(|| {
            map.iter()
                .find(|(key, _)| key.eq_ignore_ascii_case(name))
                .map(|(_, value)| value)
        })
        .map(String::as_str)
}

/// A property that is either known at configuration time or a `${name}`
/// macro resolved from runtime arguments.
#[derive(Debug, Clone, PartialEq)]
pub enum Deferred<T> {
    Value(T),
    Macro(String),
}

impl<T> From<T> for Deferred<T> {
    fn from(value: T) -> Self {
        Deferred::Value(value)
    }
}

fn macro_name(raw: &str) -> Option<&str> {
    raw.trim()
        .strip_prefix("${")?
        .strip_suffix('}')
        .map(str::trim)
        .filter(|name| !name.is_empty())
}

impl<T> Deferred<T>
where
    T: FromStr + Clone,
    T::Err: Display,
{
    /// Parses a property value. `key` is only used in error messages.
    pub fn parse(key: &str, raw: &str) -> Result<Self> {
        if let Some(name) = macro_name(raw) {
            return Ok(Deferred::Macro(name.to_string()));
        }
        raw.trim().parse().map(Deferred::Value).map_err(|e| {
            ExtractorError::Config(format!(
                "Invalid value '{}' for property '{}': {}",
                raw, key, e
            ))
        })
    }

    pub fn is_macro(&self) -> bool {
        matches!(self, Deferred::Macro(_))
    }

    pub fn resolve(&self, key: &str, arguments: &RuntimeArguments) -> Result<T> {
        match self {
            Deferred::Value(value) => Ok(value.clone()),
            Deferred::Macro(name) => {
                let raw = property(arguments, name).ok_or_else(|| {
                    ExtractorError::Config(format!(
                        "Macro '${{{}}}' for property '{}' has no runtime argument",
                        name, key
                    ))
                })?;
                raw.trim().parse().map_err(|e| {
                    ExtractorError::Config(format!(
                        "Runtime argument '{}' is not a valid value for property '{}': {}",
                        name, key, e
                    ))
                })
            }
        }
    }
}
