//! Response envelopes shared by every endpoint.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::models::null_as_empty;

/// Machine-readable error body returned by the callback service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Application error code (not the HTTP status).
    #[serde(default)]
    pub code: i64,
    /// Short summary.
    #[serde(default)]
    pub message: String,
    /// Longer explanation, often with a remedy.
    #[serde(default)]
    pub description: String,
    /// Only populated by servers running in debug mode.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stack_trace: Option<String>,
    /// Per-field validation failures.
    #[serde(default, deserialize_with = "null_as_empty", skip_serializing_if = "Vec::is_empty")]
    pub field_error: Vec<FieldError>,
}

impl ServiceError {
    /// Creates an error with a code and message.
    #[must_use]
    pub fn new(code: i64, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            ..Self::default()
        }
    }

    /// Sets the long-form description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Returns the error reported for `field`, if any.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldError> {
        self.field_error.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "service error code {}", self.code)
        } else {
            f.write_str(&self.message)
        }
    }
}

impl std::error::Error for ServiceError {}

/// Validation failure for a single request field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// JSON name of the field.
    pub name: String,
    /// What is wrong with it.
    pub description: String,
}

/// `{ "ok": false, "error": { ... } }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub ok: bool,
    /// Missing error objects decode as [`ServiceError::default`].
    #[serde(default)]
    pub error: ServiceError,
}

/// `{ "ok": true, "data": ... }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataEnvelope<T> {
    #[serde(default)]
    pub ok: bool,
    pub data: T,
}
