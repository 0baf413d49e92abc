//! Response body shapes.

use crate::error::ApiError;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// A success body: `{ "success": true, "<key>": payload, "message"? }`
///
/// The payload key depends on the endpoint (`task`, `tasks`, `leaves`...),
/// so callers pick it with [`Envelope::take`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Envelope {
    body: Map<String, Value>,
}

impl Envelope {
    /// Decode a response body; an empty body is an empty envelope
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the body is not a JSON object.
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ApiError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        match serde_json::from_slice(bytes) {
            Ok(Value::Object(body)) => Ok(Self { body }),
            Ok(other) => Err(ApiError::Decode(format!(
                "expected a JSON object, got {}",
                kind_of(&other)
            ))),
            Err(e) => Err(ApiError::Decode(e.to_string())),
        }
    }

    /// Server-provided human-readable message
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
    }

    /// Machine-readable error code, if any
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        self.body.get("code").and_then(Value::as_str)
    }

    /// The `success` flag (absent counts as `true` for 2xx responses)
    #[must_use]
    pub fn success(&self) -> bool {
        self.body.get("success").and_then(Value::as_bool).unwrap_or(true)
    }

    /// Whether the payload key is present
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.body.contains_key(key)
    }

    /// Deserialize the payload stored under `key`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the key is missing or has the wrong shape.
    pub fn take<T: DeserializeOwned>(&self, key: &str) -> Result<T, ApiError> {
        let value = self
            .body
            .get(key)
            .ok_or_else(|| ApiError::Decode(format!("response has no `{key}` field")))?;

        T::deserialize(value).map_err(|e| ApiError::Decode(format!("`{key}`: {e}")))
    }

    /// Like [`Envelope::take`] but a missing key yields `None`
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Decode`] if the key is present with the wrong shape.
    pub fn take_optional<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ApiError> {
        match self.body.get(key) {
            None | Some(Value::Null) => Ok(None),
            Some(_) => self.take(key).map(Some),
        }
    }
}

/// An error body: `{ "message": "...", "code"? }`
///
/// Both fields are optional; a body that is not JSON reads as empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ErrorBody {
    /// Human-readable message
    #[serde(default)]
    pub message: Option<String>,
    /// Machine-readable error code
    #[serde(default)]
    pub code: Option<String>,
}

impl ErrorBody {
    /// Decode leniently
    #[must_use]
    pub fn from_slice(bytes: &[u8]) -> Self {
        serde_json::from_slice(bytes).unwrap_or_default()
    }
}

const fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
