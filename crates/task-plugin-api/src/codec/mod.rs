//! JSON codec port used by the command layer.
//!
//! Commands never depend on a concrete JSON library; they decode request
//! bodies and encode response bodies through [`JsonCodec`]. The default
//! adapter, [`SerdeJsonCodec`], is backed by `serde_json`.

use serde_json::{Map, Value};

use crate::error::CodecError;

/// Decoded form of a request body: string keys mapped to JSON values.
pub type ParsedRequest = Map<String, Value>;

/// Encodes response bodies and decodes request bodies.
///
/// Implementations must be shareable across the threads the host uses to
/// invoke the dispatcher.
pub trait JsonCodec: Send + Sync {
    /// Renders a value tree as JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encode`] if the value cannot be rendered.
    fn encode(&self, value: &Value) -> Result<String, CodecError>;

    /// Parses request text into a key/value map.
    ///
    /// An empty or whitespace-only body decodes to an empty map because the
    /// host omits bodies for requests that carry no parameters.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Decode`] for malformed JSON and
    /// [`CodecError::NotAnObject`] when the top-level value is not an object.
    fn decode(&self, text: &str) -> Result<ParsedRequest, CodecError>;
}

/// Codec adapter backed by `serde_json`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonCodec;

impl JsonCodec for SerdeJsonCodec {
    fn encode(&self, value: &Value) -> Result<String, CodecError> {
        serde_json::to_string(value).map_err(CodecError::Encode)
    }

    fn decode(&self, text: &str) -> Result<ParsedRequest, CodecError> {
        if text.trim().is_empty() {
            return Ok(ParsedRequest::new());
        }

        match serde_json::from_str(text).map_err(CodecError::Decode)? {
            Value::Object(map) => Ok(map),
            other => Err(CodecError::NotAnObject {
                found: json_type_name(&other),
            }),
        }
    }
}

const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
