//! Payload decoding
//!
//! Broker payloads are UTF-8 JSON objects. Anything else is a decode
//! failure, which the ingest loop reports and drops.

use serde_json::Value;
use thiserror::Error;

use super::types::RawMessage;

/// Why a payload could not be turned into a [`RawMessage`].
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("payload is not valid JSON: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("payload is a JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

/// Decode a raw broker payload.
pub fn decode(payload: &[u8]) -> Result<RawMessage, DecodeError> {
    match serde_json::from_slice::<Value>(payload)? {
        Value::Object(map) => Ok(RawMessage::new(map)),
        Value::Null => Err(DecodeError::NotAnObject("null")),
        Value::Bool(_) => Err(DecodeError::NotAnObject("boolean")),
        Value::Number(_) => Err(DecodeError::NotAnObject("number")),
        Value::String(_) => Err(DecodeError::NotAnObject("string")),
        Value::Array(_) => Err(DecodeError::NotAnObject("array")),
    }
}
