//! Decoded message representation

use std::fmt;

use serde_json::{Map, Value};

/// The fields a kiosk message may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    /// Timestamp of the interaction
    At,
    /// Exhibition site code
    Site,
    /// Rating, or the assistance sentinel
    Val,
    /// Assistance request kind
    Type,
}

impl Field {
    /// Fields that every message must carry, in reporting order.
    pub const REQUIRED: [Field; 3] = [Field::At, Field::Site, Field::Val];

    /// Returns the JSON key for this field
    pub fn key(&self) -> &'static str {
        match self {
            Field::At => "at",
            Field::Site => "site",
            Field::Val => "val",
            Field::Type => "type",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

/// A decoded, unvalidated kiosk message.
///
/// Key presence and `null` values are kept distinct: a key mapped to
/// `null` is present, but its value is treated as absent where the
/// validation rules care about values rather than keys.
#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    fields: Map<String, Value>,
}

impl RawMessage {
    /// Wraps an already decoded JSON object.
    pub fn new(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Returns true if the key exists, whatever its value.
    pub fn contains(&self, field: Field) -> bool {
        self.fields.contains_key(field.key())
    }

    /// Returns the value for a field, with `null` folded into `None`.
    pub fn value(&self, field: Field) -> Option<&Value> {
        match self.fields.get(field.key()) {
            Some(Value::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    /// Borrow the underlying object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Compact JSON rendering, used when a message is written to the reject log.
    pub fn to_json_string(&self) -> String {
        Value::Object(self.fields.clone()).to_string()
    }
}

impl From<Map<String, Value>> for RawMessage {
    fn from(fields: Map<String, Value>) -> Self {
        Self::new(fields)
    }
}
