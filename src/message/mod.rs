//! Inbound message model
//!
//! Kiosk events arrive as JSON objects with the fields `at`, `site`, `val`
//! and (for assistance requests) `type`. This module owns the decoded form
//! and the payload decoder; it performs no semantic checks.

mod decode;
mod types;

pub use decode::{decode, DecodeError};
pub use types::{Field, RawMessage};
