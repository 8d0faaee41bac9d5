//! Message validation
//!
//! Every decoded message is checked against the kiosk schema and business
//! rules before it can be accumulated for upload.
//!
//! # Rules
//!
//! - `at`, `site` and `val` must be present
//! - `val` is an integer in [-1, 5]; -1 marks an assistance request
//! - assistance requests carry an integer `type` in [0, 1], ratings carry none
//! - `site` is a digit string (or non-negative integer) in [0, 5]
//! - `at` is a microsecond ISO-8601 timestamp with offset, inside opening
//!   hours widened by the grace window
//!
//! All rule groups run for every message, so one report lists every problem.
//! Validation is pure: the same message always yields the same violations.

mod hours;
mod validator;
mod violation;

pub use hours::OpeningHours;
pub use validator::{
    MessageValidator, Reading, ValidMessage, ValidationOutcome, ASSISTANCE_SENTINEL,
    TIMESTAMP_FORMAT,
};
pub use violation::{ValidationReport, Violation};
