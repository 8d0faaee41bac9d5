//! Kiosk message validator
//!
//! Rule groups run in a fixed order (keys, value/type, site, time) and
//! every group runs for every message. Within the value/type group the
//! first failing check ends the group: a non-integer `val` has no range.

use chrono::{DateTime, FixedOffset};
use serde_json::Value;

use crate::message::{Field, RawMessage};

use super::hours::OpeningHours;
use super::violation::Violation;

/// Timestamp layout accepted for `at`, as reported in violations.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%f%z";

/// chrono layout: six fractional digits and a `+HH:MM` offset.
const CHRONO_TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S.%6f%:z";

/// `val` marking an assistance request rather than a rating.
pub const ASSISTANCE_SENTINEL: i64 = -1;

const VAL_RANGE: (i64, i64) = (ASSISTANCE_SENTINEL, 5);
const TYPE_RANGE: (i64, i64) = (0, 1);
const SITE_RANGE: (u64, u64) = (0, 5);

/// What a valid message reports: `val` and `type` taken together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reading {
    /// `val` in [0, 5]
    Rating(u8),
    /// `val` was the sentinel; holds `type` in [0, 1]
    Assistance(u8),
}

impl Reading {
    /// The `val` as sent: the rating, or -1 for assistance.
    pub fn val(&self) -> i64 {
        match self {
            Reading::Rating(rating) => i64::from(*rating),
            Reading::Assistance(_) => ASSISTANCE_SENTINEL,
        }
    }
}

/// A message that passed every rule, with its fields in typed form.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidMessage {
    raw: RawMessage,
    reading: Reading,
    site: u8,
    observed_at: DateTime<FixedOffset>,
}

impl ValidMessage {
    pub fn reading(&self) -> Reading {
        self.reading
    }

    /// Exhibition site code, 0 to 5.
    pub fn site(&self) -> u8 {
        self.site
    }

    pub fn observed_at(&self) -> DateTime<FixedOffset> {
        self.observed_at
    }

    pub fn raw(&self) -> &RawMessage {
        &self.raw
    }
}

/// Result of checking one message.
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationOutcome {
    Valid(ValidMessage),
    Invalid {
        message: RawMessage,
        violations: Vec<Violation>,
    },
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationOutcome::Valid(_))
    }
}

/// Validator for kiosk messages.
///
/// Holds only configuration; validating never mutates it, so the same
/// message always produces the same violations.
#[derive(Debug, Clone, Default)]
pub struct MessageValidator {
    hours: OpeningHours,
}

/// Everything learned from one pass over a message.
struct Inspection {
    violations: Vec<Violation>,
    reading: Option<Reading>,
    site: Option<u8>,
    observed_at: Option<DateTime<FixedOffset>>,
}

impl MessageValidator {
    /// Creates a validator with the given opening hours.
    pub fn new(hours: OpeningHours) -> Self {
        Self { hours }
    }

    pub fn opening_hours(&self) -> &OpeningHours {
        &self.hours
    }

    /// Lists every rule the message breaks. An empty list means valid.
    pub fn validate(&self, msg: &RawMessage) -> Vec<Violation> {
        self.inspect(msg).violations
    }

    /// Validates and, on success, captures the typed fields.
    pub fn check(&self, msg: RawMessage) -> ValidationOutcome {
        let inspection = self.inspect(&msg);
        let (Some(reading), Some(site), Some(observed_at)) =
            (inspection.reading, inspection.site, inspection.observed_at)
        else {
            return ValidationOutcome::Invalid {
                message: msg,
                violations: inspection.violations,
            };
        };
        if !inspection.violations.is_empty() {
            return ValidationOutcome::Invalid {
                message: msg,
                violations: inspection.violations,
            };
        }

        ValidationOutcome::Valid(ValidMessage {
            raw: msg,
            reading,
            site,
            observed_at,
        })
    }

    fn inspect(&self, msg: &RawMessage) -> Inspection {
        let mut violations = Vec::new();

        for field in Field::REQUIRED {
            if !msg.contains(field) {
                violations.push(Violation::MissingKey(field));
            }
        }

        let reading = if msg.contains(Field::Val) {
            record(&mut violations, check_value_type(msg))
        } else {
            None
        };

        let site = record(&mut violations, check_site(msg.value(Field::Site)));

        // A missing `at` is already reported; null and "" count as unparseable.
        let observed_at = match msg.as_map().get(Field::At.key()) {
            None => None,
            Some(value) => record(&mut violations, self.check_time(value)),
        };

        Inspection {
            violations,
            reading,
            site,
            observed_at,
        }
    }

    fn check_time(&self, value: &Value) -> Result<DateTime<FixedOffset>, Violation> {
        let Value::String(text) = value else {
            return Err(Violation::UnparseableTime {
                value: value.to_string(),
                reason: "expected a string".into(),
            });
        };

        let observed_at = parse_timestamp(text)?;
        if !self.hours.contains(observed_at.time()) {
            return Err(Violation::OutsideOpeningHours);
        }
        Ok(observed_at)
    }
}

/// Pushes the error, if any, and hands back the success value.
fn record<T>(violations: &mut Vec<Violation>, result: Result<T, Violation>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(violation) => {
            violations.push(violation);
            None
        }
    }
}

/// Integer view of a JSON value. Booleans and floats are not integers.
fn integer(value: Option<&Value>) -> Option<i128> {
    match value? {
        Value::Number(n) => n
            .as_i64()
            .map(i128::from)
            .or_else(|| n.as_u64().map(i128::from)),
        _ => None,
    }
}

fn outside(num: i128, (lower, upper): (i64, i64)) -> bool {
    num < i128::from(lower) || num > i128::from(upper)
}

fn check_value_type(msg: &RawMessage) -> Result<Reading, Violation> {
    let val = integer(msg.value(Field::Val)).ok_or(Violation::NotAnInteger(Field::Val))?;
    if outside(val, VAL_RANGE) {
        return Err(Violation::OutsideOfLimit(Field::Val));
    }

    if val == i128::from(ASSISTANCE_SENTINEL) {
        let kind = integer(msg.value(Field::Type)).ok_or(Violation::NotAnInteger(Field::Type))?;
        if outside(kind, TYPE_RANGE) {
            return Err(Violation::OutsideOfLimit(Field::Type));
        }
        Ok(Reading::Assistance(kind as u8))
    } else if msg.value(Field::Type).is_some() {
        Err(Violation::TypeIncluded { val: val as i64 })
    } else {
        Ok(Reading::Rating(val as u8))
    }
}

fn check_site(value: Option<&Value>) -> Result<u8, Violation> {
    let site = match value {
        Some(Value::String(s)) if !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => {
            // All digits, so the only parse failure left is overflow.
            s.parse::<u64>().unwrap_or(u64::MAX)
        }
        Some(Value::Number(n)) => n.as_u64().ok_or(Violation::NotAnInteger(Field::Site))?,
        _ => return Err(Violation::NotAnInteger(Field::Site)),
    };

    let (lower, upper) = SITE_RANGE;
    if site < lower || site > upper {
        return Err(Violation::OutsideOfLimit(Field::Site));
    }
    Ok(site as u8)
}

fn parse_timestamp(text: &str) -> Result<DateTime<FixedOffset>, Violation> {
    DateTime::parse_from_str(text, CHRONO_TIMESTAMP_FORMAT).map_err(|e| {
        Violation::UnparseableTime {
            value: text.to_string(),
            reason: e.to_string(),
        }
    })
}
