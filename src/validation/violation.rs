//! Violation kinds and their rendering

use std::fmt;

use crate::message::Field;

/// Prefix of a rendered report; a report equal to it carries no violations.
pub const REPORT_PREFIX: &str = "Invalid:";

/// One failed validation rule.
///
/// Kept structured inside the pipeline; rendered to text only when a
/// rejection is logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A required key is absent
    MissingKey(Field),
    /// The field holds something other than an integer
    NotAnInteger(Field),
    /// The field is an integer outside its permitted range
    OutsideOfLimit(Field),
    /// A rating message carries an assistance `type`
    TypeIncluded { val: i64 },
    /// `at` could not be parsed as a timestamp
    UnparseableTime { value: String, reason: String },
    /// `at` falls outside opening hours plus grace
    OutsideOpeningHours,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::MissingKey(field) => write!(f, "No '{}' key.", field),
            Violation::NotAnInteger(field) => write!(f, "'{}' not an integer.", field),
            Violation::OutsideOfLimit(field) => write!(f, "'{}' outside of limit.", field),
            Violation::TypeIncluded { val } => {
                write!(f, "{} is included when val is {}.", Field::Type, val)
            }
            Violation::UnparseableTime { value, reason } => write!(
                f,
                "time data '{}' does not match format '{}' ({}) for at data",
                value,
                super::TIMESTAMP_FORMAT,
                reason
            ),
            Violation::OutsideOpeningHours => write!(f, "Time is outside of opening hours."),
        }
    }
}

/// Human readable rendering of all violations for one message.
///
/// Renders as `Invalid:` followed by each violation, space separated.
#[derive(Debug, Clone, Copy)]
pub struct ValidationReport<'a> {
    violations: &'a [Violation],
}

impl<'a> ValidationReport<'a> {
    pub fn new(violations: &'a [Violation]) -> Self {
        Self { violations }
    }

    /// Returns true if there is nothing to report.
    pub fn is_clean(&self) -> bool {
        self.violations.is_empty()
    }

    /// The violations with their prefix stripped, e.g. ` No 'at' key. No 'val' key.`
    pub fn details(&self) -> String {
        self.violations.iter().map(|v| format!(" {}", v)).collect()
    }
}

impl fmt::Display for ValidationReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", REPORT_PREFIX, self.details())
    }
}
