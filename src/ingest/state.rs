//! Ingest loop state machine
//!
//! - States are explicit and enumerable
//! - Only the transitions below are legal
//! - `Stopped` is terminal
//!
//! ```text
//! Idle -> Subscribed -> Running <-> Draining
//!   \          \           \          \
//!    +----------+-----------+----------+--> Stopped
//! ```

use std::fmt;

/// Lifecycle state of an ingest loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IngestState {
    /// Constructed, not yet subscribed
    #[default]
    Idle,
    /// Topic subscription accepted
    Subscribed,
    /// Polling for messages
    Running,
    /// Flush in progress
    Draining,
    /// Source released, loop finished
    Stopped,
}

impl IngestState {
    pub fn as_str(&self) -> &'static str {
        match self {
            IngestState::Idle => "IDLE",
            IngestState::Subscribed => "SUBSCRIBED",
            IngestState::Running => "RUNNING",
            IngestState::Draining => "DRAINING",
            IngestState::Stopped => "STOPPED",
        }
    }

    /// Returns true if moving from `self` to `next` is legal.
    pub fn can_transition_to(&self, next: IngestState) -> bool {
        use IngestState::*;
        matches!(
            (self, next),
            (Idle, Subscribed)
                | (Subscribed, Running)
                | (Running, Draining)
                | (Draining, Running)
                | (Idle | Subscribed | Running | Draining, Stopped)
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, IngestState::Stopped)
    }
}

impl fmt::Display for IngestState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
