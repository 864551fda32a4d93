use serde::{Deserialize, Serialize};

/// Events that move an orchestration unit through its lifecycle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum UnitEvent {
    /// Invoke the triggering operation
    Start,
    /// Hand control back to the host scheduler
    Suspend,
    /// Host scheduler resumed the unit for a poll cycle
    Resume,
    /// Every tracked member finished
    Complete,
    /// Every tracked member finished after a cancellation request
    Cancel,
    /// Unrecoverable failure with its message
    Fail(String),
}

impl UnitEvent {
    /// Get a string representation of the event type for logging
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Start => "start",
            Self::Suspend => "suspend",
            Self::Resume => "resume",
            Self::Complete => "complete",
            Self::Cancel => "cancel",
            Self::Fail(_) => "fail",
        }
    }

    /// Extract error message if this is a failure event
    pub fn error_message(&self) -> Option<&str> {
        match self {
            Self::Fail(msg) => Some(msg),
            _ => None,
        }
    }

    /// Create a failure event with the given error message
    pub fn fail_with_error(error: impl Into<String>) -> Self {
        Self::Fail(error.into())
    }
}
