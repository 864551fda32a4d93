use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle states of an orchestration unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// The triggering operation has not been invoked yet
    #[default]
    NotStarted,
    /// Initiating or polling within the current invocation
    Running,
    /// Waiting for the host scheduler to resume it
    Suspended,
    /// Every tracked task and group finished cleanly
    Completed,
    /// A remote error or an unrecoverable poll failure stopped it
    Failed,
    /// Finished cleanly after a cancellation request
    Cancelled,
}

impl UnitState {
    /// Check if this is a terminal state (no further transitions allowed)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed | Self::Cancelled)
    }

    /// Check if the unit is waiting on the remote backend
    pub fn is_waiting(&self) -> bool {
        matches!(self, Self::Running | Self::Suspended)
    }
}

impl fmt::Display for UnitState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotStarted => write!(f, "not_started"),
            Self::Running => write!(f, "running"),
            Self::Suspended => write!(f, "suspended"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

impl std::str::FromStr for UnitState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "not_started" => Ok(Self::NotStarted),
            "running" => Ok(Self::Running),
            "suspended" => Ok(Self::Suspended),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(format!("Invalid unit state: {s}")),
        }
    }
}
