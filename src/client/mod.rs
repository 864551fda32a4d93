//! # Remote Task Client
//!
//! Capability contract for the content backend's task API, plus the plain
//! descriptor types every response is reduced to.
//!
//! The orchestration core never talks HTTP itself; it consumes any
//! [`RemoteTaskClient`] implementation. Transport failures surface as
//! [`OrchestrationError::Transport`](crate::error::OrchestrationError::Transport).

pub mod memory;

use crate::constants::{task_states, GENERIC_TASK_FAILURE};
use crate::error::OrchestrationResult;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use memory::{InMemoryTaskClient, RemoteCall};

/// Error payload attached to a remote task
///
/// Backends report either a bare message or an object with a description and
/// traceback; both shapes deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskErrorPayload {
    Message(String),
    Structured {
        #[serde(default)]
        description: Option<String>,
        #[serde(default)]
        traceback: Option<String>,
    },
}

impl TaskErrorPayload {
    pub fn message(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }

    /// Non-empty description carried by the payload
    pub fn description(&self) -> Option<&str> {
        let text = match self {
            Self::Message(message) => Some(message.as_str()),
            Self::Structured { description, .. } => description.as_deref(),
        };
        text.filter(|t| !t.trim().is_empty())
    }
}

impl From<&str> for TaskErrorPayload {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

/// Plain form of one remote task as reported by the backend
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDescriptor {
    #[serde(alias = "pulp_href")]
    pub href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Raw backend state string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    /// Explicit started flag; derived from `state` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started: Option<bool>,

    /// Explicit done flag; derived from `state` when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub done: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<TaskErrorPayload>,

    #[serde(
        default,
        alias = "task_group",
        skip_serializing_if = "Option::is_none"
    )]
    pub task_group_href: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskDescriptor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    pub fn with_started(mut self, started: bool) -> Self {
        self.started = Some(started);
        self
    }

    pub fn with_done(mut self, done: bool) -> Self {
        self.done = Some(done);
        self
    }

    pub fn with_error(mut self, error: impl Into<TaskErrorPayload>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn with_task_group(mut self, href: impl Into<String>) -> Self {
        self.task_group_href = Some(href.into());
        self
    }

    /// Whether the task reached a final state
    pub fn is_done(&self) -> bool {
        self.done.unwrap_or_else(|| {
            self.state
                .as_deref()
                .is_some_and(task_states::is_finished)
        })
    }

    /// Whether the backend picked the task up
    pub fn is_started(&self) -> bool {
        if let Some(started) = self.started {
            return started;
        }
        if self.started_at.is_some() {
            return true;
        }
        match self.state.as_deref() {
            Some(state) => state != task_states::WAITING,
            None => false,
        }
    }

    /// Error message reported for this task, if any
    ///
    /// A `failed` task without a usable description still reports a generic
    /// failure so it is never mistaken for a success.
    pub fn error_message(&self) -> Option<String> {
        if let Some(description) = self.error.as_ref().and_then(TaskErrorPayload::description) {
            return Some(description.to_string());
        }
        match self.state.as_deref() {
            Some(task_states::FAILED) => Some(GENERIC_TASK_FAILURE.to_string()),
            _ => None,
        }
    }
}

/// Plain form of a backend task group
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskGroupDescriptor {
    #[serde(alias = "pulp_href")]
    pub href: String,

    #[serde(default, alias = "description")]
    pub name: Option<String>,

    #[serde(default, alias = "tasks")]
    pub member_hrefs: Vec<String>,

    /// False while the backend is still spawning members
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub all_tasks_dispatched: Option<bool>,

    /// Raw aggregate state; informational only, never used for completion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl TaskGroupDescriptor {
    pub fn new(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            ..Default::default()
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_members<I, S>(mut self, hrefs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.member_hrefs = hrefs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_all_tasks_dispatched(mut self, dispatched: bool) -> Self {
        self.all_tasks_dispatched = Some(dispatched);
        self
    }
}

/// Bounded request/response access to the backend's task API
#[async_trait]
pub trait RemoteTaskClient: Send + Sync {
    /// Fetch the current state of one task
    async fn get_task(&self, href: &str) -> OrchestrationResult<TaskDescriptor>;

    /// Fetch a task group's name and member list
    async fn get_task_group(&self, href: &str) -> OrchestrationResult<TaskGroupDescriptor>;

    /// Fetch the current state of every member of a task group
    async fn get_task_group_members(&self, href: &str) -> OrchestrationResult<Vec<TaskDescriptor>>;

    /// Ask the backend to cancel a task; does not wait for the effect
    async fn cancel_task(&self, href: &str) -> OrchestrationResult<()>;
}
