//! Boundary types between an orchestration unit and the workflow engine hosting it.

use super::response::TaskResponse;
use crate::error::OrchestrationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

/// Why the host scheduler is invoking the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunEvent {
    /// Plan or resume: initiate on first entry, poll afterwards
    Execute,
    /// The step was administratively skipped; do nothing at all
    Skip,
}

/// Scheduler-owned state of the step, consumed only for progress text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HostState {
    Running,
    Suspended,
}

/// What the host should do after an invocation returns
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Every tracked task and group is done
    Done,
    /// Not done yet; resume the unit later, ideally after `resume_after`
    Suspend { resume_after: Duration },
    /// The invocation was a skip and nothing happened
    Skipped,
}

impl StepOutcome {
    pub fn is_suspend(&self) -> bool {
        matches!(self, Self::Suspend { .. })
    }
}

/// The side-effecting backend call that starts the remote work
#[async_trait]
pub trait ExternalOperation: Send + Sync {
    /// Name used in logs and invocation errors
    fn name(&self) -> &str;

    async fn invoke(&self) -> OrchestrationResult<TaskResponse>;
}

/// [`ExternalOperation`] backed by an async closure
pub struct FnOperation<F> {
    name: String,
    f: F,
}

impl<F, Fut> FnOperation<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = OrchestrationResult<TaskResponse>> + Send,
{
    pub fn new(name: impl Into<String>, f: F) -> Self {
        Self {
            name: name.into(),
            f,
        }
    }
}

#[async_trait]
impl<F, Fut> ExternalOperation for FnOperation<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = OrchestrationResult<TaskResponse>> + Send,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn invoke(&self) -> OrchestrationResult<TaskResponse> {
        (self.f)().await
    }
}
