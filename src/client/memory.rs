//! In-memory remote task backend.
//!
//! [`InMemoryTaskClient`] replays scripted task and task-group states and
//! records every call it receives. Each lookup of an href advances that href's
//! script by one entry; the final entry repeats forever. It is used as the
//! backend double in tests and for local dry runs of operations.
//!
//! # Examples
//!
//! ```
//! use remote_task_core::client::{InMemoryTaskClient, TaskDescriptor};
//!
//! let client = InMemoryTaskClient::new();
//! client.script_task("t1", [
//!     TaskDescriptor::new("t1").with_state("running"),
//!     TaskDescriptor::new("t1").with_state("completed"),
//! ]);
//! assert_eq!(client.call_count(), 0);
//! ```

use std::collections::VecDeque;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::debug;
use uuid::Uuid;

use super::{RemoteTaskClient, TaskDescriptor, TaskGroupDescriptor};
use crate::constants::{operations, task_states};
use crate::error::{OrchestrationError, OrchestrationResult};

/// One call received by [`InMemoryTaskClient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    GetTask(String),
    GetTaskGroup(String),
    GetTaskGroupMembers(String),
    CancelTask(String),
}

impl RemoteCall {
    pub fn href(&self) -> &str {
        match self {
            Self::GetTask(href)
            | Self::GetTaskGroup(href)
            | Self::GetTaskGroupMembers(href)
            | Self::CancelTask(href) => href,
        }
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTaskClient {
    tasks: DashMap<String, VecDeque<TaskDescriptor>>,
    groups: DashMap<String, VecDeque<TaskGroupDescriptor>>,
    served_groups: DashMap<String, TaskGroupDescriptor>,
    transport_failures: DashMap<String, u32>,
    failing_cancels: DashMap<String, String>,
    calls: Mutex<Vec<RemoteCall>>,
    honor_cancellation: bool,
}

impl InMemoryTaskClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `cancel_task` immediately settle the task as `canceled`
    pub fn honoring_cancellation(mut self) -> Self {
        self.honor_cancellation = true;
        self
    }

    /// Generate a backend-style task href
    pub fn generate_task_href() -> String {
        format!("/pulp/api/v3/tasks/{}/", Uuid::new_v4())
    }

    /// Register a new waiting task and return its descriptor
    pub fn spawn_task(&self, name: impl Into<String>) -> TaskDescriptor {
        let descriptor = TaskDescriptor::new(Self::generate_task_href())
            .with_name(name)
            .with_state(task_states::WAITING);
        self.script_task(descriptor.href.clone(), [descriptor.clone()]);
        descriptor
    }

    /// Replace the states returned for `href`, in order
    pub fn script_task<I>(&self, href: impl Into<String>, states: I)
    where
        I: IntoIterator<Item = TaskDescriptor>,
    {
        self.tasks.insert(href.into(), states.into_iter().collect());
    }

    /// Replace the group states returned for `href`, in order
    pub fn script_task_group<I>(&self, href: impl Into<String>, states: I)
    where
        I: IntoIterator<Item = TaskGroupDescriptor>,
    {
        self.groups.insert(href.into(), states.into_iter().collect());
    }

    /// Fail the next `count` lookups of `href` with a transport error
    pub fn fail_lookups(&self, href: impl Into<String>, count: u32) {
        self.transport_failures.insert(href.into(), count);
    }

    /// Make every cancel request for `href` fail
    pub fn fail_cancel(&self, href: impl Into<String>, message: impl Into<String>) {
        self.failing_cancels.insert(href.into(), message.into());
    }

    /// Every call received so far, in order
    pub fn calls(&self) -> Vec<RemoteCall> {
        self.calls.lock().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls received for a single href
    pub fn calls_for(&self, href: &str) -> Vec<RemoteCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.href() == href)
            .cloned()
            .collect()
    }

    pub fn cancelled_hrefs(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                RemoteCall::CancelTask(href) => Some(href.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: RemoteCall) {
        self.calls.lock().push(call);
    }

    fn check_transport(&self, operation: &str, href: &str) -> OrchestrationResult<()> {
        if let Some(mut remaining) = self.transport_failures.get_mut(href) {
            if *remaining > 0 {
                *remaining -= 1;
                return Err(OrchestrationError::transport(
                    operation,
                    href,
                    "simulated backend outage",
                ));
            }
        }
        Ok(())
    }

    fn advance_task(&self, href: &str) -> OrchestrationResult<TaskDescriptor> {
        let mut script = self.tasks.get_mut(href).ok_or_else(|| {
            OrchestrationError::transport(operations::GET_TASK, href, "404 task not found")
        })?;
        next_state(script.value_mut()).ok_or_else(|| {
            OrchestrationError::transport(operations::GET_TASK, href, "task has no scripted state")
        })
    }

    fn advance_group(&self, href: &str) -> OrchestrationResult<TaskGroupDescriptor> {
        let mut script = self.groups.get_mut(href).ok_or_else(|| {
            OrchestrationError::transport(
                operations::GET_TASK_GROUP,
                href,
                "404 task group not found",
            )
        })?;
        let group = next_state(script.value_mut()).ok_or_else(|| {
            OrchestrationError::transport(
                operations::GET_TASK_GROUP,
                href,
                "task group has no scripted state",
            )
        })?;
        self.served_groups.insert(href.to_string(), group.clone());
        Ok(group)
    }

    /// Group state last served by `get_task_group`, else the first scripted one
    fn current_group(&self, href: &str) -> OrchestrationResult<TaskGroupDescriptor> {
        if let Some(served) = self.served_groups.get(href) {
            return Ok(served.value().clone());
        }
        self.groups
            .get(href)
            .and_then(|script| script.front().cloned())
            .ok_or_else(|| {
                OrchestrationError::transport(
                    operations::GET_TASK_GROUP_MEMBERS,
                    href,
                    "404 task group not found",
                )
            })
    }
}

/// Pop the front state unless it is the last one, which sticks
fn next_state<T: Clone>(script: &mut VecDeque<T>) -> Option<T> {
    if script.len() > 1 {
        script.pop_front()
    } else {
        script.front().cloned()
    }
}

#[async_trait]
impl RemoteTaskClient for InMemoryTaskClient {
    async fn get_task(&self, href: &str) -> OrchestrationResult<TaskDescriptor> {
        self.record(RemoteCall::GetTask(href.to_string()));
        self.check_transport(operations::GET_TASK, href)?;
        self.advance_task(href)
    }

    async fn get_task_group(&self, href: &str) -> OrchestrationResult<TaskGroupDescriptor> {
        self.record(RemoteCall::GetTaskGroup(href.to_string()));
        self.check_transport(operations::GET_TASK_GROUP, href)?;
        self.advance_group(href)
    }

    async fn get_task_group_members(&self, href: &str) -> OrchestrationResult<Vec<TaskDescriptor>> {
        self.record(RemoteCall::GetTaskGroupMembers(href.to_string()));
        let group = self.current_group(href)?;
        group
            .member_hrefs
            .iter()
            .map(|member| self.advance_task(member))
            .collect()
    }

    async fn cancel_task(&self, href: &str) -> OrchestrationResult<()> {
        self.record(RemoteCall::CancelTask(href.to_string()));
        if let Some(message) = self.failing_cancels.get(href) {
            return Err(OrchestrationError::transport(
                operations::CANCEL_TASK,
                href,
                message.value().clone(),
            ));
        }

        if self.honor_cancellation {
            if let Some(mut script) = self.tasks.get_mut(href) {
                let current = script.front().cloned().unwrap_or_else(|| TaskDescriptor::new(href));
                if !current.is_done() {
                    let cancelled = TaskDescriptor {
                        state: Some(task_states::CANCELED.to_string()),
                        done: Some(true),
                        ..current
                    };
                    *script = VecDeque::from([cancelled]);
                    debug!(href = %href, "Scripted task settled as canceled");
                }
            }
        }
        Ok(())
    }
}
