//! Builders for backend scripts and orchestration units used across integration tests

use remote_task_core::client::{InMemoryTaskClient, TaskDescriptor, TaskGroupDescriptor};
use remote_task_core::orchestration::{
    AsyncOrchestrationUnit, ExternalOperation, FnOperation, TaskResponse,
};
use remote_task_core::{OrchestrationError, OrchestrationResult};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

pub const SYNC_TASK_HREF: &str = "/pulp/api/v3/tasks/0191a3b2-4c5d-7e8f-9a0b-1c2d3e4f5a6b/";
pub const SYNC_TASK_NAME: &str = "pulp_rpm.app.tasks.synchronizing.synchronize";
pub const GROUP_HREF: &str = "/pulp/api/v3/task-groups/0191a3b2-0000-7e8f-9a0b-00000000aaaa/";

pub fn waiting(href: &str) -> TaskDescriptor {
    TaskDescriptor::new(href).with_state("waiting")
}

pub fn running(href: &str) -> TaskDescriptor {
    TaskDescriptor::new(href).with_state("running")
}

pub fn completed(href: &str) -> TaskDescriptor {
    TaskDescriptor::new(href).with_state("completed")
}

pub fn failed(href: &str, message: &str) -> TaskDescriptor {
    TaskDescriptor::new(href)
        .with_state("failed")
        .with_error(message)
}

pub fn group(href: &str, members: &[&str]) -> TaskGroupDescriptor {
    TaskGroupDescriptor::new(href)
        .with_name("Import content")
        .with_members(members.iter().copied())
        .with_all_tasks_dispatched(true)
}

/// Operation answering the same response on every invocation, counting calls
pub struct CountingOperation {
    response: TaskResponse,
    invocations: AtomicUsize,
}

impl CountingOperation {
    pub fn new(response: TaskResponse) -> Arc<Self> {
        Arc::new(Self {
            response,
            invocations: AtomicUsize::new(0),
        })
    }

    pub fn invocations(&self) -> usize {
        self.invocations.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ExternalOperation for CountingOperation {
    fn name(&self) -> &str {
        "repository_sync"
    }

    async fn invoke(&self) -> OrchestrationResult<TaskResponse> {
        self.invocations.fetch_add(1, Ordering::SeqCst);
        Ok(self.response.clone())
    }
}

pub fn failing_operation(message: &'static str) -> Arc<dyn ExternalOperation> {
    Arc::new(FnOperation::new("repository_sync", move || async move {
        Err::<TaskResponse, _>(OrchestrationError::invocation("repository_sync", message))
    }))
}

/// Client plus a unit that initiates with a single waiting task at `href`
pub fn single_task_unit(
    client: &Arc<InMemoryTaskClient>,
    href: &str,
) -> (AsyncOrchestrationUnit, Arc<CountingOperation>) {
    let operation = CountingOperation::new(TaskResponse::Single(
        waiting(href).with_name(SYNC_TASK_NAME),
    ));
    let unit = AsyncOrchestrationUnit::new(client.clone(), operation.clone());
    (unit, operation)
}
