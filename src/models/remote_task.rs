use super::RemoteTracked;
use crate::client::{RemoteTaskClient, TaskDescriptor};
use crate::error::OrchestrationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

/// One asynchronous job running on the remote backend
///
/// Serializes as its plain [`TaskDescriptor`], so the persisted output record
/// holds exactly what the backend reported.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteTask {
    data: TaskDescriptor,
}

impl RemoteTask {
    pub fn new(data: TaskDescriptor) -> Self {
        Self { data }
    }

    pub fn descriptor(&self) -> &TaskDescriptor {
        &self.data
    }

    pub fn into_descriptor(self) -> TaskDescriptor {
        self.data
    }

    pub fn name(&self) -> Option<&str> {
        self.data.name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.data.description.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.data.state.as_deref()
    }

    /// Group this task belongs to, once the backend reveals it
    pub fn task_group_href(&self) -> Option<&str> {
        self.data.task_group_href.as_deref()
    }

    /// Replace the tracked state with a fresh backend report
    ///
    /// Keeps the known href and labels when the report omits them. Ignored
    /// once the task is done, so a finished task never changes again.
    pub(crate) fn apply(&mut self, mut fresh: TaskDescriptor) {
        if self.data.is_done() {
            return;
        }
        if fresh.href.is_empty() {
            fresh.href = std::mem::take(&mut self.data.href);
        }
        if fresh.name.is_none() {
            fresh.name = self.data.name.take();
        }
        if fresh.description.is_none() {
            fresh.description = self.data.description.take();
        }
        if fresh.task_group_href.is_none() {
            fresh.task_group_href = self.data.task_group_href.take();
        }
        self.data = fresh;
    }
}

impl From<TaskDescriptor> for RemoteTask {
    fn from(data: TaskDescriptor) -> Self {
        Self::new(data)
    }
}

#[async_trait]
impl RemoteTracked for RemoteTask {
    fn href(&self) -> &str {
        &self.data.href
    }

    fn display_name(&self) -> Option<&str> {
        self.name().or_else(|| self.description())
    }

    fn is_started(&self) -> bool {
        self.data.is_started()
    }

    fn is_done(&self) -> bool {
        self.data.is_done()
    }

    fn error(&self) -> Option<String> {
        self.data.error_message()
    }

    async fn refresh(&mut self, client: &dyn RemoteTaskClient) -> OrchestrationResult<()> {
        if self.is_done() {
            trace!(href = %self.href(), "Skipping refresh of finished task");
            return Ok(());
        }

        let fresh = client.get_task(self.href()).await?;
        self.apply(fresh);

        debug!(
            href = %self.href(),
            state = ?self.state(),
            done = self.is_done(),
            "Refreshed remote task"
        );
        Ok(())
    }

    async fn cancel(&self, client: &dyn RemoteTaskClient) {
        if let Err(e) = client.cancel_task(self.href()).await {
            warn!(href = %self.href(), error = %e, "Best-effort task cancellation failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::InMemoryTaskClient;

    #[tokio::test]
    async fn test_refresh_updates_state() {
        let client = InMemoryTaskClient::new();
        client.script_task(
            "t1",
            [TaskDescriptor::new("t1").with_state("running")],
        );

        let mut task = RemoteTask::new(TaskDescriptor::new("t1").with_name("a.b.sync"));
        task.refresh(&client).await.unwrap();

        assert_eq!(task.state(), Some("running"));
        assert!(task.is_started());
        assert!(!task.is_done());
        // Labels survive a report that omits them
        assert_eq!(task.display_name(), Some("a.b.sync"));
    }

    #[tokio::test]
    async fn test_finished_task_is_never_requeried() {
        let client = InMemoryTaskClient::new();
        client.script_task("t1", [TaskDescriptor::new("t1").with_state("failed")]);

        let finished = TaskDescriptor::new("t1")
            .with_state("completed")
            .with_done(true);
        let mut task = RemoteTask::new(finished.clone());
        task.refresh(&client).await.unwrap();
        task.refresh(&client).await.unwrap();

        assert_eq!(task.descriptor(), &finished);
        assert_eq!(client.call_count(), 0);
    }

    #[tokio::test]
    async fn test_cancel_swallows_backend_errors() {
        let client = InMemoryTaskClient::new();
        client.fail_cancel("t1", "409 already finished");

        let task = RemoteTask::new(TaskDescriptor::new("t1"));
        task.cancel(&client).await;

        assert_eq!(client.cancelled_hrefs(), vec!["t1".to_string()]);
    }

    #[test]
    fn test_display_name_falls_back_to_description() {
        let task = RemoteTask::new(TaskDescriptor::new("t1").with_description("Generate metadata"));
        assert_eq!(task.display_name(), Some("Generate metadata"));
    }

    #[test]
    fn test_serializes_as_plain_descriptor() {
        let task = RemoteTask::new(TaskDescriptor::new("t1").with_done(false));
        let value = serde_json::to_value(&task).unwrap();
        assert_eq!(value, serde_json::json!({"href": "t1", "done": false}));
    }
}
