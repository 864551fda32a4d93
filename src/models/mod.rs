//! # Tracked Remote Work
//!
//! Strongly-typed forms of the remote tasks and task groups an orchestration
//! unit is waiting on, and the combined view used to aggregate them.

pub mod combined;
pub mod remote_task;
pub mod remote_task_group;

use crate::client::RemoteTaskClient;
use crate::error::OrchestrationResult;
use async_trait::async_trait;

pub use combined::{CombinedTaskView, TrackedTask};
pub use remote_task::RemoteTask;
pub use remote_task_group::RemoteTaskGroup;

/// Capabilities shared by everything an orchestration unit tracks
#[async_trait]
pub trait RemoteTracked: Send + Sync {
    /// Opaque backend reference, stable for the object's lifetime
    fn href(&self) -> &str;

    /// Name, or description when no name is known
    fn display_name(&self) -> Option<&str>;

    fn is_started(&self) -> bool;

    fn is_done(&self) -> bool;

    /// Untranslated error message, if the backend reported one
    fn error(&self) -> Option<String>;

    /// Re-query the backend; a no-op once done
    async fn refresh(&mut self, client: &dyn RemoteTaskClient) -> OrchestrationResult<()>;

    /// Request cancellation; failures are logged, never returned
    async fn cancel(&self, client: &dyn RemoteTaskClient);
}
