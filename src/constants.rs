//! # System Constants
//!
//! Remote backend task states and the progress vocabulary shown to operators.

/// Raw task states reported by the remote content backend
pub mod task_states {
    pub const WAITING: &str = "waiting";
    pub const SKIPPED: &str = "skipped";
    pub const RUNNING: &str = "running";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
    pub const CANCELED: &str = "canceled";
    pub const CANCELING: &str = "canceling";

    /// States after which a task never changes again
    pub const FINISHED: [&str; 4] = [COMPLETED, FAILED, CANCELED, SKIPPED];

    pub fn is_finished(state: &str) -> bool {
        FINISHED.contains(&state)
    }
}

/// Human-readable progress strings
pub mod status_messages {
    pub const INITIATING: &str = "initiating remote task";
    pub const CHECKING: &str = "checking remote task status";
    pub const WAITING_TO_FINISH: &str = "waiting for task to finish";
    pub const WAITING_TO_START: &str = "waiting for task to start";
    pub const FINISHED: &str = "remote tasks finished";
}

/// Fallback message for a failed task whose payload carries no description
pub const GENERIC_TASK_FAILURE: &str = "Remote task failed";

/// Operation names used in transport errors and structured logs
pub mod operations {
    pub const GET_TASK: &str = "get_task";
    pub const GET_TASK_GROUP: &str = "get_task_group";
    pub const GET_TASK_GROUP_MEMBERS: &str = "get_task_group_members";
    pub const CANCEL_TASK: &str = "cancel_task";
}
