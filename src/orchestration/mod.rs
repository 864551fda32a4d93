//! # Remote Task Orchestration
//!
//! The suspend/poll/resume engine that waits on remote backend tasks for a
//! host workflow engine, plus its collaborators:
//!
//! - [`response`] - reduces operation answers to task descriptors
//! - [`error_translation`] - rewrites known backend errors into guidance
//! - [`progress`] - human-readable status text and task labels
//! - [`polling`] - resume-delay hints and poll counters
//! - [`host`] - boundary types shared with the hosting scheduler
//! - [`output`] - the persisted record of a suspended unit
//! - [`unit`] - [`AsyncOrchestrationUnit`] itself

pub mod error_translation;
pub mod host;
pub mod output;
pub mod polling;
pub mod progress;
pub mod response;
pub mod unit;

pub use error_translation::{
    ErrorRewrite, ErrorTranslator, MIRROR_INCOMPATIBLE_GUIDANCE, MIRROR_INCOMPATIBLE_MESSAGE,
};
pub use host::{ExternalOperation, FnOperation, HostState, RunEvent, StepOutcome};
pub use output::OutputState;
pub use polling::{PollAttempts, PollSchedule};
pub use progress::{humanized_state, task_label};
pub use response::{normalize, TaskResponse};
pub use unit::AsyncOrchestrationUnit;
