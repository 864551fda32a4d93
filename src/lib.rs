#![allow(clippy::doc_markdown)] // Allow technical terms like REST, JSON in docs
#![allow(clippy::missing_errors_doc)] // Allow public functions without # Errors sections
#![allow(clippy::must_use_candidate)] // Allow methods without must_use when context is clear

//! # Remote Task Core
//!
//! Resumable orchestration of long-running remote content operations.
//!
//! ## Overview
//!
//! Content operations such as repository sync, metadata generation, content
//! upload, and content-view publish run as asynchronous tasks on an external
//! content backend. A host workflow engine schedules the local side of each
//! operation as an [`AsyncOrchestrationUnit`]: a pollable, cancellable,
//! resumable unit of work that
//!
//! - invokes the operation and tracks the remote tasks it returns,
//! - suspends until the host resumes it, then refreshes every tracked task,
//! - discovers task groups the backend spawns mid-flight,
//! - translates remote error payloads into actionable messages,
//! - supports best-effort cancellation confirmed by later polling.
//!
//! The host owns timers and durability. The unit only reads and writes a plain
//! [`OutputState`] record that the host persists between invocations.
//!
//! ## Module Organization
//!
//! - [`client`] - remote task API contract and an in-memory backend
//! - [`models`] - tracked tasks, task groups, and the combined view
//! - [`orchestration`] - the unit and its collaborators
//! - [`state_machine`] - explicit unit lifecycle
//! - [`config`] - layered configuration
//! - [`error`] - structured error handling
//! - [`logging`] - structured logging setup
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use remote_task_core::client::{InMemoryTaskClient, TaskDescriptor};
//! use remote_task_core::orchestration::{
//!     AsyncOrchestrationUnit, FnOperation, RunEvent, StepOutcome, TaskResponse,
//! };
//! use remote_task_core::OrchestrationError;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), OrchestrationError> {
//! let client = Arc::new(InMemoryTaskClient::new());
//! client.script_task("t1", [TaskDescriptor::new("t1").with_state("completed")]);
//!
//! let operation = Arc::new(FnOperation::new("sync", || async {
//!     Ok::<_, OrchestrationError>(TaskResponse::Single(
//!         TaskDescriptor::new("t1").with_state("waiting"),
//!     ))
//! }));
//!
//! let mut unit = AsyncOrchestrationUnit::new(client.clone(), operation.clone());
//! assert!(unit.run(RunEvent::Execute).await?.is_suspend());
//!
//! // The host persists the output, waits, then resumes the unit
//! let output = unit.output();
//! let mut unit = AsyncOrchestrationUnit::resume(client, operation, output);
//! assert_eq!(unit.run(RunEvent::Execute).await?, StepOutcome::Done);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod constants;
pub mod error;
pub mod logging;
pub mod models;
pub mod orchestration;
pub mod state_machine;

pub use client::{RemoteTaskClient, TaskDescriptor, TaskErrorPayload, TaskGroupDescriptor};
pub use crate::config::{ConfigManager, OrchestratorConfig, PollingConfig};
pub use error::{OrchestrationError, OrchestrationResult};
pub use models::{CombinedTaskView, RemoteTask, RemoteTaskGroup, RemoteTracked, TrackedTask};
pub use orchestration::{
    AsyncOrchestrationUnit, ErrorTranslator, ExternalOperation, HostState, OutputState, RunEvent,
    StepOutcome, TaskResponse,
};
pub use state_machine::{UnitEvent, UnitState, UnitStateMachine};
