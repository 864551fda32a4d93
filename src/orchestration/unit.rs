//! # Asynchronous Orchestration Unit
//!
//! A suspendable, cancellable unit of work that waits for remote backend tasks
//! on behalf of a host workflow engine.
//!
//! ## Lifecycle
//!
//! ```text
//! NotStarted ──run──▶ Running ──▶ (Suspended ⇄ Running)* ──▶ Completed | Failed | Cancelled
//! ```
//!
//! The first [`run`](AsyncOrchestrationUnit::run) invokes the external
//! operation and tracks the tasks it returns. Every later `run` is one poll
//! cycle: refresh tasks, then groups; track task groups revealed since the
//! last cycle; raise the first remote error found. Whenever the combined view
//! is not yet done the unit returns [`StepOutcome::Suspend`], the only point
//! where control goes back to the scheduler.
//!
//! Between invocations the unit lives on only as its [`OutputState`]; call
//! [`AsyncOrchestrationUnit::resume`] to hydrate it again.

use super::error_translation::ErrorTranslator;
use super::host::{ExternalOperation, HostState, RunEvent, StepOutcome};
use super::output::OutputState;
use super::polling::{PollAttempts, PollSchedule};
use super::progress;
use super::response::normalize;
use crate::client::RemoteTaskClient;
use crate::config::OrchestratorConfig;
use crate::error::{OrchestrationError, OrchestrationResult};
use crate::logging::{log_error, log_unit_operation};
use crate::models::{CombinedTaskView, RemoteTask, RemoteTaskGroup, RemoteTracked};
use crate::state_machine::{UnitEvent, UnitState, UnitStateMachine};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Result of one poll cycle that did not raise
enum PollProgress {
    Polled,
    /// A transport failure was absorbed; try again on the next resume
    Retry,
}

pub struct AsyncOrchestrationUnit {
    client: Arc<dyn RemoteTaskClient>,
    operation: Arc<dyn ExternalOperation>,
    translator: Arc<ErrorTranslator>,
    schedule: PollSchedule,
    max_failed_polls: u32,
    tasks: Option<Vec<RemoteTask>>,
    groups: Vec<RemoteTaskGroup>,
    attempts: PollAttempts,
    cancel_requested: bool,
    lifecycle: UnitStateMachine,
}

impl std::fmt::Debug for AsyncOrchestrationUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncOrchestrationUnit")
            .field("operation", &self.operation.name())
            .field("state", &self.lifecycle.current_state())
            .field("tasks", &self.tasks)
            .field("groups", &self.groups)
            .field("attempts", &self.attempts)
            .field("cancel_requested", &self.cancel_requested)
            .finish()
    }
}

impl AsyncOrchestrationUnit {
    /// Fresh unit that has not invoked its operation yet
    pub fn new(client: Arc<dyn RemoteTaskClient>, operation: Arc<dyn ExternalOperation>) -> Self {
        let defaults = OrchestratorConfig::default();
        Self {
            client,
            operation,
            translator: Arc::new(ErrorTranslator::default()),
            schedule: PollSchedule::from_config(&defaults.polling),
            max_failed_polls: defaults.polling.max_failed_polls,
            tasks: None,
            groups: Vec::new(),
            attempts: PollAttempts::default(),
            cancel_requested: false,
            lifecycle: UnitStateMachine::new(),
        }
    }

    /// Rebuild a unit from the output record persisted at its last suspension
    pub fn resume(
        client: Arc<dyn RemoteTaskClient>,
        operation: Arc<dyn ExternalOperation>,
        output: OutputState,
    ) -> Self {
        // Records written without a lifecycle state still carry initiated tasks
        let state = match output.state {
            UnitState::NotStarted if output.tasks.is_some() => UnitState::Suspended,
            state => state,
        };

        let mut unit = Self::new(client, operation);
        unit.lifecycle = UnitStateMachine::from_state(state);
        unit.tasks = output.tasks;
        unit.groups = output.task_groups.unwrap_or_default();
        unit.attempts = output.poll_attempts;
        unit.cancel_requested = output.cancel_requested;
        unit
    }

    /// [`resume`](Self::resume) from the raw JSON record
    pub fn resume_from_value(
        client: Arc<dyn RemoteTaskClient>,
        operation: Arc<dyn ExternalOperation>,
        output: Value,
    ) -> OrchestrationResult<Self> {
        Ok(Self::resume(client, operation, OutputState::from_value(output)?))
    }

    /// Apply polling settings and append configured error rewrites
    pub fn with_config(mut self, config: &OrchestratorConfig) -> Self {
        self.schedule = PollSchedule::from_config(&config.polling);
        self.max_failed_polls = config.polling.max_failed_polls;
        let mut translator = (*self.translator).clone();
        translator.extend(config.error_rewrites.iter().cloned());
        self.translator = Arc::new(translator);
        self
    }

    pub fn with_translator(mut self, translator: Arc<ErrorTranslator>) -> Self {
        self.translator = translator;
        self
    }

    /// Serializable record to persist before handing control back
    pub fn output(&self) -> OutputState {
        OutputState {
            tasks: self.tasks.clone(),
            task_groups: self.tasks.as_ref().map(|_| self.groups.clone()),
            poll_attempts: self.attempts,
            cancel_requested: self.cancel_requested,
            state: self.lifecycle.current_state(),
        }
    }

    pub fn state(&self) -> UnitState {
        self.lifecycle.current_state()
    }

    /// Whether the triggering operation has answered
    pub fn is_initiated(&self) -> bool {
        self.tasks.is_some()
    }

    pub fn cancel_requested(&self) -> bool {
        self.cancel_requested
    }

    pub fn poll_attempts(&self) -> PollAttempts {
        self.attempts
    }

    pub fn combined(&self) -> CombinedTaskView<'_> {
        CombinedTaskView::new(self.tasks.as_deref().unwrap_or_default(), &self.groups)
    }

    /// True once initiated and every tracked member is done
    ///
    /// An operation that produced nothing to track is done right after
    /// initiation; a unit that has not initiated is never done.
    pub fn is_done(&self) -> bool {
        if !self.is_initiated() {
            return false;
        }
        let view = self.combined();
        view.is_empty() || view.all_done()
    }

    pub fn humanized_state(&self, host: HostState) -> String {
        progress::humanized_state(&self.combined(), self.is_initiated(), host)
    }

    /// Entry point for the host scheduler on plan and on every resume
    #[instrument(skip_all, fields(operation = %self.operation.name(), event = ?event))]
    pub async fn run(&mut self, event: RunEvent) -> OrchestrationResult<StepOutcome> {
        if event == RunEvent::Skip {
            debug!("Step skipped, leaving unit untouched");
            return Ok(StepOutcome::Skipped);
        }

        let state = self.lifecycle.current_state();
        if state.is_terminal() {
            return Err(OrchestrationError::invalid_transition(
                state.to_string(),
                "execute",
            ));
        }

        if self.is_initiated() {
            if let PollProgress::Retry = self.poll_external_tasks().await? {
                return self.suspend();
            }
        } else {
            self.initiate().await?;
        }

        self.settle()
    }

    /// Request best-effort cancellation of everything tracked
    ///
    /// Runs one poll cycle right away; if the backend has not settled every
    /// task yet, the unit suspends and normal polling confirms the effect.
    #[instrument(skip_all, fields(operation = %self.operation.name()))]
    pub async fn cancel(&mut self) -> OrchestrationResult<StepOutcome> {
        let state = self.lifecycle.current_state();
        if state.is_terminal() {
            debug!(state = %state, "Cancel requested for finished unit");
            return Ok(StepOutcome::Done);
        }

        self.cancel_requested = true;

        if !self.is_initiated() {
            self.lifecycle.transition(UnitEvent::Cancel)?;
            info!("Unit cancelled before its operation was invoked");
            return Ok(StepOutcome::Done);
        }

        let client = Arc::clone(&self.client);
        for task in self.tasks.iter().flatten() {
            task.cancel(client.as_ref()).await;
        }
        for group in &self.groups {
            group.cancel(client.as_ref()).await;
        }

        log_unit_operation(
            "cancel",
            &self.lifecycle.current_state().to_string(),
            self.tasks.as_ref().map_or(0, Vec::len),
            self.groups.len(),
            Some("cancellation requested for every tracked task and group"),
        );

        match self.poll_external_tasks().await? {
            PollProgress::Retry => self.suspend(),
            PollProgress::Polled => self.settle(),
        }
    }

    async fn initiate(&mut self) -> OrchestrationResult<()> {
        if self.lifecycle.current_state() == UnitState::NotStarted {
            self.lifecycle.transition(UnitEvent::Start)?;
        }

        let response = match self.operation.invoke().await {
            Ok(response) => response,
            Err(e) => return Err(self.fail(e)),
        };

        let tasks: Vec<RemoteTask> = normalize(response).into_iter().map(RemoteTask::new).collect();
        log_unit_operation(
            "initiate",
            &self.lifecycle.current_state().to_string(),
            tasks.len(),
            0,
            None,
        );
        self.tasks = Some(tasks);

        self.add_task_groups();
        self.check_for_errors()
    }

    async fn poll_external_tasks(&mut self) -> OrchestrationResult<PollProgress> {
        if self.lifecycle.current_state() == UnitState::Suspended {
            self.lifecycle.transition(UnitEvent::Resume)?;
        }
        self.attempts.total = self.attempts.total.saturating_add(1);

        if let Err(e) = self.refresh_all().await {
            if !e.is_retryable() {
                return Err(self.fail(e));
            }

            self.attempts.failed = self.attempts.failed.saturating_add(1);
            if self.attempts.failed <= self.max_failed_polls {
                warn!(
                    error = %e,
                    failed_polls = self.attempts.failed,
                    max_failed_polls = self.max_failed_polls,
                    "Poll cycle failed, retrying on next resume"
                );
                return Ok(PollProgress::Retry);
            }

            // Surfaced to the host, but the unit stays resumable
            self.lifecycle.transition(UnitEvent::Suspend)?;
            log_error(
                "orchestration_unit",
                self.operation.name(),
                &e.to_string(),
                Some(&self.lifecycle.current_state().to_string()),
            );
            return Err(e);
        }
        self.attempts.failed = 0;

        let added = self.add_task_groups();
        debug!(
            poll = self.attempts.total,
            tasks = self.tasks.as_ref().map_or(0, Vec::len),
            groups = self.groups.len(),
            new_groups = added,
            "Poll cycle finished"
        );

        self.check_for_errors()?;
        Ok(PollProgress::Polled)
    }

    /// Refresh every task, then every group
    async fn refresh_all(&mut self) -> OrchestrationResult<()> {
        let client = Arc::clone(&self.client);
        if let Some(tasks) = self.tasks.as_mut() {
            for task in tasks.iter_mut() {
                task.refresh(client.as_ref()).await?;
            }
        }
        for group in self.groups.iter_mut() {
            group.refresh(client.as_ref()).await?;
        }
        Ok(())
    }

    /// Track groups revealed by tasks since the last scan; returns how many
    ///
    /// A task may only reveal its group after its own first refresh, so this
    /// runs every cycle.
    fn add_task_groups(&mut self) -> usize {
        let Some(tasks) = self.tasks.as_ref() else {
            return 0;
        };

        let mut added = 0;
        for href in tasks.iter().filter_map(RemoteTask::task_group_href) {
            if self.groups.iter().any(|group| group.href() == href) {
                continue;
            }
            debug!(href = %href, "Tracking newly revealed task group");
            self.groups.push(RemoteTaskGroup::new_from_href(href));
            added += 1;
        }
        added
    }

    fn check_for_errors(&mut self) -> OrchestrationResult<()> {
        let Some((href, message)) = self
            .combined()
            .first_error()
            .map(|(href, message)| (href.to_string(), message))
        else {
            return Ok(());
        };

        let translated = self.translator.translate(&message);
        Err(self.fail(OrchestrationError::remote_operation(href, translated)))
    }

    fn settle(&mut self) -> OrchestrationResult<StepOutcome> {
        if !self.is_done() {
            return self.suspend();
        }

        let event = if self.cancel_requested {
            UnitEvent::Cancel
        } else {
            UnitEvent::Complete
        };
        let state = self.lifecycle.transition(event)?;
        log_unit_operation(
            "finish",
            &state.to_string(),
            self.tasks.as_ref().map_or(0, Vec::len),
            self.groups.len(),
            None,
        );
        Ok(StepOutcome::Done)
    }

    fn suspend(&mut self) -> OrchestrationResult<StepOutcome> {
        self.lifecycle.transition(UnitEvent::Suspend)?;
        let resume_after = self.schedule.delay_for(self.attempts.total);
        debug!(
            resume_after_ms = resume_after.as_millis() as u64,
            status = %self.humanized_state(HostState::Suspended),
            "Suspending until next poll"
        );
        Ok(StepOutcome::Suspend { resume_after })
    }

    /// Move to `Failed` and hand the error back for propagation
    fn fail(&mut self, error: OrchestrationError) -> OrchestrationError {
        let message = error.to_string();
        if let Err(e) = self.lifecycle.transition(UnitEvent::fail_with_error(&message)) {
            warn!(error = %e, "Could not record unit failure");
        }
        log_error(
            "orchestration_unit",
            self.operation.name(),
            &message,
            Some(&self.lifecycle.current_state().to_string()),
        );
        error
    }
}
