use super::{events::UnitEvent, states::UnitState};
use crate::error::{OrchestrationError, OrchestrationResult};
use tracing::debug;

/// In-memory lifecycle tracker for one orchestration unit
///
/// The host engine persists the current state inside the unit's output
/// record; this type only validates transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitStateMachine {
    state: UnitState,
    last_error: Option<String>,
}

impl UnitStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume tracking from a persisted state
    pub fn from_state(state: UnitState) -> Self {
        Self {
            state,
            last_error: None,
        }
    }

    pub fn current_state(&self) -> UnitState {
        self.state
    }

    /// Message of the failure that moved the unit to `Failed`
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply `event`, returning the new state
    pub fn transition(&mut self, event: UnitEvent) -> OrchestrationResult<UnitState> {
        let from = self.state;
        let target = Self::determine_target_state(from, &event)?;

        if let Some(message) = event.error_message() {
            self.last_error = Some(message.to_string());
        }
        self.state = target;

        debug!(
            from = %from,
            to = %target,
            event = event.event_type(),
            "Orchestration unit transition"
        );
        Ok(target)
    }

    /// Determine the target state based on current state and event
    pub fn determine_target_state(
        current_state: UnitState,
        event: &UnitEvent,
    ) -> OrchestrationResult<UnitState> {
        let target = match (current_state, event) {
            (UnitState::NotStarted, UnitEvent::Start) => UnitState::Running,

            (UnitState::Running, UnitEvent::Suspend) => UnitState::Suspended,
            (UnitState::Suspended, UnitEvent::Resume) => UnitState::Running,

            (UnitState::Running, UnitEvent::Complete) => UnitState::Completed,

            // Nothing was initiated, so nothing remote needs confirming
            (UnitState::NotStarted, UnitEvent::Cancel) => UnitState::Cancelled,
            (UnitState::Running, UnitEvent::Cancel) => UnitState::Cancelled,

            (
                UnitState::NotStarted | UnitState::Running | UnitState::Suspended,
                UnitEvent::Fail(_),
            ) => UnitState::Failed,

            (from_state, _) => {
                return Err(OrchestrationError::invalid_transition(
                    from_state.to_string(),
                    event.event_type(),
                ))
            }
        };

        Ok(target)
    }
}
