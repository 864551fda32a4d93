//! Persisted form of an orchestration unit.

use super::polling::PollAttempts;
use crate::error::OrchestrationResult;
use crate::models::{RemoteTask, RemoteTaskGroup};
use crate::state_machine::UnitState;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only part of a unit that survives a suspension
///
/// The host engine stores it as an opaque JSON record. `tasks` stays `None`
/// until the triggering operation has answered; afterwards it is always a
/// list, possibly empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputState {
    #[serde(default)]
    pub tasks: Option<Vec<RemoteTask>>,

    #[serde(default)]
    pub task_groups: Option<Vec<RemoteTaskGroup>>,

    #[serde(default)]
    pub poll_attempts: PollAttempts,

    #[serde(default)]
    pub cancel_requested: bool,

    #[serde(default)]
    pub state: UnitState,
}

impl OutputState {
    pub fn to_value(&self) -> OrchestrationResult<Value> {
        Ok(serde_json::to_value(self)?)
    }

    pub fn from_value(value: Value) -> OrchestrationResult<Self> {
        Ok(serde_json::from_value(value)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_output_has_no_tasks() {
        let value = OutputState::default().to_value().unwrap();
        assert_eq!(value["tasks"], Value::Null);
        assert_eq!(value["state"], json!("not_started"));
    }

    #[test]
    fn test_hydrates_raw_backend_record() {
        let output = OutputState::from_value(json!({
            "tasks": [{"href": "t1", "state": "running", "task_group_href": "g1"}],
            "task_groups": [{"href": "g1"}],
            "state": "suspended"
        }))
        .unwrap();

        let tasks = output.tasks.unwrap();
        assert_eq!(tasks[0].task_group_href(), Some("g1"));
        assert_eq!(output.task_groups.unwrap().len(), 1);
        assert_eq!(output.state, UnitState::Suspended);
        assert_eq!(output.poll_attempts, PollAttempts::default());
    }
}
