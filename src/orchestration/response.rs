//! # Task Response Normalization
//!
//! Operations that start remote work answer with nothing, one task, or a list
//! of tasks. [`normalize`] reduces all three shapes to an ordered list of plain
//! [`TaskDescriptor`]s.

use crate::client::TaskDescriptor;
use crate::error::{OrchestrationError, OrchestrationResult};
use serde_json::Value;

/// Raw answer of an operation that starts remote work
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskResponse<T = TaskDescriptor> {
    Empty,
    Single(T),
    Many(Vec<T>),
}

impl<T> Default for TaskResponse<T> {
    fn default() -> Self {
        Self::Empty
    }
}

impl<T> From<Option<T>> for TaskResponse<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(task) => Self::Single(task),
            None => Self::Empty,
        }
    }
}

impl<T> From<Vec<T>> for TaskResponse<T> {
    fn from(tasks: Vec<T>) -> Self {
        Self::Many(tasks)
    }
}

impl TaskResponse<TaskDescriptor> {
    /// Interpret a JSON body: `null`, a task object, or an array of them
    pub fn from_json(value: Value) -> OrchestrationResult<Self> {
        match value {
            Value::Null => Ok(Self::Empty),
            Value::Array(items) => items
                .into_iter()
                .map(serde_json::from_value)
                .collect::<Result<Vec<TaskDescriptor>, _>>()
                .map(Self::Many)
                .map_err(Into::into),
            object @ Value::Object(_) => Ok(Self::Single(serde_json::from_value(object)?)),
            other => Err(OrchestrationError::serialization(format!(
                "expected null, a task object, or a list of tasks, got {other}"
            ))),
        }
    }
}

/// Convert any response shape into an ordered list of descriptors
///
/// Client-specific task types are stripped to [`TaskDescriptor`] through
/// their `Into` conversion.
pub fn normalize<T: Into<TaskDescriptor>>(response: TaskResponse<T>) -> Vec<TaskDescriptor> {
    match response {
        TaskResponse::Empty => Vec::new(),
        TaskResponse::Single(task) => vec![task.into()],
        TaskResponse::Many(tasks) => tasks.into_iter().map(Into::into).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct ClientTask {
        pulp_href: String,
        state: &'static str,
    }

    impl From<ClientTask> for TaskDescriptor {
        fn from(task: ClientTask) -> Self {
            TaskDescriptor::new(task.pulp_href).with_state(task.state)
        }
    }

    #[test]
    fn test_three_shapes() {
        assert!(normalize::<TaskDescriptor>(TaskResponse::Empty).is_empty());
        assert_eq!(normalize(TaskResponse::Single(TaskDescriptor::new("t1"))).len(), 1);

        let many = normalize(TaskResponse::Many(vec![
            TaskDescriptor::new("t1"),
            TaskDescriptor::new("t2"),
        ]));
        let hrefs: Vec<_> = many.iter().map(|t| t.href.as_str()).collect();
        assert_eq!(hrefs, vec!["t1", "t2"]);
    }

    #[test]
    fn test_strips_client_wrapper_types() {
        let normalized = normalize(TaskResponse::Single(ClientTask {
            pulp_href: "/tasks/9/".to_string(),
            state: "running",
        }));
        assert_eq!(normalized, vec![TaskDescriptor::new("/tasks/9/").with_state("running")]);
    }

    #[test]
    fn test_option_and_vec_conversions() {
        let none: TaskResponse = None.into();
        assert_eq!(none, TaskResponse::Empty);
        let some: TaskResponse = Some(TaskDescriptor::new("t1")).into();
        assert_eq!(normalize(some).len(), 1);
    }

    #[test]
    fn test_from_json() {
        assert_eq!(TaskResponse::from_json(Value::Null).unwrap(), TaskResponse::Empty);

        let single = TaskResponse::from_json(json!({"task": "ignored", "href": "t1"})).unwrap();
        assert_eq!(normalize(single).len(), 1);

        let many = TaskResponse::from_json(json!([{"href": "t1"}, {"pulp_href": "t2"}])).unwrap();
        assert_eq!(normalize(many)[1].href, "t2");

        assert!(TaskResponse::from_json(json!("t1")).is_err());
    }
}
