//! Human-readable progress text for a unit waiting on remote work.

use super::host::HostState;
use crate::constants::status_messages;
use crate::models::{CombinedTaskView, TrackedTask};

/// Short display label: `<last name segment> (ID: <href fragment>)`
///
/// The name keeps only its last `.`-separated segment; the href keeps its last
/// `-`-separated segment minus its final character (the trailing `/` of a REST
/// href). Missing parts render as empty strings.
pub fn task_label(name: Option<&str>, href: Option<&str>) -> String {
    let name = name
        .and_then(|name| name.split('.').next_back())
        .unwrap_or_default();
    let id = href
        .and_then(|href| href.split('-').next_back())
        .map(|segment| {
            let mut segment = segment.to_string();
            segment.pop();
            segment
        })
        .unwrap_or_default();
    format!("{name} (ID: {id})")
}

fn label_for(task: TrackedTask<'_>) -> String {
    task_label(task.display_name(), Some(task.href()))
}

/// Describe what a unit is doing right now
///
/// `initiated` is false until the triggering operation has answered.
pub fn humanized_state(view: &CombinedTaskView<'_>, initiated: bool, host: HostState) -> String {
    if !initiated {
        return status_messages::INITIATING.to_string();
    }
    if view.is_empty() || view.all_done() {
        return status_messages::FINISHED.to_string();
    }
    if host == HostState::Running {
        return status_messages::CHECKING.to_string();
    }

    if let Some(running) = view.first_running() {
        format!("{}: {}", status_messages::WAITING_TO_FINISH, label_for(running))
    } else if let Some(pending) = view.first_pending() {
        format!("{}: {}", status_messages::WAITING_TO_START, label_for(pending))
    } else {
        status_messages::CHECKING.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::TaskDescriptor;
    use crate::models::{RemoteTask, RemoteTaskGroup};

    const SYNC_HREF: &str = "/pulp/api/v3/tasks/0191a3b2-4c5d-7e8f-9a0b-1c2d3e4f5a6b/";

    #[test]
    fn test_task_label_formatting() {
        assert_eq!(
            task_label(Some("pulp_rpm.app.tasks.synchronizing.synchronize"), Some(SYNC_HREF)),
            "synchronize (ID: 1c2d3e4f5a6b)"
        );
        assert_eq!(task_label(Some("Publish"), Some("/tasks/42/")), "Publish (ID: /tasks/42)");
        assert_eq!(task_label(None, Some("abc-def/")), " (ID: def)");
        assert_eq!(task_label(Some("a.b"), None), "b (ID: )");
        assert_eq!(task_label(None, None), " (ID: )");
    }

    #[test]
    fn test_initiating_before_first_answer() {
        let view = CombinedTaskView::new(&[], &[]);
        assert_eq!(
            humanized_state(&view, false, HostState::Running),
            status_messages::INITIATING
        );
    }

    #[test]
    fn test_waiting_for_running_task() {
        let tasks = vec![
            RemoteTask::new(
                TaskDescriptor::new("/tasks/1-aaa/")
                    .with_state("waiting")
                    .with_name("x.generate"),
            ),
            RemoteTask::new(
                TaskDescriptor::new(SYNC_HREF)
                    .with_state("running")
                    .with_name("pulp_rpm.app.tasks.synchronizing.synchronize"),
            ),
        ];
        let view = CombinedTaskView::new(&tasks, &[]);

        assert_eq!(
            humanized_state(&view, true, HostState::Suspended),
            "waiting for task to finish: synchronize (ID: 1c2d3e4f5a6b)"
        );
        assert_eq!(
            humanized_state(&view, true, HostState::Running),
            status_messages::CHECKING
        );
    }

    #[test]
    fn test_waiting_for_pending_task_uses_description() {
        let tasks = vec![RemoteTask::new(
            TaskDescriptor::new("/tasks/7-bbb/")
                .with_state("waiting")
                .with_description("Generating metadata"),
        )];
        let view = CombinedTaskView::new(&tasks, &[]);

        assert_eq!(
            humanized_state(&view, true, HostState::Suspended),
            "waiting for task to start: Generating metadata (ID: bbb)"
        );
    }

    #[test]
    fn test_unresolved_group_counts_as_pending() {
        let tasks = vec![RemoteTask::new(TaskDescriptor::new("t1").with_done(true))];
        let groups = vec![RemoteTaskGroup::new_from_href("/task-groups/9-ccc/")];
        let view = CombinedTaskView::new(&tasks, &groups);

        assert_eq!(
            humanized_state(&view, true, HostState::Suspended),
            "waiting for task to start:  (ID: ccc)"
        );
    }

    #[test]
    fn test_finished() {
        let tasks = vec![RemoteTask::new(TaskDescriptor::new("t1").with_done(true))];
        let view = CombinedTaskView::new(&tasks, &[]);
        assert_eq!(
            humanized_state(&view, true, HostState::Suspended),
            status_messages::FINISHED
        );
    }
}
