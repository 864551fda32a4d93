//! Proptest strategies for backend task data

use proptest::prelude::*;
use remote_task_core::client::TaskDescriptor;

pub fn task_href_strategy() -> impl Strategy<Value = String> {
    "[0-9a-f]{8}-[0-9a-f]{4}-[0-9a-f]{12}".prop_map(|id| format!("/pulp/api/v3/tasks/{id}/"))
}

pub fn task_name_strategy() -> impl Strategy<Value = String> {
    prop::collection::vec("[a-z_]{1,12}", 1..5).prop_map(|segments| segments.join("."))
}

pub fn task_state_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("waiting"),
        Just("running"),
        Just("completed"),
        Just("canceled"),
        Just("skipped"),
    ]
}

pub fn descriptor_strategy() -> impl Strategy<Value = TaskDescriptor> {
    (task_href_strategy(), task_name_strategy(), task_state_strategy()).prop_map(
        |(href, name, state)| TaskDescriptor::new(href).with_name(name).with_state(state),
    )
}
