use super::{RemoteTask, RemoteTracked};
use crate::client::RemoteTaskClient;
use crate::error::OrchestrationResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

/// A backend-defined cluster of tasks spawned while an operation runs
///
/// Starts as a stub holding only its href; name and membership arrive with
/// the first [`refresh`](RemoteTracked::refresh). A group with no resolved
/// members is never done, whatever the backend claims about it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteTaskGroup {
    href: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    name: Option<String>,

    #[serde(default)]
    member_hrefs: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    all_tasks_dispatched: Option<bool>,

    #[serde(default)]
    members: Vec<RemoteTask>,

    /// Whether the group lookup has succeeded at least once
    #[serde(default)]
    resolved: bool,
}

impl RemoteTaskGroup {
    /// Stub referencing only `href`
    pub fn new_from_href(href: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            name: None,
            member_hrefs: Vec::new(),
            all_tasks_dispatched: None,
            members: Vec::new(),
            resolved: false,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn member_hrefs(&self) -> &[String] {
        &self.member_hrefs
    }

    pub fn members(&self) -> &[RemoteTask] {
        &self.members
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved
    }

    fn member(&self, href: &str) -> Option<&RemoteTask> {
        self.members.iter().find(|m| m.href() == href)
    }
}

#[async_trait]
impl RemoteTracked for RemoteTaskGroup {
    fn href(&self) -> &str {
        &self.href
    }

    fn display_name(&self) -> Option<&str> {
        self.name()
    }

    fn is_started(&self) -> bool {
        self.members.iter().any(RemoteTask::is_started)
    }

    fn is_done(&self) -> bool {
        if !self.resolved || self.members.is_empty() {
            return false;
        }
        if self.all_tasks_dispatched == Some(false) {
            return false;
        }
        self.members.iter().all(RemoteTask::is_done)
            && self.member_hrefs.iter().all(|href| self.member(href).is_some())
    }

    fn error(&self) -> Option<String> {
        self.members.iter().find_map(RemoteTask::error)
    }

    async fn refresh(&mut self, client: &dyn RemoteTaskClient) -> OrchestrationResult<()> {
        if self.is_done() {
            trace!(href = %self.href, "Skipping refresh of finished task group");
            return Ok(());
        }

        let group = client.get_task_group(&self.href).await?;
        let reported = client.get_task_group_members(&self.href).await?;

        if group.name.is_some() {
            self.name = group.name;
        }
        self.member_hrefs = group.member_hrefs;
        self.all_tasks_dispatched = group.all_tasks_dispatched;

        let mut members = Vec::with_capacity(reported.len());
        for descriptor in reported {
            let member = match self.members.iter().find(|m| m.href() == descriptor.href) {
                Some(known) => {
                    let mut known = known.clone();
                    known.apply(descriptor);
                    known
                }
                None => RemoteTask::new(descriptor),
            };
            members.push(member);
        }
        self.members = members;
        self.resolved = true;

        debug!(
            href = %self.href,
            members = self.members.len(),
            done = self.is_done(),
            "Refreshed remote task group"
        );
        Ok(())
    }

    async fn cancel(&self, client: &dyn RemoteTaskClient) {
        for member in &self.members {
            member.cancel(client).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{InMemoryTaskClient, RemoteCall, TaskDescriptor, TaskGroupDescriptor};

    fn client_with_group(members: &[(&str, bool)]) -> InMemoryTaskClient {
        let client = InMemoryTaskClient::new();
        for (href, done) in members {
            client.script_task(*href, [TaskDescriptor::new(*href).with_done(*done)]);
        }
        client.script_task_group(
            "g1",
            [TaskGroupDescriptor::new("g1")
                .with_name("Repository sync")
                .with_members(members.iter().map(|(href, _)| *href))],
        );
        client
    }

    #[test]
    fn test_stub_is_never_done() {
        let group = RemoteTaskGroup::new_from_href("g1");
        assert!(!group.is_done());
        assert!(!group.is_resolved());
        assert_eq!(group.name(), None);
    }

    #[tokio::test]
    async fn test_refresh_resolves_members() {
        let client = client_with_group(&[("m1", true), ("m2", true)]);
        let mut group = RemoteTaskGroup::new_from_href("g1");

        group.refresh(&client).await.unwrap();

        assert!(group.is_resolved());
        assert_eq!(group.name(), Some("Repository sync"));
        assert_eq!(group.members().len(), 2);
        assert!(group.is_done());
    }

    #[tokio::test]
    async fn test_empty_group_is_not_done_even_if_state_claims_completion() {
        let client = InMemoryTaskClient::new();
        let mut claimed = TaskGroupDescriptor::new("g1");
        claimed.state = Some("completed".to_string());
        client.script_task_group("g1", [claimed]);

        let mut group = RemoteTaskGroup::new_from_href("g1");
        group.refresh(&client).await.unwrap();

        assert!(group.is_resolved());
        assert!(!group.is_done());
    }

    #[tokio::test]
    async fn test_undispatched_group_is_not_done() {
        let client = client_with_group(&[("m1", true)]);
        client.script_task_group(
            "g1",
            [TaskGroupDescriptor::new("g1")
                .with_members(["m1"])
                .with_all_tasks_dispatched(false)],
        );

        let mut group = RemoteTaskGroup::new_from_href("g1");
        group.refresh(&client).await.unwrap();
        assert!(!group.is_done());
    }

    #[tokio::test]
    async fn test_member_error_surfaces_on_group() {
        let client = InMemoryTaskClient::new();
        client.script_task(
            "m1",
            [TaskDescriptor::new("m1").with_state("failed").with_error("disk full")],
        );
        client.script_task_group("g1", [TaskGroupDescriptor::new("g1").with_members(["m1"])]);

        let mut group = RemoteTaskGroup::new_from_href("g1");
        group.refresh(&client).await.unwrap();

        assert_eq!(group.error().as_deref(), Some("disk full"));
    }

    #[tokio::test]
    async fn test_finished_group_is_not_requeried() {
        let client = client_with_group(&[("m1", true)]);
        let mut group = RemoteTaskGroup::new_from_href("g1");

        group.refresh(&client).await.unwrap();
        let calls_after_first = client.call_count();
        group.refresh(&client).await.unwrap();

        assert_eq!(client.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_cancel_reaches_every_member() {
        let client = client_with_group(&[("m1", false), ("m2", false)]);
        client.fail_cancel("m1", "boom");
        let mut group = RemoteTaskGroup::new_from_href("g1");
        group.refresh(&client).await.unwrap();

        group.cancel(&client).await;

        let cancels: Vec<_> = client
            .calls()
            .into_iter()
            .filter(|c| matches!(c, RemoteCall::CancelTask(_)))
            .collect();
        assert_eq!(
            cancels,
            vec![
                RemoteCall::CancelTask("m1".to_string()),
                RemoteCall::CancelTask("m2".to_string())
            ]
        );
    }
}
