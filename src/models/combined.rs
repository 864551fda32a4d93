use super::{RemoteTask, RemoteTaskGroup, RemoteTracked};

/// One entry of a [`CombinedTaskView`]
#[derive(Debug, Clone, Copy)]
pub enum TrackedTask<'a> {
    Task(&'a RemoteTask),
    Group(&'a RemoteTaskGroup),
}

impl<'a> TrackedTask<'a> {
    fn tracked(&self) -> &'a dyn RemoteTracked {
        match *self {
            Self::Task(task) => task,
            Self::Group(group) => group,
        }
    }

    pub fn href(&self) -> &'a str {
        self.tracked().href()
    }

    pub fn display_name(&self) -> Option<&'a str> {
        self.tracked().display_name()
    }

    pub fn is_started(&self) -> bool {
        self.tracked().is_started()
    }

    pub fn is_done(&self) -> bool {
        self.tracked().is_done()
    }

    pub fn error(&self) -> Option<String> {
        self.tracked().error()
    }

    pub fn is_group(&self) -> bool {
        matches!(self, Self::Group(_))
    }
}

/// Read-only view over everything a unit tracks: tasks first, then groups,
/// each in discovery order
#[derive(Debug, Clone, Copy)]
pub struct CombinedTaskView<'a> {
    tasks: &'a [RemoteTask],
    groups: &'a [RemoteTaskGroup],
}

impl<'a> CombinedTaskView<'a> {
    pub fn new(tasks: &'a [RemoteTask], groups: &'a [RemoteTaskGroup]) -> Self {
        Self { tasks, groups }
    }

    pub fn iter(&self) -> impl Iterator<Item = TrackedTask<'a>> + 'a {
        let (tasks, groups) = (self.tasks, self.groups);
        tasks
            .iter()
            .map(TrackedTask::Task)
            .chain(groups.iter().map(TrackedTask::Group))
    }

    pub fn len(&self) -> usize {
        self.tasks.len() + self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Non-empty and every member done
    pub fn all_done(&self) -> bool {
        !self.is_empty() && self.iter().all(|t| t.is_done())
    }

    /// First member carrying an error, with its href and raw message
    pub fn first_error(&self) -> Option<(&'a str, String)> {
        self.iter()
            .find_map(|t| t.error().map(|message| (t.href(), message)))
    }

    /// First member the backend is working on but has not finished
    pub fn first_running(&self) -> Option<TrackedTask<'a>> {
        self.iter().find(|t| t.is_started() && !t.is_done())
    }

    /// First member the backend has not picked up yet
    pub fn first_pending(&self) -> Option<TrackedTask<'a>> {
        self.iter().find(|t| !t.is_started() && !t.is_done())
    }

    pub fn tracks_group(&self, href: &str) -> bool {
        self.groups.iter().any(|g| g.href() == href)
    }
}
