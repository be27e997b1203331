//! Session state types and their on-disk representation.
//!
//! On-disk format (field names are part of the file contract):
//!
//! ```json
//! {
//!   "current": "5f1c...",
//!   "status": "work",
//!   "time": 1704067200,
//!   "tasks": { "5f1c...": "Write spec", "5f2d...": "Review PR" }
//! }
//! ```
//!
//! `status` and `time` are modelled together as a single [`Slot`], so the
//! in-memory state can never hold one without the other.

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Kind of timed interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlotKind {
    Work,
    Break,
}

impl SlotKind {
    pub fn other(self) -> SlotKind {
        match self {
            SlotKind::Work => SlotKind::Break,
            SlotKind::Break => SlotKind::Work,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SlotKind::Work => "work",
            SlotKind::Break => "break",
        }
    }
}

impl fmt::Display for SlotKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A running work or break interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slot {
    pub kind: SlotKind,
    /// Wall-clock start, epoch seconds.
    pub started_at: i64,
}

/// One entry of the task snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub id: String,
    pub title: String,
}

/// Snapshot of open tasks in provider order.
///
/// Serialized as a JSON object (id → title). Order is preserved in both
/// directions so menus list tasks the way the provider does.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskList {
    tasks: Vec<Task>,
}

impl TaskList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a task. A repeated id keeps its original position and takes
    /// the new title.
    pub fn insert(&mut self, id: impl Into<String>, title: impl Into<String>) {
        let id = id.into();
        let title = title.into();
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(existing) => existing.title = title,
            None => self.tasks.push(Task { id, title }),
        }
    }

    pub fn title(&self, id: &str) -> Option<&str> {
        self.tasks
            .iter()
            .find(|t| t.id == id)
            .map(|t| t.title.as_str())
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tasks.iter().any(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter()
    }

    /// Tasks other than `current`, in snapshot order.
    pub fn others<'a>(&'a self, current: Option<&'a str>) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks
            .iter()
            .filter(move |t| Some(t.id.as_str()) != current)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl<I: Into<String>, T: Into<String>> FromIterator<(I, T)> for TaskList {
    fn from_iter<It: IntoIterator<Item = (I, T)>>(iter: It) -> Self {
        let mut list = TaskList::new();
        for (id, title) in iter {
            list.insert(id, title);
        }
        list
    }
}

impl Serialize for TaskList {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.tasks.len()))?;
        for task in &self.tasks {
            map.serialize_entry(&task.id, &task.title)?;
        }
        map.end()
    }
}

struct TaskListVisitor;

impl<'de> Visitor<'de> for TaskListVisitor {
    type Value = TaskList;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping task ids to titles")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<TaskList, A::Error> {
        let mut list = TaskList::new();
        while let Some((id, title)) = access.next_entry::<String, String>()? {
            list.insert(id, title);
        }
        Ok(list)
    }
}

impl<'de> Deserialize<'de> for TaskList {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(TaskListVisitor)
    }
}

/// The single persisted entity: current task, running slot, task snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionState {
    pub current: Option<String>,
    pub slot: Option<Slot>,
    pub tasks: TaskList,
}

impl SessionState {
    pub fn status(&self) -> Option<SlotKind> {
        self.slot.map(|s| s.kind)
    }

    /// Title of the current task, if it is present in the snapshot.
    pub fn current_title(&self) -> Option<&str> {
        self.current.as_deref().and_then(|id| self.tasks.title(id))
    }
}

/// Wire shape of the state file.
#[derive(Debug, Default, Serialize, Deserialize)]
pub(crate) struct StateFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<SlotKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    #[serde(default)]
    pub tasks: TaskList,
}

impl From<StateFile> for SessionState {
    fn from(file: StateFile) -> Self {
        let slot = match (file.status, file.time) {
            (Some(kind), Some(started_at)) => Some(Slot { kind, started_at }),
            (None, None) => None,
            (status, time) => {
                tracing::warn!(
                    status = ?status,
                    time = ?time,
                    "State file has status without start time (or vice versa); treating timer as idle"
                );
                None
            }
        };

        SessionState {
            current: file.current,
            slot,
            tasks: file.tasks,
        }
    }
}

impl From<&SessionState> for StateFile {
    fn from(state: &SessionState) -> Self {
        StateFile {
            current: state.current.clone(),
            status: state.slot.map(|s| s.kind),
            time: state.slot.map(|s| s.started_at),
            tasks: state.tasks.clone(),
        }
    }
}
