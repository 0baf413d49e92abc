//! Tasks assigned to employees.

use super::EntityId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

wire_enum! {
    /// Progress of a task
    TaskStatus {
        /// Not started
        Pending => "Pending",
        /// Being worked on
        InProgress => "In Progress",
        /// Done
        Completed => "Completed",
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::Pending
    }
}

/// A task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id
    #[serde(rename = "_id")]
    pub id: EntityId,
    /// Short title
    #[serde(default)]
    pub title: String,
    /// Longer description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Progress
    #[serde(default)]
    pub status: TaskStatus,
    /// Free-form priority label
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<String>,
    /// Assignee: an id, or the populated user record
    #[serde(default, rename = "assignedTo", skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<Value>,
    /// Due date as sent by the server
    #[serde(default, rename = "dueDate", skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    /// Fields this client does not model
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-status task counts, derived from a cached list
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TaskCounts {
    /// `Pending` tasks
    pub pending: usize,
    /// `In Progress` tasks
    pub in_progress: usize,
    /// `Completed` tasks
    pub completed: usize,
    /// All tasks, including unknown statuses
    pub total: usize,
}

impl TaskCounts {
    /// Count tasks by status
    #[must_use]
    pub fn tally<'a>(tasks: impl IntoIterator<Item = &'a Task>) -> Self {
        tasks.into_iter().fold(Self::default(), |mut counts, task| {
            match task.status {
                TaskStatus::Pending => counts.pending += 1,
                TaskStatus::InProgress => counts.in_progress += 1,
                TaskStatus::Completed => counts.completed += 1,
                TaskStatus::Other(_) => {},
            }
            counts.total += 1;
            counts
        })
    }
}
