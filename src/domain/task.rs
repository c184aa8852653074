use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single task, possibly nested under a parent task.
///
/// All carryover instances of the same logical task share a `group_id`;
/// that link is what completion toggling and the deduplicated statistics
/// aggregate over.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique ID for internal references
    pub id: Uuid,
    /// Display text
    pub title: String,
    /// Optional free-text notes
    #[serde(default)]
    pub description: String,
    pub is_completed: bool,
    /// Set at creation, never mutated
    pub created_at: DateTime<Local>,
    /// Set when completing, cleared when un-completing
    pub completed_at: Option<DateTime<Local>>,
    pub deadline: Option<DateTime<Local>>,
    /// Whether children are shown (persisted UI state)
    pub is_expanded: bool,
    /// Order among siblings; governs explicit reorder, not display sorting
    pub sort_order: i64,
    /// Shared by all carryover instances of the same logical task
    pub group_id: Uuid,
    /// Weak reference to the parent task (None for top-level tasks)
    pub parent: Option<Uuid>,
    /// The day that directly contains this task (top-level tasks only)
    pub owner_day: Option<Uuid>,
}

impl Task {
    /// Create a fresh task with a new, unique task-group id.
    pub fn new(title: String, owner_day: Option<Uuid>, parent: Option<Uuid>, sort_order: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            title,
            description: String::new(),
            is_completed: false,
            created_at: Local::now(),
            completed_at: None,
            deadline: None,
            is_expanded: true,
            sort_order,
            group_id: Uuid::new_v4(),
            parent,
            owner_day,
        }
    }

    /// Clone a task into another day, preserving the task-group link.
    ///
    /// Title, description, deadline, and sort order carry over; completion
    /// state is reset and `created_at` is stamped fresh. This is the only
    /// way a `group_id` is shared between tasks.
    pub fn carryover_of(source: &Task, parent: Option<Uuid>, owner_day: Option<Uuid>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: source.title.clone(),
            description: source.description.clone(),
            is_completed: false,
            created_at: Local::now(),
            completed_at: None,
            deadline: source.deadline,
            is_expanded: source.is_expanded,
            sort_order: source.sort_order,
            group_id: source.group_id,
            parent,
            owner_day,
        }
    }

    /// A task is overdue when it has a deadline in the past and is not done.
    pub fn is_overdue(&self, now: DateTime<Local>) -> bool {
        match self.deadline {
            Some(deadline) => !self.is_completed && deadline < now,
            None => false,
        }
    }
}
