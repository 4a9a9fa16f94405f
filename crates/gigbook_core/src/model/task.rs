//! Task domain model: templates, instances, and the status state machine.
//!
//! # Responsibility
//! - Define the template record submitted by callers and the instance
//!   records produced by recurrence expansion.
//! - Own the per-instance status transition rules.
//!
//! # Invariants
//! - `completed` and `cancelled` are terminal: no transition leaves them.
//! - Instances of one recurrence group share `recurrence_uuid` and carry
//!   strictly sequential 1-based `instance_number`s assigned at expansion
//!   time; deleting one instance never renumbers siblings.
//! - At most one instance per recurrence group is visible at steady state
//!   (enforced by the service-level visibility cascade).

use crate::model::project::ProjectId;
use crate::model::{Priority, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a task instance.
pub type TaskId = Uuid;

/// Identifier shared by all instances expanded from one template.
pub type RecurrenceId = Uuid;

/// Task lifecycle state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl TaskStatus {
    /// Returns whether this state admits no further transitions.
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns whether moving from `self` to `next` is a legal transition.
    ///
    /// `pending -> in_progress -> completed`, with `cancelled` reachable
    /// from either non-terminal state. Completing straight from `pending`
    /// is allowed.
    pub fn can_transition_to(self, next: TaskStatus) -> bool {
        match self {
            Self::Pending => matches!(
                next,
                Self::InProgress | Self::Completed | Self::Cancelled
            ),
            Self::InProgress => matches!(next, Self::Completed | Self::Cancelled),
            Self::Completed | Self::Cancelled => false,
        }
    }
}

/// Cadence of a recurring task template.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecurrencePattern {
    Daily,
    #[default]
    Weekly,
    Monthly,
    Yearly,
}

/// Caller-submitted template from which task instances are expanded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskTemplate {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub project_uuid: Option<ProjectId>,
    pub due_date: Option<NaiveDate>,
    pub is_recurring: bool,
    pub recurring_pattern: RecurrencePattern,
    /// Pattern steps between consecutive instances; minimum 1.
    pub recurring_interval: u32,
    /// Number of instances to create; `<= 1` means a single one-shot task.
    pub recurrence_count: u32,
}

impl TaskTemplate {
    /// Creates a non-recurring template with default cadence fields.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            project_uuid: None,
            due_date: None,
            is_recurring: false,
            recurring_pattern: RecurrencePattern::default(),
            recurring_interval: 1,
            recurrence_count: 1,
        }
    }

    /// Checks the fields expansion and repositories require.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTaskTitle);
        }
        Ok(())
    }
}

/// Canonical task instance record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: TaskId,
    pub project_uuid: Option<ProjectId>,
    pub title: String,
    pub description: Option<String>,
    pub status: TaskStatus,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
    /// `None` for one-shot tasks.
    pub recurrence_uuid: Option<RecurrenceId>,
    /// 1-based position within the recurrence group; 1 for one-shot tasks.
    pub instance_number: u32,
    pub is_visible: bool,
}

impl Task {
    /// Checks the fields repositories require before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTaskTitle);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::TaskStatus;

    #[test]
    fn terminal_states_admit_no_transitions() {
        for next in [
            TaskStatus::Pending,
            TaskStatus::InProgress,
            TaskStatus::Completed,
            TaskStatus::Cancelled,
        ] {
            assert!(!TaskStatus::Completed.can_transition_to(next));
            assert!(!TaskStatus::Cancelled.can_transition_to(next));
        }
    }

    #[test]
    fn pending_reaches_every_forward_state_but_not_itself() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::InProgress));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::Cancelled));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::InProgress.can_transition_to(TaskStatus::Pending));
    }
}
