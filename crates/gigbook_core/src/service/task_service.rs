//! Task use-case service.
//!
//! # Responsibility
//! - Expand task templates into stored instances (recurring or one-shot).
//! - Enforce the task status state machine above the repository layer.
//! - Drive the visibility cascade when a recurring instance completes.
//!
//! # Invariants
//! - Status changes go through `TaskStatus::can_transition_to`; terminal
//!   states absorb every request except a same-status no-op.
//! - Completing a recurring instance reveals exactly the next instance of
//!   its group; the last instance completes without error.

use crate::model::task::{Task, TaskId, TaskStatus, TaskTemplate};
use crate::recurrence;
use crate::repo::task_repo::{TaskListQuery, TaskRepository, TaskStats};
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Errors from task service operations.
#[derive(Debug)]
pub enum TaskServiceError {
    /// Requested status change is not allowed from the current status.
    InvalidTransition { from: TaskStatus, to: TaskStatus },
    /// Target task does not exist.
    TaskNotFound(TaskId),
    /// Repository-level failure.
    Repo(RepoError),
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTransition { from, to } => {
                write!(f, "invalid task transition: {from:?} -> {to:?}")
            }
            Self::TaskNotFound(id) => write!(f, "task not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for TaskServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { entity: "task", id } => Self::TaskNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Use-case service wrapper for task operations.
pub struct TaskService<R: TaskRepository> {
    repo: R,
}

impl<R: TaskRepository> TaskService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Expands a template and persists every resulting instance.
    ///
    /// # Contract
    /// - A non-recurring template (or `recurrence_count <= 1`) yields one
    ///   visible task.
    /// - A recurring template yields the full instance chain in a single
    ///   transaction; only the first instance is visible.
    /// - Returns the instances exactly as persisted.
    pub fn create_from_template(
        &mut self,
        template: &TaskTemplate,
        today: NaiveDate,
    ) -> Result<Vec<Task>, TaskServiceError> {
        template.validate().map_err(RepoError::from)?;

        let tasks = recurrence::expand(template, today);
        self.repo.create_tasks(&tasks)?;

        if let Some(recurrence_uuid) = tasks.first().and_then(|task| task.recurrence_uuid) {
            info!(
                "event=recurrence_expanded module=task_service group={recurrence_uuid} instances={}",
                tasks.len()
            );
        }

        Ok(tasks)
    }

    /// Creates one already-built task instance.
    pub fn create_task(&self, task: &Task) -> Result<TaskId, TaskServiceError> {
        Ok(self.repo.create_task(task)?)
    }

    /// Updates task fields other than status and visibility.
    ///
    /// The stored status wins; use [`Self::set_status`] for transitions.
    /// Visibility is owned by the completion cascade and cannot be set
    /// through a field update.
    pub fn update_task(&self, task: &Task) -> Result<Task, TaskServiceError> {
        let current = self
            .repo
            .get_task(task.uuid)?
            .ok_or(TaskServiceError::TaskNotFound(task.uuid))?;

        let mut next = task.clone();
        next.status = current.status;
        next.recurrence_uuid = current.recurrence_uuid;
        next.instance_number = current.instance_number;
        next.is_visible = current.is_visible;
        self.repo.update_task(&next)?;

        self.read_back(task.uuid)
    }

    /// Gets one task by ID.
    pub fn get_task(&self, id: TaskId) -> Result<Option<Task>, TaskServiceError> {
        Ok(self.repo.get_task(id)?)
    }

    /// Lists tasks using filter and pagination options.
    pub fn list_tasks(&self, query: &TaskListQuery) -> Result<Vec<Task>, TaskServiceError> {
        Ok(self.repo.list_tasks(query)?)
    }

    /// Deletes a task by ID.
    ///
    /// Deleting one instance of a recurrence group leaves its siblings
    /// untouched.
    pub fn delete_task(&self, id: TaskId) -> Result<(), TaskServiceError> {
        Ok(self.repo.delete_task(id)?)
    }

    /// Applies a status transition, cascading visibility when a recurring
    /// instance completes.
    ///
    /// # Contract
    /// - Requesting the current status is a no-op and returns the task.
    /// - Disallowed transitions fail with `InvalidTransition` and leave
    ///   storage untouched.
    /// - On transition to `Completed`, the next instance of the task's
    ///   recurrence group (if any) becomes visible.
    pub fn set_status(&self, id: TaskId, status: TaskStatus) -> Result<Task, TaskServiceError> {
        let current = self
            .repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))?;

        if current.status == status {
            return Ok(current);
        }

        if !current.status.can_transition_to(status) {
            return Err(TaskServiceError::InvalidTransition {
                from: current.status,
                to: status,
            });
        }

        self.repo.set_status(id, status)?;

        if status == TaskStatus::Completed {
            if let Some(recurrence_uuid) = current.recurrence_uuid {
                let revealed = self
                    .repo
                    .reveal_next_instance(recurrence_uuid, current.instance_number)?;
                if revealed {
                    info!(
                        "event=instance_revealed module=task_service group={recurrence_uuid} after={}",
                        current.instance_number
                    );
                }
            }
        }

        self.read_back(id)
    }

    /// Returns aggregated counters for the dashboard.
    pub fn task_stats(&self, today: NaiveDate) -> Result<TaskStats, TaskServiceError> {
        Ok(self.repo.task_stats(today)?)
    }

    fn read_back(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        self.repo
            .get_task(id)?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }
}
