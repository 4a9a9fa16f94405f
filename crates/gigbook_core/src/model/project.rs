//! Project domain model.
//!
//! # Responsibility
//! - Define the engagement record that groups tasks and expenses for one
//!   client.
//! - Provide archive lifecycle helpers.
//!
//! # Invariants
//! - `is_archived` is orthogonal to `status`: an archived project keeps its
//!   last status.

use crate::model::client::ClientId;
use crate::model::{Priority, ValidationError};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier for a project.
pub type ProjectId = Uuid;

/// Delivery state of a project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProjectStatus {
    #[default]
    Active,
    Completed,
    OnHold,
    Cancelled,
}

/// Canonical project record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub uuid: ProjectId,
    /// Optional: internal projects have no client.
    pub client_uuid: Option<ClientId>,
    pub name: String,
    pub description: Option<String>,
    pub status: ProjectStatus,
    pub priority: Priority,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub budget: Option<f64>,
    pub is_archived: bool,
}

impl Project {
    /// Creates an active, unarchived project with medium priority.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            client_uuid: None,
            name: name.into(),
            description: None,
            status: ProjectStatus::default(),
            priority: Priority::default(),
            start_date: None,
            deadline: None,
            budget: None,
            is_archived: false,
        }
    }

    /// Checks the fields repositories require before persistence.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyProjectName);
        }
        if let Some(budget) = self.budget {
            if !budget.is_finite() || budget < 0.0 {
                return Err(ValidationError::InvalidProjectBudget(budget));
            }
        }
        Ok(())
    }
}
