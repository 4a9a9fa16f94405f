//! Project use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD entry points for project records.
//! - Expose archive toggling and dashboard aggregation.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence contracts.
//! - Service layer remains storage-agnostic.

use crate::model::project::{Project, ProjectId};
use crate::repo::project_repo::{ProjectListQuery, ProjectRepository, ProjectStats};
use crate::repo::RepoResult;

/// Use-case service wrapper for project operations.
pub struct ProjectService<R: ProjectRepository> {
    repo: R,
}

impl<R: ProjectRepository> ProjectService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a new project record.
    pub fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        self.repo.create_project(project)
    }

    /// Updates an existing project by stable ID.
    pub fn update_project(&self, project: &Project) -> RepoResult<()> {
        self.repo.update_project(project)
    }

    /// Gets one project by ID.
    pub fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        self.repo.get_project(id)
    }

    /// Lists projects using filter and pagination options.
    pub fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        self.repo.list_projects(query)
    }

    /// Deletes a project by ID.
    pub fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo.delete_project(id)
    }

    /// Archives a project without touching its status.
    pub fn archive_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo.set_archived(id, true)
    }

    /// Restores an archived project.
    pub fn unarchive_project(&self, id: ProjectId) -> RepoResult<()> {
        self.repo.set_archived(id, false)
    }

    /// Returns aggregated counters for the dashboard.
    pub fn project_stats(&self) -> RepoResult<ProjectStats> {
        self.repo.project_stats()
    }
}
