//! Project repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD APIs over `projects` storage.
//! - Own the archive toggle and project-wide aggregation queries.
//!
//! # Invariants
//! - Write paths call `Project::validate()` before SQL mutations.
//! - Archiving never alters the project status column.

use crate::model::client::ClientId;
use crate::model::project::{Project, ProjectId, ProjectStatus};
use crate::model::Priority;
use crate::repo::{
    bool_to_int, ensure_schema_ready, parse_bool, parse_date, parse_uuid, push_page, RepoError,
    RepoResult,
};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const PROJECT_SELECT_SQL: &str = "SELECT
    uuid,
    client_uuid,
    name,
    description,
    status,
    priority,
    start_date,
    deadline,
    budget,
    is_archived
FROM projects";

const PROJECT_COLUMNS: &[&str] = &[
    "uuid",
    "client_uuid",
    "name",
    "description",
    "status",
    "priority",
    "start_date",
    "deadline",
    "budget",
    "is_archived",
    "updated_at",
];

/// Query options for listing projects.
#[derive(Debug, Clone, Default)]
pub struct ProjectListQuery {
    pub status: Option<ProjectStatus>,
    pub client_uuid: Option<ClientId>,
    /// `false` (default) hides archived projects.
    pub include_archived: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Aggregated project counters for the dashboard.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProjectStats {
    pub total: u64,
    pub active: u64,
    pub completed: u64,
    pub on_hold: u64,
    pub cancelled: u64,
    pub archived: u64,
    /// Sum of all known budgets; projects without a budget count as 0.
    pub total_budget: f64,
}

/// Repository interface for project operations.
pub trait ProjectRepository {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId>;
    fn update_project(&self, project: &Project) -> RepoResult<()>;
    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>>;
    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>>;
    fn delete_project(&self, id: ProjectId) -> RepoResult<()>;
    fn set_archived(&self, id: ProjectId, archived: bool) -> RepoResult<()>;
    fn project_stats(&self) -> RepoResult<ProjectStats>;
}

/// SQLite-backed project repository.
#[derive(Debug)]
pub struct SqliteProjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteProjectRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "projects", PROJECT_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl ProjectRepository for SqliteProjectRepository<'_> {
    fn create_project(&self, project: &Project) -> RepoResult<ProjectId> {
        project.validate()?;

        self.conn.execute(
            "INSERT INTO projects (
                uuid,
                client_uuid,
                name,
                description,
                status,
                priority,
                start_date,
                deadline,
                budget,
                is_archived
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
            params![
                project.uuid.to_string(),
                project.client_uuid.map(|id| id.to_string()),
                project.name.as_str(),
                project.description.as_deref(),
                project_status_to_db(project.status),
                priority_to_db(project.priority),
                project.start_date.map(|date| date.to_string()),
                project.deadline.map(|date| date.to_string()),
                project.budget,
                bool_to_int(project.is_archived),
            ],
        )?;

        Ok(project.uuid)
    }

    fn update_project(&self, project: &Project) -> RepoResult<()> {
        project.validate()?;

        let changed = self.conn.execute(
            "UPDATE projects
             SET
                client_uuid = ?1,
                name = ?2,
                description = ?3,
                status = ?4,
                priority = ?5,
                start_date = ?6,
                deadline = ?7,
                budget = ?8,
                is_archived = ?9,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?10;",
            params![
                project.client_uuid.map(|id| id.to_string()),
                project.name.as_str(),
                project.description.as_deref(),
                project_status_to_db(project.status),
                priority_to_db(project.priority),
                project.start_date.map(|date| date.to_string()),
                project.deadline.map(|date| date.to_string()),
                project.budget,
                bool_to_int(project.is_archived),
                project.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("project", project.uuid));
        }

        Ok(())
    }

    fn get_project(&self, id: ProjectId) -> RepoResult<Option<Project>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{PROJECT_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_project_row(row)?));
        }

        Ok(None)
    }

    fn list_projects(&self, query: &ProjectListQuery) -> RepoResult<Vec<Project>> {
        let mut sql = format!("{PROJECT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_archived {
            sql.push_str(" AND is_archived = 0");
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(project_status_to_db(status).to_string()));
        }

        if let Some(client_uuid) = query.client_uuid {
            sql.push_str(" AND client_uuid = ?");
            bind_values.push(Value::Text(client_uuid.to_string()));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");
        push_page(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut projects = Vec::new();
        while let Some(row) = rows.next()? {
            projects.push(parse_project_row(row)?);
        }

        Ok(projects)
    }

    fn delete_project(&self, id: ProjectId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM projects WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("project", id));
        }

        Ok(())
    }

    fn set_archived(&self, id: ProjectId, archived: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE projects
             SET
                is_archived = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![bool_to_int(archived), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("project", id));
        }

        Ok(())
    }

    fn project_stats(&self) -> RepoResult<ProjectStats> {
        let stats = self.conn.query_row(
            "SELECT
                COUNT(*),
                SUM(CASE WHEN status = 'active' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'on_hold' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END),
                SUM(CASE WHEN is_archived = 1 THEN 1 ELSE 0 END),
                COALESCE(SUM(COALESCE(budget, 0)), 0)
             FROM projects;",
            [],
            |row| {
                Ok(ProjectStats {
                    total: row.get::<_, i64>(0)? as u64,
                    active: row.get::<_, Option<i64>>(1)?.unwrap_or(0) as u64,
                    completed: row.get::<_, Option<i64>>(2)?.unwrap_or(0) as u64,
                    on_hold: row.get::<_, Option<i64>>(3)?.unwrap_or(0) as u64,
                    cancelled: row.get::<_, Option<i64>>(4)?.unwrap_or(0) as u64,
                    archived: row.get::<_, Option<i64>>(5)?.unwrap_or(0) as u64,
                    total_budget: row.get::<_, f64>(6)?,
                })
            },
        )?;

        Ok(stats)
    }
}

fn parse_project_row(row: &Row<'_>) -> RepoResult<Project> {
    let uuid_text: String = row.get("uuid")?;
    let client_text: Option<String> = row.get("client_uuid")?;
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;
    let start_text: Option<String> = row.get("start_date")?;
    let deadline_text: Option<String> = row.get("deadline")?;

    Ok(Project {
        uuid: parse_uuid(&uuid_text, "projects.uuid")?,
        client_uuid: client_text
            .map(|value| parse_uuid(&value, "projects.client_uuid"))
            .transpose()?,
        name: row.get("name")?,
        description: row.get("description")?,
        status: parse_project_status(&status_text)?,
        priority: parse_priority(&priority_text, "projects.priority")?,
        start_date: start_text
            .map(|value| parse_date(&value, "projects.start_date"))
            .transpose()?,
        deadline: deadline_text
            .map(|value| parse_date(&value, "projects.deadline"))
            .transpose()?,
        budget: row.get("budget")?,
        is_archived: parse_bool(row.get("is_archived")?, "projects.is_archived")?,
    })
}

fn project_status_to_db(status: ProjectStatus) -> &'static str {
    match status {
        ProjectStatus::Active => "active",
        ProjectStatus::Completed => "completed",
        ProjectStatus::OnHold => "on_hold",
        ProjectStatus::Cancelled => "cancelled",
    }
}

fn parse_project_status(value: &str) -> RepoResult<ProjectStatus> {
    match value {
        "active" => Ok(ProjectStatus::Active),
        "completed" => Ok(ProjectStatus::Completed),
        "on_hold" => Ok(ProjectStatus::OnHold),
        "cancelled" => Ok(ProjectStatus::Cancelled),
        other => Err(RepoError::InvalidData(format!(
            "invalid project status `{other}` in projects.status"
        ))),
    }
}

pub(crate) fn priority_to_db(priority: Priority) -> &'static str {
    match priority {
        Priority::Low => "low",
        Priority::Medium => "medium",
        Priority::High => "high",
        Priority::Urgent => "urgent",
    }
}

pub(crate) fn parse_priority(value: &str, context: &str) -> RepoResult<Priority> {
    match value {
        "low" => Ok(Priority::Low),
        "medium" => Ok(Priority::Medium),
        "high" => Ok(Priority::High),
        "urgent" => Ok(Priority::Urgent),
        other => Err(RepoError::InvalidData(format!(
            "invalid priority `{other}` in {context}"
        ))),
    }
}
