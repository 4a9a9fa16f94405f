//! Task repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD, batch-insert, and visibility APIs over `tasks` storage.
//! - Own the status/priority aggregation queries behind `task_stats`.
//!
//! # Invariants
//! - Write paths call `Task::validate()` before SQL mutations.
//! - `create_tasks` inserts a whole recurrence batch in one transaction:
//!   all instances or none.
//! - Default listing hides `is_visible = 0` rows (the not-yet-revealed
//!   instances of recurrence groups).

use crate::model::project::ProjectId;
use crate::model::task::{RecurrenceId, Task, TaskId, TaskStatus};
use crate::model::Priority;
use crate::repo::project_repo::{parse_priority, priority_to_db};
use crate::repo::{
    bool_to_int, ensure_schema_ready, parse_bool, parse_date, parse_uuid, push_page, RepoError,
    RepoResult,
};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    project_uuid,
    title,
    description,
    status,
    priority,
    due_date,
    recurrence_uuid,
    instance_number,
    is_visible
FROM tasks";

const TASK_COLUMNS: &[&str] = &[
    "uuid",
    "project_uuid",
    "title",
    "description",
    "status",
    "priority",
    "due_date",
    "recurrence_uuid",
    "instance_number",
    "is_visible",
    "updated_at",
];

/// Query options for listing tasks.
#[derive(Debug, Clone, Default)]
pub struct TaskListQuery {
    pub status: Option<TaskStatus>,
    pub priority: Option<Priority>,
    pub project_uuid: Option<ProjectId>,
    /// Exact-day due date filter.
    pub due_on: Option<NaiveDate>,
    /// Case-insensitive substring match on title or description.
    pub search: Option<String>,
    /// `false` (default) returns only visible instances.
    pub include_hidden: bool,
    pub limit: Option<u32>,
    pub offset: u32,
}

/// Count of tasks per priority level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriorityCount {
    pub priority: Priority,
    pub count: u64,
}

/// Aggregated task counters for the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    pub cancelled: u64,
    /// Due before today and neither completed nor cancelled.
    pub overdue: u64,
    pub by_priority: Vec<PriorityCount>,
}

/// Repository interface for task operations.
pub trait TaskRepository {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId>;
    /// Inserts a recurrence batch atomically.
    fn create_tasks(&mut self, tasks: &[Task]) -> RepoResult<()>;
    fn update_task(&self, task: &Task) -> RepoResult<()>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()>;
    /// Makes the instance following `after` in the group visible.
    ///
    /// Returns `false` when the series has no further instance; that is
    /// expected terminal behavior, not an error.
    fn reveal_next_instance(&self, recurrence: RecurrenceId, after: u32) -> RepoResult<bool>;
    fn task_stats(&self, today: NaiveDate) -> RepoResult<TaskStats>;
}

/// SQLite-backed task repository.
#[derive(Debug)]
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    /// Constructs a repository from a migrated/ready connection.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        ensure_schema_ready(conn, "tasks", TASK_COLUMNS)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn create_task(&self, task: &Task) -> RepoResult<TaskId> {
        task.validate()?;
        insert_task(self.conn, task)?;
        Ok(task.uuid)
    }

    fn create_tasks(&mut self, tasks: &[Task]) -> RepoResult<()> {
        for task in tasks {
            task.validate()?;
        }

        let tx = self.conn.transaction()?;
        for task in tasks {
            insert_task(&tx, task)?;
        }
        tx.commit()?;

        Ok(())
    }

    fn update_task(&self, task: &Task) -> RepoResult<()> {
        task.validate()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                project_uuid = ?1,
                title = ?2,
                description = ?3,
                status = ?4,
                priority = ?5,
                due_date = ?6,
                is_visible = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?8;",
            params![
                task.project_uuid.map(|id| id.to_string()),
                task.title.as_str(),
                task.description.as_deref(),
                task_status_to_db(task.status),
                priority_to_db(task.priority),
                task.due_date.map(|date| date.to_string()),
                bool_to_int(task.is_visible),
                task.uuid.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", task.uuid));
        }

        Ok(())
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    fn list_tasks(&self, query: &TaskListQuery) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if !query.include_hidden {
            sql.push_str(" AND is_visible = 1");
        }

        if let Some(status) = query.status {
            sql.push_str(" AND status = ?");
            bind_values.push(Value::Text(task_status_to_db(status).to_string()));
        }

        if let Some(priority) = query.priority {
            sql.push_str(" AND priority = ?");
            bind_values.push(Value::Text(priority_to_db(priority).to_string()));
        }

        if let Some(project_uuid) = query.project_uuid {
            sql.push_str(" AND project_uuid = ?");
            bind_values.push(Value::Text(project_uuid.to_string()));
        }

        if let Some(due_on) = query.due_on {
            sql.push_str(" AND due_date = ?");
            bind_values.push(Value::Text(due_on.to_string()));
        }

        if let Some(search) = query.search.as_deref() {
            sql.push_str(
                " AND (title LIKE ? COLLATE NOCASE
                   OR description LIKE ? COLLATE NOCASE)",
            );
            let pattern = format!("%{search}%");
            bind_values.push(Value::Text(pattern.clone()));
            bind_values.push(Value::Text(pattern));
        }

        sql.push_str(" ORDER BY updated_at DESC, uuid ASC");
        push_page(&mut sql, &mut bind_values, query.limit, query.offset);

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;

        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }

        Ok(())
    }

    fn set_status(&self, id: TaskId, status: TaskStatus) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                status = ?1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE uuid = ?2;",
            params![task_status_to_db(status), id.to_string()],
        )?;

        if changed == 0 {
            return Err(RepoError::not_found("task", id));
        }

        Ok(())
    }

    fn reveal_next_instance(&self, recurrence: RecurrenceId, after: u32) -> RepoResult<bool> {
        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                is_visible = 1,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE recurrence_uuid = ?1
               AND instance_number = ?2;",
            params![recurrence.to_string(), after + 1],
        )?;

        Ok(changed > 0)
    }

    fn task_stats(&self, today: NaiveDate) -> RepoResult<TaskStats> {
        let mut stats = self.conn.query_row(
            "SELECT
                COUNT(*),
                SUM(CASE WHEN status = 'pending' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'in_progress' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'completed' THEN 1 ELSE 0 END),
                SUM(CASE WHEN status = 'cancelled' THEN 1 ELSE 0 END),
                SUM(CASE
                        WHEN status NOT IN ('completed', 'cancelled')
                         AND due_date IS NOT NULL
                         AND due_date < ?1
                        THEN 1 ELSE 0
                    END)
             FROM tasks;",
            [today.to_string()],
            |row| {
                Ok(TaskStats {
                    total: row.get::<_, i64>(0)? as u64,
                    pending: row.get::<_, Option<i64>>(1)?.unwrap_or(0) as u64,
                    in_progress: row.get::<_, Option<i64>>(2)?.unwrap_or(0) as u64,
                    completed: row.get::<_, Option<i64>>(3)?.unwrap_or(0) as u64,
                    cancelled: row.get::<_, Option<i64>>(4)?.unwrap_or(0) as u64,
                    overdue: row.get::<_, Option<i64>>(5)?.unwrap_or(0) as u64,
                    by_priority: Vec::new(),
                })
            },
        )?;

        let mut stmt = self.conn.prepare(
            "SELECT priority, COUNT(*)
             FROM tasks
             GROUP BY priority
             ORDER BY CASE priority
                WHEN 'low' THEN 0
                WHEN 'medium' THEN 1
                WHEN 'high' THEN 2
                WHEN 'urgent' THEN 3
                ELSE 4
             END ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let priority_text: String = row.get(0)?;
            stats.by_priority.push(PriorityCount {
                priority: parse_priority(&priority_text, "tasks.priority")?,
                count: row.get::<_, i64>(1)? as u64,
            });
        }

        Ok(stats)
    }
}

// `Transaction` derefs to `Connection`, so the batch path reuses this.
fn insert_task(conn: &Connection, task: &Task) -> RepoResult<()> {
    conn.execute(
        "INSERT INTO tasks (
            uuid,
            project_uuid,
            title,
            description,
            status,
            priority,
            due_date,
            recurrence_uuid,
            instance_number,
            is_visible
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10);",
        params![
            task.uuid.to_string(),
            task.project_uuid.map(|id| id.to_string()),
            task.title.as_str(),
            task.description.as_deref(),
            task_status_to_db(task.status),
            priority_to_db(task.priority),
            task.due_date.map(|date| date.to_string()),
            task.recurrence_uuid.map(|id| id.to_string()),
            task.instance_number,
            bool_to_int(task.is_visible),
        ],
    )?;

    Ok(())
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let project_text: Option<String> = row.get("project_uuid")?;
    let status_text: String = row.get("status")?;
    let priority_text: String = row.get("priority")?;
    let due_text: Option<String> = row.get("due_date")?;
    let recurrence_text: Option<String> = row.get("recurrence_uuid")?;
    let instance_number: i64 = row.get("instance_number")?;

    Ok(Task {
        uuid: parse_uuid(&uuid_text, "tasks.uuid")?,
        project_uuid: project_text
            .map(|value| parse_uuid(&value, "tasks.project_uuid"))
            .transpose()?,
        title: row.get("title")?,
        description: row.get("description")?,
        status: parse_task_status(&status_text)?,
        priority: parse_priority(&priority_text, "tasks.priority")?,
        due_date: due_text
            .map(|value| parse_date(&value, "tasks.due_date"))
            .transpose()?,
        recurrence_uuid: recurrence_text
            .map(|value| parse_uuid(&value, "tasks.recurrence_uuid"))
            .transpose()?,
        instance_number: u32::try_from(instance_number).map_err(|_| {
            RepoError::InvalidData(format!(
                "invalid instance number `{instance_number}` in tasks.instance_number"
            ))
        })?,
        is_visible: parse_bool(row.get("is_visible")?, "tasks.is_visible")?,
    })
}

fn task_status_to_db(status: TaskStatus) -> &'static str {
    match status {
        TaskStatus::Pending => "pending",
        TaskStatus::InProgress => "in_progress",
        TaskStatus::Completed => "completed",
        TaskStatus::Cancelled => "cancelled",
    }
}

fn parse_task_status(value: &str) -> RepoResult<TaskStatus> {
    match value {
        "pending" => Ok(TaskStatus::Pending),
        "in_progress" => Ok(TaskStatus::InProgress),
        "completed" => Ok(TaskStatus::Completed),
        "cancelled" => Ok(TaskStatus::Cancelled),
        other => Err(RepoError::InvalidData(format!(
            "invalid task status `{other}` in tasks.status"
        ))),
    }
}
