//! Task repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `upsert_task` inserts when `id` is `None` and updates otherwise.
//! - Title validation runs before any SQL mutation.
//! - Lists come back in insertion order (`task_id ASC`); view ordering is
//!   applied above this layer by `crate::ordering`.

use super::{
    bool_to_int, ensure_connection_ready, int_to_bool, Entity, RepoError, RepoResult,
    SubjectScope,
};
use crate::model::subject::SubjectId;
use crate::model::task::{validate_task_title, Priority, Task, TaskId};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

const TASK_SELECT_SQL: &str = "SELECT
    task_id,
    task_subject_id,
    title,
    description,
    related_to_subject,
    priority,
    due_date,
    is_completed
FROM tasks";

pub trait TaskRepository {
    fn upsert_task(&self, task: &Task) -> RepoResult<TaskId>;
    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>>;
    fn delete_task(&self, id: TaskId) -> RepoResult<()>;
    fn list_tasks(&self, scope: SubjectScope) -> RepoResult<Vec<Task>>;
}

/// SQLite-backed task repository.
pub struct SqliteTaskRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteTaskRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl TaskRepository for SqliteTaskRepository<'_> {
    fn upsert_task(&self, task: &Task) -> RepoResult<TaskId> {
        validate_task_title(&task.title)?;

        let Some(task_id) = task.id else {
            self.conn.execute(
                "INSERT INTO tasks (
                    task_subject_id,
                    title,
                    description,
                    related_to_subject,
                    priority,
                    due_date,
                    is_completed
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7);",
                params![
                    task.subject_id,
                    task.title.as_str(),
                    task.description.as_str(),
                    task.subject_name.as_str(),
                    task.priority.value(),
                    task.due_date,
                    bool_to_int(task.is_completed),
                ],
            )?;
            return Ok(self.conn.last_insert_rowid());
        };

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                task_subject_id = ?1,
                title = ?2,
                description = ?3,
                related_to_subject = ?4,
                priority = ?5,
                due_date = ?6,
                is_completed = ?7
             WHERE task_id = ?8;",
            params![
                task.subject_id,
                task.title.as_str(),
                task.description.as_str(),
                task.subject_name.as_str(),
                task.priority.value(),
                task.due_date,
                bool_to_int(task.is_completed),
                task_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: Entity::Task,
                id: task_id,
            });
        }
        Ok(task_id)
    }

    fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE task_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }
        Ok(None)
    }

    fn delete_task(&self, id: TaskId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE task_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: Entity::Task,
                id,
            });
        }
        Ok(())
    }

    fn list_tasks(&self, scope: SubjectScope) -> RepoResult<Vec<Task>> {
        let mut sql = format!("{TASK_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();
        if let Some(subject_id) = scope.subject_id() {
            sql.push_str(" AND task_subject_id = ?");
            bind_values.push(Value::Integer(subject_id));
        }
        sql.push_str(" ORDER BY task_id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut tasks = Vec::new();
        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }
        Ok(tasks)
    }
}

/// Bulk delete used only by the subject cascade.
pub(crate) fn delete_tasks_for_subject(
    conn: &Connection,
    subject_id: SubjectId,
) -> RepoResult<usize> {
    let deleted = conn.execute("DELETE FROM tasks WHERE task_subject_id = ?1;", [subject_id])?;
    Ok(deleted)
}

fn parse_task_row(row: &Row<'_>) -> RepoResult<Task> {
    Ok(Task {
        id: Some(row.get("task_id")?),
        subject_id: row.get("task_subject_id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        subject_name: row.get("related_to_subject")?,
        priority: Priority::from_i64(row.get("priority")?),
        due_date: row.get("due_date")?,
        is_completed: int_to_bool(row.get("is_completed")?, "tasks.is_completed")?,
    })
}
