//! Subject repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist subjects and answer subject-level aggregates.
//! - Own the subject delete cascade across `tasks`, `sessions` and
//!   `subjects`.
//!
//! # Invariants
//! - `upsert_subject` inserts when `id` is `None`; SQLite assigns the id.
//! - The cascade runs in one IMMEDIATE transaction: either every row owned by
//!   the subject is gone, or nothing changed.

use super::session_repo::delete_sessions_for_subject;
use super::task_repo::delete_tasks_for_subject;
use super::{ensure_connection_ready, Entity, RepoError, RepoResult};
use crate::model::subject::{
    decode_colors, encode_colors, validate_goal_hours, validate_subject_name, Subject, SubjectId,
};
use log::{error, info};
use rusqlite::{params, Connection, Row, Transaction, TransactionBehavior};

const SUBJECT_SELECT_SQL: &str = "SELECT
    subject_id,
    name,
    goal_hours,
    colors
FROM subjects";

/// Row counts removed by one subject cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CascadeReport {
    pub tasks_deleted: usize,
    pub sessions_deleted: usize,
}

pub trait SubjectRepository {
    fn upsert_subject(&self, subject: &Subject) -> RepoResult<SubjectId>;
    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>>;
    fn list_subjects(&self) -> RepoResult<Vec<Subject>>;
    fn subject_count(&self) -> RepoResult<u32>;
    /// Sum of every subject's goal hours. Rows whose text is not numeric
    /// contribute zero.
    fn total_goal_hours(&self) -> RepoResult<f64>;
    /// Deletes the subject's tasks, then its sessions, then the subject.
    fn delete_subject_cascade(&self, id: SubjectId) -> RepoResult<CascadeReport>;
}

/// SQLite-backed subject repository.
pub struct SqliteSubjectRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSubjectRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SubjectRepository for SqliteSubjectRepository<'_> {
    fn upsert_subject(&self, subject: &Subject) -> RepoResult<SubjectId> {
        validate_subject_name(&subject.name)?;
        validate_goal_hours(&subject.goal_hours)?;
        let colors = encode_colors(&subject.colors);

        let Some(subject_id) = subject.id else {
            self.conn.execute(
                "INSERT INTO subjects (name, goal_hours, colors) VALUES (?1, ?2, ?3);",
                params![subject.name.as_str(), subject.goal_hours.as_str(), colors],
            )?;
            return Ok(self.conn.last_insert_rowid());
        };

        let changed = self.conn.execute(
            "UPDATE subjects
             SET name = ?1, goal_hours = ?2, colors = ?3
             WHERE subject_id = ?4;",
            params![
                subject.name.as_str(),
                subject.goal_hours.as_str(),
                colors,
                subject_id,
            ],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: Entity::Subject,
                id: subject_id,
            });
        }
        Ok(subject_id)
    }

    fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} WHERE subject_id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_subject_row(row)?));
        }
        Ok(None)
    }

    fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{SUBJECT_SELECT_SQL} ORDER BY subject_id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut subjects = Vec::new();
        while let Some(row) = rows.next()? {
            subjects.push(parse_subject_row(row)?);
        }
        Ok(subjects)
    }

    fn subject_count(&self) -> RepoResult<u32> {
        let count = self
            .conn
            .query_row("SELECT COUNT(*) FROM subjects;", [], |row| row.get(0))?;
        Ok(count)
    }

    fn total_goal_hours(&self) -> RepoResult<f64> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(CAST(goal_hours AS REAL)), 0.0) FROM subjects;",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    fn delete_subject_cascade(&self, id: SubjectId) -> RepoResult<CascadeReport> {
        info!("event=subject_delete module=repo status=start subject_id={id}");
        match cascade_in_transaction(self.conn, id) {
            Ok(report) => {
                info!(
                    "event=subject_delete module=repo status=ok subject_id={id} tasks_deleted={} sessions_deleted={}",
                    report.tasks_deleted, report.sessions_deleted
                );
                Ok(report)
            }
            Err(err) => {
                error!(
                    "event=subject_delete module=repo status=error subject_id={id} error={err}"
                );
                Err(err)
            }
        }
    }
}

fn cascade_in_transaction(conn: &Connection, id: SubjectId) -> RepoResult<CascadeReport> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)?;

    let tasks_deleted = delete_tasks_for_subject(&tx, id)?;
    let sessions_deleted = delete_sessions_for_subject(&tx, id)?;
    let subjects_deleted = tx.execute("DELETE FROM subjects WHERE subject_id = ?1;", [id])?;
    if subjects_deleted == 0 {
        // Dropping `tx` rolls back the task/session deletes.
        return Err(RepoError::NotFound {
            entity: Entity::Subject,
            id,
        });
    }

    tx.commit()?;
    Ok(CascadeReport {
        tasks_deleted,
        sessions_deleted,
    })
}

fn parse_subject_row(row: &Row<'_>) -> RepoResult<Subject> {
    let colors_text: String = row.get("colors")?;
    let colors = decode_colors(&colors_text)
        .map_err(|message| RepoError::InvalidData(format!("{message} in subjects.colors")))?;

    Ok(Subject {
        id: Some(row.get("subject_id")?),
        name: row.get("name")?,
        goal_hours: row.get("goal_hours")?,
        colors,
    })
}
