//! Session repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist completed study sessions and answer duration aggregates.
//!
//! # Invariants
//! - Sessions shorter than `MIN_SESSION_SECS` are never inserted.
//! - Lists are newest first by insertion (`session_id DESC`).
//! - Aggregates over zero rows are `0`, never NULL.

use super::{ensure_connection_ready, Entity, RepoError, RepoResult, SubjectScope};
use crate::model::session::{Session, SessionId};
use crate::model::subject::SubjectId;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};

/// Row cap used by the recent-session views.
pub const RECENT_SESSIONS_LIMIT: u32 = 5;

const SESSION_SELECT_SQL: &str = "SELECT
    session_id,
    session_subject_id,
    related_to_subject,
    date,
    duration
FROM sessions";

/// Query options for listing sessions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionListQuery {
    pub scope: SubjectScope,
    pub limit: Option<u32>,
}

impl SessionListQuery {
    pub fn recent(scope: SubjectScope) -> Self {
        Self {
            scope,
            limit: Some(RECENT_SESSIONS_LIMIT),
        }
    }
}

pub trait SessionRepository {
    fn insert_session(&self, session: &Session) -> RepoResult<SessionId>;
    fn delete_session(&self, id: SessionId) -> RepoResult<()>;
    fn total_duration(&self, scope: SubjectScope) -> RepoResult<i64>;
    fn list_sessions(&self, query: &SessionListQuery) -> RepoResult<Vec<Session>>;
}

/// SQLite-backed session repository.
pub struct SqliteSessionRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionRepository<'conn> {
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl SessionRepository for SqliteSessionRepository<'_> {
    fn insert_session(&self, session: &Session) -> RepoResult<SessionId> {
        if !session.meets_minimum() {
            return Err(RepoError::SessionTooShort {
                duration_secs: session.duration_secs,
            });
        }

        self.conn.execute(
            "INSERT INTO sessions (
                session_subject_id,
                related_to_subject,
                date,
                duration
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                session.subject_id,
                session.subject_name.as_str(),
                session.date,
                session.duration_secs,
            ],
        )?;

        Ok(self.conn.last_insert_rowid())
    }

    fn delete_session(&self, id: SessionId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM sessions WHERE session_id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound {
                entity: Entity::Session,
                id,
            });
        }
        Ok(())
    }

    fn total_duration(&self, scope: SubjectScope) -> RepoResult<i64> {
        let total = match scope.subject_id() {
            Some(subject_id) => self.conn.query_row(
                "SELECT COALESCE(SUM(duration), 0)
                 FROM sessions
                 WHERE session_subject_id = ?1;",
                [subject_id],
                |row| row.get(0),
            )?,
            None => self.conn.query_row(
                "SELECT COALESCE(SUM(duration), 0) FROM sessions;",
                [],
                |row| row.get(0),
            )?,
        };
        Ok(total)
    }

    fn list_sessions(&self, query: &SessionListQuery) -> RepoResult<Vec<Session>> {
        let mut sql = format!("{SESSION_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(subject_id) = query.scope.subject_id() {
            sql.push_str(" AND session_subject_id = ?");
            bind_values.push(Value::Integer(subject_id));
        }

        sql.push_str(" ORDER BY session_id DESC");

        if let Some(limit) = query.limit {
            sql.push_str(" LIMIT ?");
            bind_values.push(Value::Integer(i64::from(limit)));
        }

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut sessions = Vec::new();
        while let Some(row) = rows.next()? {
            sessions.push(parse_session_row(row)?);
        }
        Ok(sessions)
    }
}

/// Bulk delete used only by the subject cascade. Runs on whatever
/// connection or transaction the caller holds.
pub(crate) fn delete_sessions_for_subject(
    conn: &Connection,
    subject_id: SubjectId,
) -> RepoResult<usize> {
    let deleted = conn.execute(
        "DELETE FROM sessions WHERE session_subject_id = ?1;",
        [subject_id],
    )?;
    Ok(deleted)
}

fn parse_session_row(row: &Row<'_>) -> RepoResult<Session> {
    let duration_secs: i64 = row.get("duration")?;
    if duration_secs < 0 {
        return Err(RepoError::InvalidData(format!(
            "negative duration `{duration_secs}` in sessions.duration"
        )));
    }

    Ok(Session {
        id: Some(row.get("session_id")?),
        subject_id: row.get("session_subject_id")?,
        subject_name: row.get("related_to_subject")?,
        date: row.get("date")?,
        duration_secs,
    })
}
