//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts per table.
//! - Isolate SQL details from service orchestration.
//!
//! # Invariants
//! - Write paths validate records before any SQL mutation.
//! - Repositories only accept connections at the latest schema version.
//! - Multi-table writes (the subject cascade) run in one transaction.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::subject::{SubjectId, SubjectValidationError};
use crate::model::task::TaskValidationError;
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod session_repo;
pub mod subject_repo;
pub mod task_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Table-level identity used in `NotFound` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Subject,
    Task,
    Session,
}

impl Entity {
    pub fn label(self) -> &'static str {
        match self {
            Self::Subject => "subject",
            Self::Task => "task",
            Self::Session => "session",
        }
    }
}

/// Repository error for persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    InvalidSubject(SubjectValidationError),
    InvalidTask(TaskValidationError),
    SessionTooShort {
        duration_secs: i64,
    },
    Db(DbError),
    NotFound {
        entity: Entity,
        id: i64,
    },
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSubject(err) => write!(f, "{err}"),
            Self::InvalidTask(err) => write!(f, "{err}"),
            Self::SessionTooShort { duration_secs } => write!(
                f,
                "session of {duration_secs}s is shorter than the {}s minimum",
                crate::model::session::MIN_SESSION_SECS
            ),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound { entity, id } => write!(f, "{} not found: {id}", entity.label()),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidSubject(err) => Some(err),
            Self::InvalidTask(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::SessionTooShort { .. }
            | Self::NotFound { .. }
            | Self::UninitializedConnection { .. }
            | Self::InvalidData(_) => None,
        }
    }
}

impl From<SubjectValidationError> for RepoError {
    fn from(value: SubjectValidationError) -> Self {
        Self::InvalidSubject(value)
    }
}

impl From<TaskValidationError> for RepoError {
    fn from(value: TaskValidationError) -> Self {
        Self::InvalidTask(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Limits a query to one subject or spans all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubjectScope {
    #[default]
    All,
    Subject(SubjectId),
}

impl SubjectScope {
    pub(crate) fn subject_id(self) -> Option<SubjectId> {
        match self {
            Self::All => None,
            Self::Subject(id) => Some(id),
        }
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn bool_to_int(value: bool) -> i64 {
    i64::from(value)
}

fn int_to_bool(value: i64, column: &str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}
