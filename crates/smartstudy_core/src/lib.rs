//! Core domain logic for the SmartStudy tracker.
//! This crate is the single source of truth for study-tracking invariants.

pub mod clock;
pub mod config;
pub mod dashboard;
pub mod db;
pub mod logging;
pub mod message;
pub mod model;
pub mod observe;
pub mod ordering;
pub mod repo;
pub mod service;
pub mod timer;

pub use config::{ConfigError, CoreConfig};
pub use dashboard::{DashboardSnapshot, SubjectDetail};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use message::{MessageDuration, ToUserMessage, UserMessage};
pub use model::session::{Session, SessionId, MIN_SESSION_SECS};
pub use model::subject::{Subject, SubjectDraft, SubjectId, SubjectRef, SubjectValidationError};
pub use model::task::{Priority, Task, TaskDraft, TaskId, TaskValidationError};
pub use observe::{ChangeFeed, Subscription, Table, TableChange};
pub use ordering::{completed_tasks, upcoming_tasks, TaskViews};
pub use repo::session_repo::{SessionListQuery, SessionRepository, SqliteSessionRepository};
pub use repo::subject_repo::{CascadeReport, SqliteSubjectRepository, SubjectRepository};
pub use repo::task_repo::{SqliteTaskRepository, TaskRepository};
pub use repo::{Entity, RepoError, RepoResult, SubjectScope};
pub use service::session_service::{SaveSessionOutcome, SessionService, SessionServiceError};
pub use service::subject_service::{SubjectAction, SubjectService, SubjectServiceError};
pub use service::task_service::{TaskAction, TaskService, TaskServiceError};
pub use timer::{
    format_hms, StudyTimer, TimerError, TimerHandle, TimerService, TimerSnapshot, TimerState,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
