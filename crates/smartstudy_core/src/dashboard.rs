//! Read models for the dashboard and subject-detail screens.
//!
//! Hosts re-load these after a `ChangeFeed` notification touching any table
//! they read.

use crate::model::session::{seconds_to_hours, Session};
use crate::model::subject::{Subject, SubjectId};
use crate::model::task::Task;
use crate::ordering::TaskViews;
use crate::repo::session_repo::{SessionListQuery, SessionRepository, SqliteSessionRepository};
use crate::repo::subject_repo::{SqliteSubjectRepository, SubjectRepository};
use crate::repo::task_repo::{SqliteTaskRepository, TaskRepository};
use crate::repo::{RepoResult, SubjectScope};
use rusqlite::Connection;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub subject_count: u32,
    pub total_goal_hours: f64,
    pub total_studied_hours: f64,
    pub subjects: Vec<Subject>,
    /// Incomplete tasks across all subjects, soonest due first.
    pub upcoming_tasks: Vec<Task>,
    pub recent_sessions: Vec<Session>,
}

impl DashboardSnapshot {
    pub fn load(conn: &Connection) -> RepoResult<Self> {
        let subjects = SqliteSubjectRepository::try_new(conn)?;
        let tasks = SqliteTaskRepository::try_new(conn)?;
        let sessions = SqliteSessionRepository::try_new(conn)?;

        let all_tasks = tasks.list_tasks(SubjectScope::All)?;
        Ok(Self {
            subject_count: subjects.subject_count()?,
            total_goal_hours: subjects.total_goal_hours()?,
            total_studied_hours: seconds_to_hours(sessions.total_duration(SubjectScope::All)?),
            subjects: subjects.list_subjects()?,
            upcoming_tasks: TaskViews::from_tasks(&all_tasks).upcoming,
            recent_sessions: sessions.list_sessions(&SessionListQuery::recent(SubjectScope::All))?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubjectDetail {
    pub subject: Subject,
    pub upcoming_tasks: Vec<Task>,
    pub completed_tasks: Vec<Task>,
    pub recent_sessions: Vec<Session>,
    pub studied_hours: f64,
    /// `studied_hours / goal`, clamped to `0.0..=1.0`.
    pub progress: f64,
}

impl SubjectDetail {
    /// Returns `None` when the subject does not exist.
    pub fn load(conn: &Connection, subject_id: SubjectId) -> RepoResult<Option<Self>> {
        let subjects = SqliteSubjectRepository::try_new(conn)?;
        let Some(subject) = subjects.get_subject(subject_id)? else {
            return Ok(None);
        };

        let scope = SubjectScope::Subject(subject_id);
        let tasks = SqliteTaskRepository::try_new(conn)?.list_tasks(scope)?;
        let sessions = SqliteSessionRepository::try_new(conn)?;
        let studied_hours = seconds_to_hours(sessions.total_duration(scope)?);
        let views = TaskViews::from_tasks(&tasks);

        Ok(Some(Self {
            progress: progress(studied_hours, &subject),
            subject,
            upcoming_tasks: views.upcoming,
            completed_tasks: views.completed,
            recent_sessions: sessions.list_sessions(&SessionListQuery::recent(scope))?,
            studied_hours,
        }))
    }
}

/// Unparsable or non-positive goals count as one hour.
pub fn progress(studied_hours: f64, subject: &Subject) -> f64 {
    let goal = subject
        .goal_hours_value()
        .filter(|goal| *goal > 0.0)
        .unwrap_or(1.0);
    (studied_hours / goal).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::progress;
    use crate::model::subject::Subject;

    fn subject(goal_hours: &str) -> Subject {
        Subject {
            id: Some(1),
            name: "Chemistry".to_string(),
            goal_hours: goal_hours.to_string(),
            colors: Vec::new(),
        }
    }

    #[test]
    fn progress_is_clamped_and_tolerates_bad_goals() {
        assert_eq!(progress(5.0, &subject("10")), 0.5);
        assert_eq!(progress(50.0, &subject("10")), 1.0);
        assert_eq!(progress(0.5, &subject("lots")), 0.5);
        assert_eq!(progress(3.0, &subject("0")), 1.0);
    }
}
