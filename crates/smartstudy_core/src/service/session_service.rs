//! Session use-case service.
//!
//! # Invariants
//! - Durations under `MIN_SESSION_SECS` are rejected before any write and
//!   are reported as an outcome, not an error.
//! - A saved session is stamped with the caller-provided `now_ms`.

use crate::clock::now_epoch_ms;
use crate::message::{ToUserMessage, UserMessage};
use crate::model::session::{is_storable_duration, seconds_to_hours, Session, SessionId};
use crate::model::subject::SubjectRef;
use crate::observe::{ChangeFeed, Table};
use crate::repo::session_repo::{SessionListQuery, SessionRepository};
use crate::repo::{Entity, RepoError, RepoResult, SubjectScope};
use crate::timer::{TimerError, TimerHandle};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SESSION_TOO_SHORT_MESSAGE: &str = "Single session can not be less than 36 seconds";
pub const SESSION_SAVED_MESSAGE: &str = "Session saved successfully";
pub const SESSION_DELETED_MESSAGE: &str = "Session deleted successfully";

#[derive(Debug)]
pub enum SessionServiceError {
    /// No subject is bound to the session being saved.
    SubjectRequired,
    SessionNotFound(SessionId),
    Timer(TimerError),
    /// Storing a finished run failed. `duration_secs` is the unsaved run, so
    /// the host can retry with `save_session`.
    SaveFailed {
        duration_secs: i64,
        source: RepoError,
    },
    DeleteFailed(RepoError),
}

impl SessionServiceError {
    /// "Couldn't <action>" wording for the use case that failed.
    pub fn action(&self) -> &'static str {
        match self {
            Self::SubjectRequired | Self::Timer(_) | Self::SaveFailed { .. } => "save session",
            Self::SessionNotFound(_) | Self::DeleteFailed(_) => "delete session",
        }
    }
}

impl Display for SessionServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SubjectRequired => write!(f, "Please select subject related to the session."),
            Self::SessionNotFound(id) => write!(f, "Session not found: {id}"),
            Self::Timer(err) => write!(f, "{err}"),
            Self::SaveFailed { source, .. } => write!(f, "{source}"),
            Self::DeleteFailed(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Timer(err) => Some(err),
            Self::SaveFailed { source, .. } => Some(source),
            Self::DeleteFailed(err) => Some(err),
            Self::SubjectRequired | Self::SessionNotFound(_) => None,
        }
    }
}

impl From<TimerError> for SessionServiceError {
    fn from(value: TimerError) -> Self {
        Self::Timer(value)
    }
}

impl ToUserMessage for SessionServiceError {
    fn to_user_message(&self) -> UserMessage {
        match self {
            Self::SubjectRequired => UserMessage::short(self.to_string()),
            _ => UserMessage::failure(self.action(), self),
        }
    }
}

/// Result of trying to store a finished session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveSessionOutcome {
    Saved(Session),
    /// Too short to keep; nothing was written.
    Rejected { duration_secs: i64 },
}

impl SaveSessionOutcome {
    pub fn message(&self) -> UserMessage {
        match self {
            Self::Saved(_) => UserMessage::short(SESSION_SAVED_MESSAGE),
            Self::Rejected { .. } => UserMessage::short(SESSION_TOO_SHORT_MESSAGE),
        }
    }

    pub fn saved(&self) -> Option<&Session> {
        match self {
            Self::Saved(session) => Some(session),
            Self::Rejected { .. } => None,
        }
    }
}

/// Use-case service over a session repository.
pub struct SessionService<R: SessionRepository> {
    repo: R,
    feed: Option<ChangeFeed>,
}

impl<R: SessionRepository> SessionService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, feed: None }
    }

    /// Publishes `Table::Sessions` on the feed after each write.
    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Stores a finished session, or rejects it when it is too short.
    pub fn save_session(
        &self,
        subject: Option<&SubjectRef>,
        duration_secs: i64,
        now_ms: i64,
    ) -> Result<SaveSessionOutcome, SessionServiceError> {
        if !is_storable_duration(duration_secs) {
            info!(
                "event=session_save module=service status=rejected duration_secs={duration_secs}"
            );
            return Ok(SaveSessionOutcome::Rejected { duration_secs });
        }
        let subject = subject.ok_or(SessionServiceError::SubjectRequired)?;

        let mut session = Session::new(subject, now_ms, duration_secs);
        match self.repo.insert_session(&session) {
            Ok(id) => {
                session.id = Some(id);
                info!(
                    "event=session_save module=service status=ok session_id={id} subject_id={} duration_secs={duration_secs}",
                    subject.id
                );
                self.notify();
                Ok(SaveSessionOutcome::Saved(session))
            }
            Err(err) => {
                error!(
                    "event=session_save module=service status=error subject_id={} error={err}",
                    subject.id
                );
                Err(SessionServiceError::SaveFailed {
                    duration_secs,
                    source: err,
                })
            }
        }
    }

    /// Finishes the running timer and stores its elapsed time.
    ///
    /// The subject is checked first so a missing binding leaves the timer
    /// running instead of discarding the run. The timer is already reset
    /// when the insert runs; a failed insert returns the elapsed seconds in
    /// `SaveFailed`.
    pub fn finish_timer(
        &self,
        timer: &TimerHandle,
        subject: Option<&SubjectRef>,
    ) -> Result<SaveSessionOutcome, SessionServiceError> {
        if subject.is_none() {
            return Err(SessionServiceError::SubjectRequired);
        }
        let elapsed = timer.finish()?;
        let duration_secs = i64::try_from(elapsed).unwrap_or(i64::MAX);
        self.save_session(subject, duration_secs, now_epoch_ms())
    }

    pub fn delete_session(&self, id: SessionId) -> Result<UserMessage, SessionServiceError> {
        self.repo.delete_session(id).map_err(|err| match err {
            RepoError::NotFound {
                entity: Entity::Session,
                id,
            } => SessionServiceError::SessionNotFound(id),
            other => SessionServiceError::DeleteFailed(other),
        })?;
        self.notify();
        Ok(UserMessage::short(SESSION_DELETED_MESSAGE))
    }

    /// Five most recent sessions, newest first.
    pub fn recent_sessions(&self, scope: SubjectScope) -> RepoResult<Vec<Session>> {
        self.repo.list_sessions(&SessionListQuery::recent(scope))
    }

    pub fn all_sessions(&self, scope: SubjectScope) -> RepoResult<Vec<Session>> {
        self.repo.list_sessions(&SessionListQuery { scope, limit: None })
    }

    pub fn total_duration(&self, scope: SubjectScope) -> RepoResult<i64> {
        self.repo.total_duration(scope)
    }

    pub fn studied_hours(&self, scope: SubjectScope) -> RepoResult<f64> {
        self.total_duration(scope).map(seconds_to_hours)
    }

    fn notify(&self) {
        if let Some(feed) = &self.feed {
            feed.publish(Table::Sessions);
        }
    }
}
