//! Subject use-case service.
//!
//! # Invariants
//! - Drafts are validated before reaching the repository; validation errors
//!   come back as values for inline display.
//! - Deleting a subject always removes its tasks and sessions with it.

use crate::message::{ToUserMessage, UserMessage};
use crate::model::subject::{
    palette_for_seed, Subject, SubjectDraft, SubjectId, SubjectValidationError,
};
use crate::observe::{ChangeFeed, Table};
use crate::repo::subject_repo::{CascadeReport, SubjectRepository};
use crate::repo::{Entity, RepoError, RepoResult};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const SUBJECT_SAVED_MESSAGE: &str = "Subject saved successfully";
pub const SUBJECT_UPDATED_MESSAGE: &str = "Subject updated";
pub const SUBJECT_DELETED_MESSAGE: &str = "Subject deleted";

/// Use case a subject failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectAction {
    Create,
    Update,
    Delete,
}

impl SubjectAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Create => "save subject",
            Self::Update => "update subject",
            Self::Delete => "delete subject",
        }
    }
}

#[derive(Debug)]
pub enum SubjectServiceError {
    Invalid(SubjectValidationError),
    SubjectNotFound {
        action: SubjectAction,
        id: SubjectId,
    },
    Repo {
        action: SubjectAction,
        source: RepoError,
    },
    /// Write succeeded but the read-back did not find the row.
    InconsistentState {
        action: SubjectAction,
        details: &'static str,
    },
}

impl SubjectServiceError {
    fn from_repo(action: SubjectAction, err: RepoError) -> Self {
        match err {
            RepoError::InvalidSubject(err) => Self::Invalid(err),
            RepoError::NotFound {
                entity: Entity::Subject,
                id,
            } => Self::SubjectNotFound { action, id },
            source => Self::Repo { action, source },
        }
    }

    /// `None` for validation errors, which are shown inline.
    pub fn action(&self) -> Option<SubjectAction> {
        match self {
            Self::Invalid(_) => None,
            Self::SubjectNotFound { action, .. }
            | Self::Repo { action, .. }
            | Self::InconsistentState { action, .. } => Some(*action),
        }
    }
}

impl Display for SubjectServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::SubjectNotFound { id, .. } => write!(f, "Subject not found: {id}"),
            Self::Repo { source, .. } => write!(f, "{source}"),
            Self::InconsistentState { details, .. } => {
                write!(f, "inconsistent subject state: {details}")
            }
        }
    }
}

impl Error for SubjectServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo { source, .. } => Some(source),
            Self::SubjectNotFound { .. } | Self::InconsistentState { .. } => None,
        }
    }
}

impl From<SubjectValidationError> for SubjectServiceError {
    fn from(value: SubjectValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl ToUserMessage for SubjectServiceError {
    fn to_user_message(&self) -> UserMessage {
        match self.action() {
            None => UserMessage::short(self.to_string()),
            Some(action) => UserMessage::failure(action.label(), self),
        }
    }
}

pub struct SubjectService<R: SubjectRepository> {
    repo: R,
    feed: Option<ChangeFeed>,
}

impl<R: SubjectRepository> SubjectService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, feed: None }
    }

    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    pub fn create_subject(&self, draft: SubjectDraft) -> Result<Subject, SubjectServiceError> {
        draft.validate()?;
        let subject = self.store(SubjectAction::Create, draft.into_subject(None))?;
        self.notify(&[Table::Subjects]);
        Ok(subject)
    }

    /// Full replacement of name, goal and colors for an existing subject.
    ///
    /// Tasks and sessions keep the subject name they were saved with.
    pub fn update_subject(
        &self,
        id: SubjectId,
        draft: SubjectDraft,
    ) -> Result<Subject, SubjectServiceError> {
        draft.validate()?;
        let subject = self.store(SubjectAction::Update, draft.into_subject(Some(id)))?;
        self.notify(&[Table::Subjects]);
        Ok(subject)
    }

    pub fn delete_subject(&self, id: SubjectId) -> Result<CascadeReport, SubjectServiceError> {
        let report = self
            .repo
            .delete_subject_cascade(id)
            .map_err(|err| SubjectServiceError::from_repo(SubjectAction::Delete, err))?;
        self.notify(&[Table::Tasks, Table::Sessions, Table::Subjects]);
        Ok(report)
    }

    pub fn get_subject(&self, id: SubjectId) -> RepoResult<Option<Subject>> {
        self.repo.get_subject(id)
    }

    pub fn list_subjects(&self) -> RepoResult<Vec<Subject>> {
        self.repo.list_subjects()
    }

    pub fn subject_count(&self) -> RepoResult<u32> {
        self.repo.subject_count()
    }

    pub fn total_goal_hours(&self) -> RepoResult<f64> {
        self.repo.total_goal_hours()
    }

    /// Gradient for the next new-subject form.
    pub fn next_palette(&self, seed: u64) -> Vec<u32> {
        palette_for_seed(seed)
    }

    /// Upserts, then reads the row back.
    fn store(
        &self,
        action: SubjectAction,
        subject: Subject,
    ) -> Result<Subject, SubjectServiceError> {
        let repo_err = |err: RepoError| SubjectServiceError::from_repo(action, err);
        let id = self.repo.upsert_subject(&subject).map_err(repo_err)?;
        self.repo
            .get_subject(id)
            .map_err(repo_err)?
            .ok_or(SubjectServiceError::InconsistentState {
                action,
                details: "saved subject not found in read-back",
            })
    }

    fn notify(&self, tables: &[Table]) {
        if let Some(feed) = &self.feed {
            for table in tables {
                feed.publish(*table);
            }
        }
    }
}
