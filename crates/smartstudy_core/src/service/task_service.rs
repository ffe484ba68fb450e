//! Task use-case service.

use crate::message::{ToUserMessage, UserMessage};
use crate::model::task::{Task, TaskDraft, TaskId, TaskValidationError};
use crate::observe::{ChangeFeed, Table};
use crate::ordering::{completed_tasks, upcoming_tasks, TaskViews};
use crate::repo::task_repo::TaskRepository;
use crate::repo::{Entity, RepoError, RepoResult, SubjectScope};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const TASK_SAVED_MESSAGE: &str = "Task saved successfully";
pub const TASK_DELETED_MESSAGE: &str = "Task deleted";

/// Use case a task failure belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskAction {
    Add,
    Update,
    Delete,
}

impl TaskAction {
    pub fn label(self) -> &'static str {
        match self {
            Self::Add => "add task",
            Self::Update => "update task",
            Self::Delete => "delete task",
        }
    }
}

#[derive(Debug)]
pub enum TaskServiceError {
    Invalid(TaskValidationError),
    TaskNotFound {
        action: TaskAction,
        id: TaskId,
    },
    Repo {
        action: TaskAction,
        source: RepoError,
    },
    InconsistentState {
        action: TaskAction,
        details: &'static str,
    },
}

impl TaskServiceError {
    fn from_repo(action: TaskAction, err: RepoError) -> Self {
        match err {
            RepoError::InvalidTask(err) => Self::Invalid(err),
            RepoError::NotFound {
                entity: Entity::Task,
                id,
            } => Self::TaskNotFound { action, id },
            source => Self::Repo { action, source },
        }
    }

    /// `None` for validation errors, which are shown inline.
    pub fn action(&self) -> Option<TaskAction> {
        match self {
            Self::Invalid(_) => None,
            Self::TaskNotFound { action, .. }
            | Self::Repo { action, .. }
            | Self::InconsistentState { action, .. } => Some(*action),
        }
    }
}

impl Display for TaskServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::TaskNotFound { id, .. } => write!(f, "Task not found: {id}"),
            Self::Repo { source, .. } => write!(f, "{source}"),
            Self::InconsistentState { details, .. } => {
                write!(f, "inconsistent task state: {details}")
            }
        }
    }
}

impl Error for TaskServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Repo { source, .. } => Some(source),
            Self::TaskNotFound { .. } | Self::InconsistentState { .. } => None,
        }
    }
}

impl From<TaskValidationError> for TaskServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl ToUserMessage for TaskServiceError {
    fn to_user_message(&self) -> UserMessage {
        match self.action() {
            None => UserMessage::short(self.to_string()),
            Some(action) => UserMessage::failure(action.label(), self),
        }
    }
}

/// Message shown after flipping a task's completion flag.
pub fn completion_message(task: &Task) -> UserMessage {
    if task.is_completed {
        UserMessage::short("Saved in completed tasks")
    } else {
        UserMessage::short("Saved in incomplete tasks")
    }
}

pub struct TaskService<R: TaskRepository> {
    repo: R,
    feed: Option<ChangeFeed>,
}

impl<R: TaskRepository> TaskService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo, feed: None }
    }

    pub fn with_feed(mut self, feed: ChangeFeed) -> Self {
        self.feed = Some(feed);
        self
    }

    /// Creates (`draft.id == None`) or replaces a task.
    pub fn save_task(&self, draft: TaskDraft, now_ms: i64) -> Result<Task, TaskServiceError> {
        let action = if draft.id.is_some() {
            TaskAction::Update
        } else {
            TaskAction::Add
        };
        let task = draft.into_task(now_ms)?;
        let repo_err = |err: RepoError| TaskServiceError::from_repo(action, err);
        let id = self.repo.upsert_task(&task).map_err(repo_err)?;
        let saved = self
            .repo
            .get_task(id)
            .map_err(repo_err)?
            .ok_or(TaskServiceError::InconsistentState {
                action,
                details: "saved task not found in read-back",
            })?;
        self.notify();
        Ok(saved)
    }

    /// Flips `is_completed` and returns the stored task.
    pub fn toggle_completion(&self, id: TaskId) -> Result<Task, TaskServiceError> {
        let repo_err = |err: RepoError| TaskServiceError::from_repo(TaskAction::Update, err);
        let mut task = self
            .repo
            .get_task(id)
            .map_err(repo_err)?
            .ok_or(TaskServiceError::TaskNotFound {
                action: TaskAction::Update,
                id,
            })?;
        task.is_completed = !task.is_completed;
        self.repo.upsert_task(&task).map_err(repo_err)?;
        self.notify();
        Ok(task)
    }

    pub fn delete_task(&self, id: TaskId) -> Result<UserMessage, TaskServiceError> {
        self.repo
            .delete_task(id)
            .map_err(|err| TaskServiceError::from_repo(TaskAction::Delete, err))?;
        self.notify();
        Ok(UserMessage::short(TASK_DELETED_MESSAGE))
    }

    pub fn get_task(&self, id: TaskId) -> RepoResult<Option<Task>> {
        self.repo.get_task(id)
    }

    pub fn upcoming_tasks(&self, scope: SubjectScope) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(scope).map(|tasks| upcoming_tasks(&tasks))
    }

    pub fn completed_tasks(&self, scope: SubjectScope) -> RepoResult<Vec<Task>> {
        self.repo.list_tasks(scope).map(|tasks| completed_tasks(&tasks))
    }

    pub fn task_views(&self, scope: SubjectScope) -> RepoResult<TaskViews> {
        self.repo
            .list_tasks(scope)
            .map(|tasks| TaskViews::from_tasks(&tasks))
    }

    fn notify(&self) {
        if let Some(feed) = &self.feed {
            feed.publish(Table::Tasks);
        }
    }
}
