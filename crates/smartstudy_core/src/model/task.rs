//! Task domain model.
//!
//! # Invariants
//! - Persisted priority is `0|1|2`; unknown persisted values read back as
//!   `Priority::Medium`.
//! - `subject_name` is a denormalized copy taken when the task is saved.

use crate::model::subject::{SubjectId, SubjectRef};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type TaskId = i64;

pub const TASK_TITLE_MIN_CHARS: usize = 4;
pub const TASK_TITLE_MAX_CHARS: usize = 30;

/// Ordinal task importance. Higher priorities sort first among tasks due at
/// the same time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub const ALL: [Priority; 3] = [Priority::Low, Priority::Medium, Priority::High];

    /// Integer stored in `tasks.priority`.
    pub fn value(self) -> i64 {
        match self {
            Self::Low => 0,
            Self::Medium => 1,
            Self::High => 2,
        }
    }

    /// Maps a stored integer back to a priority. Unknown values fall back to
    /// `Medium`.
    pub fn from_i64(value: i64) -> Self {
        Self::ALL
            .into_iter()
            .find(|priority| priority.value() == value)
            .unwrap_or(Self::Medium)
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        }
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

/// A to-do item owned by one subject.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: Option<TaskId>,
    pub subject_id: SubjectId,
    pub title: String,
    pub description: String,
    pub subject_name: String,
    pub priority: Priority,
    /// Unix epoch milliseconds.
    pub due_date: i64,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskValidationError {
    TitleBlank,
    TitleTooShort,
    TitleTooLong,
    SubjectRequired,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::TitleBlank => "Please enter a title to the task.",
            Self::TitleTooShort => "Task title is too short.",
            Self::TitleTooLong => "Task title is too long.",
            Self::SubjectRequired => "Please select subject related to this task.",
        };
        f.write_str(message)
    }
}

impl Error for TaskValidationError {}

/// Unvalidated task form input. `id = Some(_)` edits an existing task.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TaskDraft {
    pub id: Option<TaskId>,
    pub subject: Option<SubjectRef>,
    pub title: String,
    pub description: String,
    pub priority: Priority,
    /// Defaults to the save time when absent.
    pub due_date: Option<i64>,
    pub is_completed: bool,
}

impl TaskDraft {
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        validate_task_title(&self.title)?;
        if self.subject.is_none() {
            return Err(TaskValidationError::SubjectRequired);
        }
        Ok(())
    }

    /// Validates and converts into a storable task.
    pub fn into_task(self, now_ms: i64) -> Result<Task, TaskValidationError> {
        self.validate()?;
        let subject = self.subject.ok_or(TaskValidationError::SubjectRequired)?;
        Ok(Task {
            id: self.id,
            subject_id: subject.id,
            title: self.title.trim().to_string(),
            description: self.description,
            subject_name: subject.name,
            priority: self.priority,
            due_date: self.due_date.unwrap_or(now_ms),
            is_completed: self.is_completed,
        })
    }
}

pub fn validate_task_title(title: &str) -> Result<(), TaskValidationError> {
    let trimmed = title.trim();
    let chars = trimmed.chars().count();
    if trimmed.is_empty() {
        Err(TaskValidationError::TitleBlank)
    } else if chars < TASK_TITLE_MIN_CHARS {
        Err(TaskValidationError::TitleTooShort)
    } else if chars > TASK_TITLE_MAX_CHARS {
        Err(TaskValidationError::TitleTooLong)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn physics() -> SubjectRef {
        SubjectRef {
            id: 3,
            name: "Physics".to_string(),
        }
    }

    #[test]
    fn unknown_priority_values_default_to_medium() {
        assert_eq!(Priority::from_i64(0), Priority::Low);
        assert_eq!(Priority::from_i64(2), Priority::High);
        assert_eq!(Priority::from_i64(7), Priority::Medium);
        assert_eq!(Priority::from_i64(-1), Priority::Medium);
    }

    #[test]
    fn draft_requires_title_then_subject() {
        let mut draft = TaskDraft {
            title: "abc".to_string(),
            ..TaskDraft::default()
        };
        assert_eq!(draft.validate(), Err(TaskValidationError::TitleTooShort));

        draft.title = "Read chapter 4".to_string();
        assert_eq!(draft.validate(), Err(TaskValidationError::SubjectRequired));

        draft.title = "y".repeat(31);
        assert_eq!(draft.validate(), Err(TaskValidationError::TitleTooLong));
    }

    #[test]
    fn into_task_denormalizes_subject_and_defaults_due_date() {
        let draft = TaskDraft {
            subject: Some(physics()),
            title: "  Solve problem set ".to_string(),
            priority: Priority::High,
            ..TaskDraft::default()
        };
        let task = draft.into_task(1_700_000_000_000).unwrap();
        assert_eq!(task.subject_id, 3);
        assert_eq!(task.subject_name, "Physics");
        assert_eq!(task.title, "Solve problem set");
        assert_eq!(task.due_date, 1_700_000_000_000);
        assert!(task.id.is_none());
    }
}
