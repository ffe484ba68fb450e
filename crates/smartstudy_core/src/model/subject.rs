//! Subject domain model.
//!
//! # Invariants
//! - `goal_hours` is stored as the user typed it; numeric meaning is only
//!   enforced by `SubjectDraft::validate`.
//! - `colors` holds ARGB gradient stops, persisted as comma-joined integers.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Auto-incremented SQLite row id of a subject.
pub type SubjectId = i64;

pub const SUBJECT_NAME_MIN_CHARS: usize = 3;
pub const SUBJECT_NAME_MAX_CHARS: usize = 20;
pub const GOAL_HOURS_MIN: f64 = 1.0;
pub const GOAL_HOURS_MAX: f64 = 1000.0;

/// Two-stop card gradients offered to new subjects.
pub const SUBJECT_PALETTE: [[u32; 2]; 5] = [
    [0xFF5E_FCE8, 0xFF73_6EFE],
    [0xFFEA_8D8D, 0xFFA8_9BFF],
    [0xFF8B_C6EC, 0xFF95_99E2],
    [0xFFFF_9A8B, 0xFFFF_99AC],
    [0xFFFB_AB7E, 0xFFF7_CE68],
];

/// A user-defined study topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subject {
    pub id: Option<SubjectId>,
    pub name: String,
    pub goal_hours: String,
    pub colors: Vec<u32>,
}

impl Subject {
    /// Goal hours as a number, when the stored text parses.
    pub fn goal_hours_value(&self) -> Option<f64> {
        self.goal_hours.trim().parse::<f64>().ok()
    }

    /// Lightweight reference used to denormalize the subject name onto
    /// tasks and sessions. `None` until the subject is persisted.
    pub fn subject_ref(&self) -> Option<SubjectRef> {
        self.id.map(|id| SubjectRef {
            id,
            name: self.name.clone(),
        })
    }
}

/// Persisted subject identity plus its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubjectRef {
    pub id: SubjectId,
    pub name: String,
}

/// Picks a gradient from `SUBJECT_PALETTE`. Any seed is accepted.
pub fn palette_for_seed(seed: u64) -> Vec<u32> {
    let index = (seed % SUBJECT_PALETTE.len() as u64) as usize;
    SUBJECT_PALETTE[index].to_vec()
}

/// Encodes colors as a comma-joined list of decimal integers.
pub fn encode_colors(colors: &[u32]) -> String {
    colors
        .iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Decodes a comma-joined color list. Empty input yields an empty list.
pub fn decode_colors(value: &str) -> Result<Vec<u32>, String> {
    if value.trim().is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<u32>()
                .map_err(|_| format!("invalid color value `{part}`"))
        })
        .collect()
}

/// Validation failures for subject create/update input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectValidationError {
    NameBlank,
    NameTooShort,
    NameTooLong,
    GoalHoursBlank,
    GoalHoursInvalid,
    GoalHoursTooLow,
    GoalHoursTooHigh,
}

impl Display for SubjectValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let message = match self {
            Self::NameBlank => "Please enter subject name.",
            Self::NameTooShort => "Subject name is too short.",
            Self::NameTooLong => "Subject name is too long.",
            Self::GoalHoursBlank => "Please enter goal study hours.",
            Self::GoalHoursInvalid => "Invalid number.",
            Self::GoalHoursTooLow => "Please set at least 1 hour.",
            Self::GoalHoursTooHigh => "Please set a maximum of 1000 hours.",
        };
        f.write_str(message)
    }
}

impl Error for SubjectValidationError {}

/// Unvalidated subject form input.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectDraft {
    pub name: String,
    pub goal_hours: String,
    pub colors: Vec<u32>,
}

impl SubjectDraft {
    /// Checks name and goal hours. Name checks run first so the host can
    /// show the first problem per field.
    pub fn validate(&self) -> Result<(), SubjectValidationError> {
        validate_subject_name(&self.name)?;
        validate_goal_hours(&self.goal_hours)?;
        Ok(())
    }

    pub(crate) fn into_subject(self, id: Option<SubjectId>) -> Subject {
        Subject {
            id,
            name: self.name.trim().to_string(),
            goal_hours: self.goal_hours.trim().to_string(),
            colors: self.colors,
        }
    }
}

pub fn validate_subject_name(name: &str) -> Result<(), SubjectValidationError> {
    let trimmed = name.trim();
    let chars = trimmed.chars().count();
    if trimmed.is_empty() {
        Err(SubjectValidationError::NameBlank)
    } else if chars < SUBJECT_NAME_MIN_CHARS {
        Err(SubjectValidationError::NameTooShort)
    } else if chars > SUBJECT_NAME_MAX_CHARS {
        Err(SubjectValidationError::NameTooLong)
    } else {
        Ok(())
    }
}

pub fn validate_goal_hours(goal_hours: &str) -> Result<(), SubjectValidationError> {
    let trimmed = goal_hours.trim();
    if trimmed.is_empty() {
        return Err(SubjectValidationError::GoalHoursBlank);
    }
    let value = trimmed
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or(SubjectValidationError::GoalHoursInvalid)?;
    if value < GOAL_HOURS_MIN {
        Err(SubjectValidationError::GoalHoursTooLow)
    } else if value > GOAL_HOURS_MAX {
        Err(SubjectValidationError::GoalHoursTooHigh)
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str, goal_hours: &str) -> SubjectDraft {
        SubjectDraft {
            name: name.to_string(),
            goal_hours: goal_hours.to_string(),
            colors: palette_for_seed(0),
        }
    }

    #[test]
    fn colors_encode_as_comma_joined_integers() {
        assert_eq!(encode_colors(&[1, 22, 333]), "1,22,333");
        assert_eq!(decode_colors("1,22,333").unwrap(), vec![1, 22, 333]);
        assert!(decode_colors("").unwrap().is_empty());
        assert!(decode_colors("1,blue").is_err());
    }

    #[test]
    fn name_rules_apply_to_trimmed_text() {
        assert_eq!(
            draft("   ", "10").validate(),
            Err(SubjectValidationError::NameBlank)
        );
        assert_eq!(
            draft(" ab ", "10").validate(),
            Err(SubjectValidationError::NameTooShort)
        );
        assert_eq!(
            draft(&"x".repeat(21), "10").validate(),
            Err(SubjectValidationError::NameTooLong)
        );
        assert!(draft("Physics", "10").validate().is_ok());
    }

    #[test]
    fn goal_hours_must_be_a_number_between_one_and_a_thousand() {
        assert_eq!(
            draft("Physics", "").validate(),
            Err(SubjectValidationError::GoalHoursBlank)
        );
        assert_eq!(
            draft("Physics", "ten").validate(),
            Err(SubjectValidationError::GoalHoursInvalid)
        );
        assert_eq!(
            draft("Physics", "0.5").validate(),
            Err(SubjectValidationError::GoalHoursTooLow)
        );
        assert_eq!(
            draft("Physics", "1000.5").validate(),
            Err(SubjectValidationError::GoalHoursTooHigh)
        );
        assert!(draft("Physics", "1000").validate().is_ok());
    }

    #[test]
    fn palette_accepts_any_seed() {
        assert_eq!(palette_for_seed(7), SUBJECT_PALETTE[2].to_vec());
        assert_eq!(palette_for_seed(u64::MAX).len(), 2);
    }
}
