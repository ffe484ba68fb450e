//! Study session domain model.

use crate::model::subject::{SubjectId, SubjectRef};
use serde::{Deserialize, Serialize};

pub type SessionId = i64;

/// Sessions shorter than this are discarded instead of stored.
pub const MIN_SESSION_SECS: i64 = 36;

/// A completed, timed study interval.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub id: Option<SessionId>,
    pub subject_id: SubjectId,
    pub subject_name: String,
    /// Unix epoch milliseconds at which the session was saved.
    pub date: i64,
    pub duration_secs: i64,
}

impl Session {
    pub fn new(subject: &SubjectRef, date: i64, duration_secs: i64) -> Self {
        Self {
            id: None,
            subject_id: subject.id,
            subject_name: subject.name.clone(),
            date,
            duration_secs,
        }
    }

    pub fn meets_minimum(&self) -> bool {
        is_storable_duration(self.duration_secs)
    }
}

pub fn is_storable_duration(duration_secs: i64) -> bool {
    duration_secs >= MIN_SESSION_SECS
}

/// Converts seconds to hours rounded to two decimals.
pub fn seconds_to_hours(duration_secs: i64) -> f64 {
    let hours = duration_secs as f64 / 3600.0;
    (hours * 100.0).round() / 100.0
}
