//! Domain model for subjects, tasks and study sessions.
//!
//! # Responsibility
//! - Define canonical records used by repositories and services.
//! - Own field-level validation rules shared by every write path.
//!
//! # Invariants
//! - Ids are assigned by SQLite on first persistence; `None` means the
//!   record has never been stored.
//! - `Subject` is the aggregate root for its tasks and sessions.

pub mod session;
pub mod subject;
pub mod task;
