//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Turn outcomes and failures into user-facing messages.
//! - Publish table changes after successful writes.

pub mod session_service;
pub mod subject_service;
pub mod task_service;
