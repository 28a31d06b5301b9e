//! Decision and workflow engine for a university co-op program portal.
//!
//! The crate tracks student applications to employer-posted positions,
//! derives co-op eligibility from objective criteria, and drives submitted
//! work summaries through a department-scoped grading workflow.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
