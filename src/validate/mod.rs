//! Post-resolution checks on a finished layout.
//!
//! The solver and resolver are built to never produce a layout with gaps,
//! overlaps or out-of-range widths; this module verifies that independently
//! before a candidate is allowed into ranking. Any [`Severity::Critical`]
//! issue makes the candidate infeasible.

mod core;

pub use core::{IssueKind, Severity, ValidationIssue, has_critical, validate_layout};
