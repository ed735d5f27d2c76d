//! Constraint assignment: which modules fill each zone, and in what order.
//!
//! Each zone is searched independently (and in parallel when enabled) by a
//! depth-first branch-and-bound over ordered module sequences. The search
//! keeps the best few combinations per zone under a total order so results
//! never depend on scheduling.

mod core;

pub use core::{AssignmentSolver, SolverConfig, ZoneCombination, ZoneSearch};
