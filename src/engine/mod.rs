//! The solve pipeline.
//!
//! Plan zones, search each zone for module combinations, resolve elastic
//! widths for every assembled candidate, validate and score them, then rank.
//! Zone searches and candidate scoring run on rayon when
//! [`crate::SolverConfig::parallel`] is set. Results do not depend on it.

mod core;

pub use core::{KitchenEngine, SolveReport, SolveWarning, solve};
