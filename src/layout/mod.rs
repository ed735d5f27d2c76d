//! Solved layouts: placed modules grouped by zone.
//!
//! Values here are written once by the elastic resolver and are read-only
//! afterwards. The winning [`CandidateLayout`] is what downstream exporters
//! consume.

mod assembly;
mod core;

pub(crate) use assembly::enumerate_choices;
pub use core::{CandidateLayout, PlacedModule, ZoneAssignment};
