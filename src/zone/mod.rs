//! Zone planning: style templates and their projection onto wall runs.
//!
//! A template lists zone categories in workflow order. The planner places
//! them onto the free runs of the room's walls, drops optional zones when
//! space runs out, and sizes each zone so the run is covered edge to edge.

mod core;
mod planner;
mod template;

pub use core::{Zone, ZoneId, ZonePlan};
pub use planner::ZonePlanner;
pub use template::{StyleTemplate, ZoneSpec};
