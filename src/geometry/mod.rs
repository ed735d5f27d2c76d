//! Room geometry consumed by the engine.
//!
//! Rooms arrive already measured: walls with lengths, blocked spans and a
//! placement in the floor plane. This module only validates them and derives
//! the free runs the zone planner works with.

mod core;

pub use core::{Heading, Interval, Opening, OpeningKind, Point, Room, Wall, WallId};
