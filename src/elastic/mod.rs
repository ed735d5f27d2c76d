//! Elastic width resolution.
//!
//! Turns a solver combination into exact module widths and positions by
//! spreading zone slack over the elastic modules (water-filling), and exposes
//! the same distribution primitive to the zone planner.

mod core;

pub(crate) use core::{Segment, water_fill};
pub use core::ElasticResolver;
