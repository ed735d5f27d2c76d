//! Style critic: visual rhythm and seam alignment.

mod core;

pub use core::{StyleConfig, StyleCritic, StyleReport};
