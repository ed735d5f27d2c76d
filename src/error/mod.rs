//! Error taxonomy for the layout engine.
//!
//! Every fallible engine operation returns [`Result`]; zone-level and
//! run-level failures propagate unchanged to the caller of `solve`.

mod types;

pub use types::{LayoutError, Result};
