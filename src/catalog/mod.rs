//! Read-only registry of cabinet module types.
//!
//! The catalog is built once per run and shared by reference with every
//! concurrent zone search; nothing in it is mutated after construction.

mod adjacency;
mod core;

pub use adjacency::{
    AdjacencyKind, AdjacencyRule, Side, can_follow, fits_between, sequence_satisfies,
};
pub use core::{Category, ModuleCatalog, ModuleId, ModuleType};
