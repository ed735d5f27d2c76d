//! Storage index: linear metres of cabinetry against what the floor area
//! calls for. Informational only; it never changes ranking.

mod core;

pub use core::{StorageReport, StorageStatus, storage_report};
