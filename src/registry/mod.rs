//! Fingerprint-keyed store of assembled candidates.

mod core;

pub use core::{CandidateRegistry, RegisteredCandidate};
