//! Workflow simulation ("ghost chef").
//!
//! Replays canonical cooking tasks over a solved layout and turns the
//! travel between stations into an ergonomic score from 0 to 100.

mod core;

pub use core::{
    DistanceMetric, GhostChef, TaskOutcome, TaskSequence, WorkflowConfig, WorkflowReport,
};
