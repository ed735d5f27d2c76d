//! Elastic zone layout engine for kitchen wall runs.
//!
//! Given a measured room, a catalog of cabinet modules and a style template,
//! the engine partitions each wall into category zones, searches the catalog
//! for module sequences that fit each zone, stretches elastic modules so
//! every zone closes exactly, and ranks the resulting whole-room candidates
//! by workflow ergonomics, visual style and simplicity.
//!
//! The core is synchronous and performs no I/O. [`solve`] is the one-call
//! entry point; [`KitchenEngine`] exposes configuration, structured logging
//! and the full [`SolveReport`].

pub mod catalog;
pub mod config;
pub mod elastic;
pub mod engine;
pub mod error;
pub mod geometry;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod registry;
pub mod selector;
pub mod solver;
pub mod storage;
pub mod style;
pub mod validate;
pub mod workflow;
pub mod zone;

pub use catalog::{
    AdjacencyKind, AdjacencyRule, Category, ModuleCatalog, ModuleId, ModuleType, Side,
};
pub use config::EngineConfig;
pub use elastic::ElasticResolver;
pub use engine::{KitchenEngine, SolveReport, SolveWarning, solve};
pub use error::{LayoutError, Result};
pub use geometry::{Heading, Interval, Opening, OpeningKind, Point, Room, Wall, WallId};
pub use layout::{CandidateLayout, PlacedModule, ZoneAssignment};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, SolveMetrics};
pub use registry::CandidateRegistry;
pub use selector::{
    LayoutScorer, LayoutSelector, RankedLayout, RankingMode, ScoreReport, ScoringWeights,
};
pub use solver::{AssignmentSolver, SolverConfig, ZoneCombination, ZoneSearch};
pub use storage::{StorageReport, StorageStatus};
pub use style::{StyleConfig, StyleCritic, StyleReport};
pub use validate::{IssueKind, Severity, ValidationIssue};
pub use workflow::{DistanceMetric, GhostChef, TaskSequence, WorkflowConfig, WorkflowReport};
pub use zone::{StyleTemplate, Zone, ZoneId, ZonePlan, ZonePlanner, ZoneSpec};
