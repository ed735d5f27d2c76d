//! Per-solve counters.

use crate::logging::{LogEvent, LogFields, LogLevel};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;

use crate::solver::ZoneSearch;

#[derive(Debug, Default, Clone)]
pub struct SolveMetrics {
    zones_planned: u64,
    combinations_explored: u64,
    sequences_pruned: u64,
    combinations_feasible: u64,
    searches_truncated: u64,
    candidates_assembled: u64,
    candidates_feasible: u64,
    candidates_deduplicated: u64,
}

impl SolveMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_plan(&mut self, zones: usize) {
        self.zones_planned = self.zones_planned.saturating_add(zones as u64);
    }

    pub fn record_search(&mut self, search: &ZoneSearch) {
        self.combinations_explored = self
            .combinations_explored
            .saturating_add(search.explored as u64);
        self.sequences_pruned = self.sequences_pruned.saturating_add(search.pruned as u64);
        self.combinations_feasible = self
            .combinations_feasible
            .saturating_add(search.feasible as u64);
        if search.truncated {
            self.searches_truncated = self.searches_truncated.saturating_add(1);
        }
    }

    pub fn record_assembly(&mut self, assembled: usize, duplicates: usize) {
        self.candidates_assembled = self.candidates_assembled.saturating_add(assembled as u64);
        self.candidates_deduplicated = self
            .candidates_deduplicated
            .saturating_add(duplicates as u64);
    }

    pub fn record_feasible(&mut self, count: usize) {
        self.candidates_feasible = self.candidates_feasible.saturating_add(count as u64);
    }

    pub fn snapshot(&self, elapsed: Duration) -> MetricSnapshot {
        MetricSnapshot {
            elapsed_ms: elapsed.as_millis() as u64,
            zones_planned: self.zones_planned,
            combinations_explored: self.combinations_explored,
            sequences_pruned: self.sequences_pruned,
            combinations_feasible: self.combinations_feasible,
            searches_truncated: self.searches_truncated,
            candidates_assembled: self.candidates_assembled,
            candidates_feasible: self.candidates_feasible,
            candidates_deduplicated: self.candidates_deduplicated,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSnapshot {
    pub elapsed_ms: u64,
    pub zones_planned: u64,
    pub combinations_explored: u64,
    pub sequences_pruned: u64,
    pub combinations_feasible: u64,
    pub searches_truncated: u64,
    pub candidates_assembled: u64,
    pub candidates_feasible: u64,
    pub candidates_deduplicated: u64,
}

impl MetricSnapshot {
    pub fn to_log_event(&self, target: &str) -> LogEvent {
        LogEvent::with_fields(LogLevel::Info, target, "solve_metrics", self.as_fields())
    }

    pub fn as_fields(&self) -> LogFields {
        let mut map = LogFields::new();
        map.insert("elapsed_ms".to_string(), json!(self.elapsed_ms));
        map.insert("zones_planned".to_string(), json!(self.zones_planned));
        map.insert(
            "combinations_explored".to_string(),
            json!(self.combinations_explored),
        );
        map.insert("sequences_pruned".to_string(), json!(self.sequences_pruned));
        map.insert(
            "combinations_feasible".to_string(),
            json!(self.combinations_feasible),
        );
        map.insert(
            "searches_truncated".to_string(),
            json!(self.searches_truncated),
        );
        map.insert(
            "candidates_assembled".to_string(),
            json!(self.candidates_assembled),
        );
        map.insert(
            "candidates_feasible".to_string(),
            json!(self.candidates_feasible),
        );
        map.insert(
            "candidates_deduplicated".to_string(),
            json!(self.candidates_deduplicated),
        );
        map
    }
}
