use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::catalog::{Category, ModuleCatalog};
use crate::config::EngineConfig;
use crate::elastic::ElasticResolver;
use crate::error::{LayoutError, Result};
use crate::geometry::Room;
use crate::layout::{CandidateLayout, enumerate_choices};
use crate::logging::{
    LogLevel, Logger, TARGET_ENGINE, TARGET_METRICS, TARGET_PLAN, TARGET_SEARCH, event_with_fields,
    json_kv, json_str,
};
use crate::metrics::{MetricSnapshot, SolveMetrics};
use crate::registry::CandidateRegistry;
use crate::selector::{LayoutScorer, LayoutSelector, RankedLayout, ScoreReport, ScoringWeights};
use crate::solver::{AssignmentSolver, ZoneSearch};
use crate::storage::{StorageReport, storage_report};
use crate::zone::{StyleTemplate, ZonePlan, ZonePlanner};

/// Conditions worth surfacing that do not fail the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SolveWarning {
    /// The combination cap stopped a zone search early.
    SearchTruncated { zone: String, explored: usize },
    /// An optional template zone did not fit.
    OptionalZoneDropped { zone: String },
    /// A free wall run received no zone.
    UnusedRun { wall: String, start: f64, end: f64 },
    /// A fallback category stood in for the zone's primary one.
    CategorySubstituted {
        zone: String,
        primary: Category,
        substitute: Category,
    },
    /// The winning layout falls short of the storage target.
    StorageDeficit { deficit_m: f64 },
}

impl SolveWarning {
    fn message(&self) -> &'static str {
        match self {
            SolveWarning::SearchTruncated { .. } => "search_truncated",
            SolveWarning::OptionalZoneDropped { .. } => "optional_zone_dropped",
            SolveWarning::UnusedRun { .. } => "unused_run",
            SolveWarning::CategorySubstituted { .. } => "category_substituted",
            SolveWarning::StorageDeficit { .. } => "storage_deficit",
        }
    }

    fn target(&self) -> &'static str {
        match self {
            SolveWarning::SearchTruncated { .. } | SolveWarning::CategorySubstituted { .. } => {
                TARGET_SEARCH
            }
            SolveWarning::OptionalZoneDropped { .. } | SolveWarning::UnusedRun { .. } => {
                TARGET_PLAN
            }
            SolveWarning::StorageDeficit { .. } => TARGET_ENGINE,
        }
    }

    fn fields(&self) -> Vec<(String, Value)> {
        match serde_json::to_value(self) {
            Ok(Value::Object(map)) => map.into_iter().filter(|(k, _)| k != "kind").collect(),
            _ => Vec::new(),
        }
    }
}

/// Everything one solve produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolveReport {
    pub winner: RankedLayout,
    /// The remaining ranked candidates, best first, up to the configured
    /// top-K.
    pub runners_up: Vec<RankedLayout>,
    pub plan: ZonePlan,
    pub searches: Vec<ZoneSearch>,
    pub storage: StorageReport,
    pub warnings: Vec<SolveWarning>,
    pub metrics: MetricSnapshot,
}

impl SolveReport {
    pub fn layout(&self) -> &CandidateLayout {
        &self.winner.layout
    }

    pub fn ranked(&self) -> impl Iterator<Item = &RankedLayout> {
        std::iter::once(&self.winner).chain(self.runners_up.iter())
    }

    pub fn into_layout(self) -> CandidateLayout {
        self.winner.layout
    }
}

/// Configured layout engine. Stateless between calls.
#[derive(Debug, Clone, Default)]
pub struct KitchenEngine {
    config: EngineConfig,
    logger: Option<Logger>,
}

impl KitchenEngine {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            logger: None,
        }
    }

    pub fn with_logger(mut self, logger: Logger) -> Self {
        self.logger = Some(logger);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn solve(
        &self,
        room: &Room,
        catalog: &ModuleCatalog,
        template: &StyleTemplate,
        weights: &ScoringWeights,
    ) -> Result<CandidateLayout> {
        self.solve_report(room, catalog, template, weights)
            .map(SolveReport::into_layout)
    }

    pub fn solve_top_k(
        &self,
        room: &Room,
        catalog: &ModuleCatalog,
        template: &StyleTemplate,
        weights: &ScoringWeights,
        k: usize,
    ) -> Result<Vec<RankedLayout>> {
        let engine = KitchenEngine {
            config: EngineConfig {
                top_k: k,
                ..self.config.clone()
            },
            logger: self.logger.clone(),
        };
        let report = engine.solve_report(room, catalog, template, weights)?;
        let mut ranked = vec![report.winner];
        ranked.extend(report.runners_up);
        Ok(ranked)
    }

    pub fn solve_report(
        &self,
        room: &Room,
        catalog: &ModuleCatalog,
        template: &StyleTemplate,
        weights: &ScoringWeights,
    ) -> Result<SolveReport> {
        let started = Instant::now();
        let result = self.run(room, catalog, template, weights, started);
        if let Err(err) = &result {
            self.log(
                LogLevel::Error,
                TARGET_ENGINE,
                "solve_failed",
                [
                    json_str("error", err.to_string()),
                    json_kv("wall", err.wall().map(str::to_string)),
                    json_kv("internal", err.is_internal()),
                ],
            );
        }
        result
    }

    fn run(
        &self,
        room: &Room,
        catalog: &ModuleCatalog,
        template: &StyleTemplate,
        weights: &ScoringWeights,
        started: Instant,
    ) -> Result<SolveReport> {
        self.config.validate()?;
        let solver_config = &self.config.solver;
        let tolerance = solver_config.tolerance;
        let mut metrics = SolveMetrics::new();
        let mut warnings = Vec::new();

        self.log(
            LogLevel::Info,
            TARGET_ENGINE,
            "solve_started",
            [
                json_str("template", template.name.clone()),
                json_kv("walls", room.walls.len()),
                json_kv("modules", catalog.len()),
            ],
        );

        let plan = ZonePlanner::new(catalog, solver_config.max_modules_per_zone, tolerance)
            .plan(room, template)?;
        metrics.record_plan(plan.zones.len());
        self.log(
            LogLevel::Info,
            TARGET_PLAN,
            "zones_planned",
            [
                json_kv("zones", plan.zones.len()),
                json_kv("dropped", plan.dropped.len()),
            ],
        );
        warnings.extend(
            plan.dropped
                .iter()
                .map(|zone| SolveWarning::OptionalZoneDropped { zone: zone.clone() }),
        );
        warnings.extend(plan.unused_runs.iter().map(|(wall, span)| SolveWarning::UnusedRun {
            wall: wall.clone(),
            start: span.start,
            end: span.end,
        }));

        let mut searches = AssignmentSolver::new(catalog, solver_config).solve_plan(&plan)?;
        for (zone, search) in plan.zones.iter().zip(&searches) {
            metrics.record_search(search);
            self.log(
                LogLevel::Debug,
                TARGET_SEARCH,
                "zone_searched",
                [
                    json_str("zone", zone.id.clone()),
                    json_kv("explored", search.explored),
                    json_kv("pruned", search.pruned),
                    json_kv("alternatives", search.alternatives.len()),
                ],
            );
            if search.truncated {
                warnings.push(SolveWarning::SearchTruncated {
                    zone: zone.id.clone(),
                    explored: search.explored,
                });
            }
            if search.substituted(zone) {
                warnings.push(SolveWarning::CategorySubstituted {
                    zone: zone.id.clone(),
                    primary: zone.primary(),
                    substitute: search.primary,
                });
            }
        }

        // A zone whose every alternative leaves slack no module can absorb
        // fails here, before any candidate is assembled.
        for (zone, search) in plan.zones.iter().zip(searches.iter_mut()) {
            let residual = search
                .alternatives
                .iter()
                .map(|c| c.residual)
                .fold(f64::INFINITY, f64::min);
            search.alternatives.retain(|c| c.is_absorbable(tolerance));
            if search.alternatives.is_empty() {
                return Err(LayoutError::OverSpanInfeasible {
                    wall: zone.wall.clone(),
                    zone: zone.id.clone(),
                    residual,
                });
            }
        }

        let counts: Vec<usize> = searches.iter().map(|s| s.alternatives.len()).collect();
        let choices = enumerate_choices(&counts, solver_config.max_candidates.max(1));
        let resolver = ElasticResolver::new(tolerance);
        let assemble = |choice: &Vec<usize>| -> Result<CandidateLayout> {
            let assignments = plan
                .zones
                .iter()
                .zip(&searches)
                .zip(choice)
                .map(|((zone, search), &pick)| {
                    resolver.resolve(zone, &search.alternatives[pick], catalog)
                })
                .collect::<Result<Vec<_>>>()?;
            Ok(CandidateLayout::new(assignments))
        };
        let assembled: Vec<Result<CandidateLayout>> = if solver_config.parallel {
            choices.par_iter().map(assemble).collect()
        } else {
            choices.iter().map(assemble).collect()
        };
        let layouts = assembled.into_iter().collect::<Result<Vec<_>>>()?;

        let mut registry = CandidateRegistry::new();
        registry.extend(layouts);
        metrics.record_assembly(choices.len(), registry.duplicates());

        let scorer = LayoutScorer::new(
            room,
            catalog,
            &self.config.workflow,
            &self.config.style,
            tolerance,
        );
        let entries = registry.into_entries();
        let score = |layout: CandidateLayout| -> (CandidateLayout, ScoreReport) {
            let report = scorer.score(&layout);
            (layout, report)
        };
        let scored: Vec<(CandidateLayout, ScoreReport)> = if solver_config.parallel {
            entries.into_par_iter().map(|e| score(e.layout)).collect()
        } else {
            entries.into_iter().map(|e| score(e.layout)).collect()
        };
        let feasible = scored.iter().filter(|(_, r)| r.feasible()).count();
        metrics.record_feasible(feasible);
        self.log(
            LogLevel::Info,
            TARGET_ENGINE,
            "candidates_scored",
            [
                json_kv("candidates", scored.len()),
                json_kv("feasible", feasible),
            ],
        );

        let mut ranked = LayoutSelector::new(weights.clone())
            .top_k(scored, self.config.top_k)?
            .into_iter();
        let winner = ranked.next().ok_or(LayoutError::NoFeasibleCandidate { attempted: 0 })?;
        let runners_up: Vec<RankedLayout> = ranked.collect();

        let storage = storage_report(&winner.layout, room);
        if storage.is_under_storage() {
            warnings.push(SolveWarning::StorageDeficit {
                deficit_m: storage.deficit_m,
            });
        }

        for warning in &warnings {
            self.log(LogLevel::Warn, warning.target(), warning.message(), warning.fields());
        }

        let snapshot = metrics.snapshot(started.elapsed());
        if let Some(logger) = &self.logger {
            let _ = logger.log_event(snapshot.to_log_event(TARGET_METRICS));
        }
        self.log(
            LogLevel::Info,
            TARGET_ENGINE,
            "solve_completed",
            [
                json_str("fingerprint", winner.report.fingerprint()),
                json_kv("total", json!(winner.total)),
                json_kv("warnings", warnings.len()),
            ],
        );

        Ok(SolveReport {
            winner,
            runners_up,
            plan,
            searches,
            storage,
            warnings,
            metrics: snapshot,
        })
    }

    fn log<I>(&self, level: LogLevel, target: &str, message: &str, fields: I)
    where
        I: IntoIterator<Item = (String, Value)>,
    {
        if let Some(logger) = self.logger.as_ref() {
            let event = event_with_fields(level, target, message, fields);
            let _ = logger.log_event(event);
        }
    }
}

/// Solves with default engine settings.
pub fn solve(
    room: &Room,
    catalog: &ModuleCatalog,
    template: &StyleTemplate,
    weights: &ScoringWeights,
) -> Result<CandidateLayout> {
    KitchenEngine::default().solve(room, catalog, template, weights)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::catalog::ModuleType;
    use crate::geometry::{Opening, Wall};
    use crate::logging::MemorySink;
    use crate::solver::SolverConfig;
    use crate::zone::ZoneSpec;

    fn catalog() -> ModuleCatalog {
        ModuleCatalog::new([
            ModuleType::elastic("pantry", Category::Store, 60.0, 120.0, 1.0),
            ModuleType::rigid("drawer-60", Category::Prep, 60.0),
            ModuleType::rigid("hob-60", Category::Cook, 60.0),
            ModuleType::rigid("sink-60", Category::Clean, 60.0),
        ])
        .unwrap()
    }

    #[test]
    fn report_lists_ranked_candidates_and_metrics() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let report = KitchenEngine::default()
            .solve_report(&room, &catalog(), &StyleTemplate::galley(), &ScoringWeights::default())
            .unwrap();

        assert_eq!(report.plan.zones.len(), 4);
        assert_eq!(report.winner.rank, 1);
        assert!(report.ranked().count() >= 2);
        assert!(report.ranked().all(|r| r.report.feasible()));
        assert_eq!(report.metrics.zones_planned, 4);
        assert!(report.metrics.combinations_explored > 0);
    }

    #[test]
    fn logger_receives_lifecycle_and_metrics_events() {
        let sink = Arc::new(MemorySink::new());
        let engine = KitchenEngine::default().with_logger(Logger::from_arc(sink.clone()));
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        engine
            .solve(&room, &catalog(), &StyleTemplate::galley(), &ScoringWeights::default())
            .unwrap();

        let messages: Vec<String> = sink.events().into_iter().map(|e| e.message).collect();
        assert_eq!(messages.first().map(String::as_str), Some("solve_started"));
        assert_eq!(messages.last().map(String::as_str), Some("solve_completed"));
        assert_eq!(sink.with_target(TARGET_METRICS).len(), 1);
        assert_eq!(sink.with_target(TARGET_SEARCH).len(), 4);
    }

    #[test]
    fn failures_are_logged_before_returning() {
        let sink = Arc::new(MemorySink::new());
        let engine = KitchenEngine::default().with_logger(Logger::from_arc(sink.clone()));
        let room = Room::new(vec![Wall::new("short", 50.0)]);
        let template = StyleTemplate::new(
            "cook",
            vec![ZoneSpec::required("cook", vec![Category::Cook])],
        );
        let err = engine
            .solve(&room, &catalog(), &template, &ScoringWeights::default())
            .unwrap_err();

        assert!(matches!(err, LayoutError::ZoneInfeasible { .. }));
        let last = sink.events().pop().unwrap();
        assert_eq!(last.message, "solve_failed");
        assert_eq!(last.field("wall"), Some(&json!("short")));
    }

    #[test]
    fn dropped_zones_and_unused_runs_become_warnings() {
        let room = Room::new(vec![
            Wall::new("north", 240.0).with_opening(Opening::door(180.0, 240.0)),
            Wall::new("east", 100.0),
        ]);
        let template = StyleTemplate::new(
            "compact",
            vec![
                ZoneSpec::required("prep", vec![Category::Prep]),
                ZoneSpec::required("cook", vec![Category::Cook]),
                ZoneSpec::required("clean", vec![Category::Clean]),
                ZoneSpec::optional("tall", vec![Category::Store]).with_min_span(200.0),
            ],
        );
        let report = KitchenEngine::default()
            .solve_report(&room, &catalog(), &template, &ScoringWeights::default())
            .unwrap();

        assert!(report.warnings.contains(&SolveWarning::OptionalZoneDropped {
            zone: "tall".into()
        }));
        assert!(report.warnings.contains(&SolveWarning::UnusedRun {
            wall: "east".into(),
            start: 0.0,
            end: 100.0,
        }));
    }

    #[test]
    fn zone_with_only_unabsorbable_slack_is_over_span() {
        let catalog =
            ModuleCatalog::new([ModuleType::rigid("hob-60", Category::Cook, 60.0)]).unwrap();
        let room = Room::new(vec![Wall::new("north", 90.0)]);
        let template = StyleTemplate::new(
            "cook",
            vec![ZoneSpec::required("cook", vec![Category::Cook])],
        );
        let engine = KitchenEngine::new(EngineConfig {
            solver: SolverConfig {
                max_modules_per_zone: 1,
                ..SolverConfig::default()
            },
            ..EngineConfig::default()
        });
        let err = engine
            .solve(&room, &catalog, &template, &ScoringWeights::default())
            .unwrap_err();

        match err {
            LayoutError::OverSpanInfeasible { wall, zone, residual } => {
                assert_eq!(wall, "north");
                assert_eq!(zone, "north:z0");
                assert!((residual - 30.0).abs() < 1e-9);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn top_k_respects_requested_count() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let ranked = KitchenEngine::default()
            .solve_top_k(&room, &catalog(), &StyleTemplate::galley(), &ScoringWeights::default(), 1)
            .unwrap();
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].rank, 1);
    }
}
