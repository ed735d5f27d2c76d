use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::catalog::{Category, ModuleCatalog, ModuleId, ModuleType, can_follow, sequence_satisfies};
use crate::error::{LayoutError, Result};
use crate::zone::{Zone, ZoneId, ZonePlan};

/// Search bounds and numeric tolerance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Most modules a single zone may hold.
    pub max_modules_per_zone: usize,
    /// Best combinations kept per zone.
    pub alternatives_per_zone: usize,
    /// Complete sequences evaluated per zone before the search stops early.
    pub max_combinations_per_zone: usize,
    /// Whole-room candidates assembled from the per-zone alternatives.
    pub max_candidates: usize,
    pub tolerance: f64,
    pub parallel: bool,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_modules_per_zone: 4,
            alternatives_per_zone: 4,
            max_combinations_per_zone: 20_000,
            max_candidates: 64,
            tolerance: 1e-6,
            parallel: true,
        }
    }
}

/// Ordered modules proposed for one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneCombination {
    pub modules: Vec<ModuleId>,
    pub min_total: f64,
    pub max_total: f64,
    /// Zone span minus the summed minimum widths.
    pub slack: f64,
    /// Slack left over even with every module at maximum width.
    pub residual: f64,
    /// Largest stretch a single module takes under proportional spreading.
    pub stretch: f64,
}

impl ZoneCombination {
    fn from_types(modules: &[&ModuleType], span: f64) -> Self {
        let min_total: f64 = modules.iter().map(|m| m.min_width).sum();
        let max_total: f64 = modules.iter().map(|m| m.max_width).sum();
        let slack = span - min_total;
        let weight: f64 = modules.iter().map(|m| m.elasticity).sum();
        let heaviest = modules.iter().map(|m| m.elasticity).fold(0.0, f64::max);
        let stretch = if slack <= 0.0 {
            0.0
        } else if weight > 0.0 {
            slack * heaviest / weight
        } else {
            f64::INFINITY
        };
        Self {
            modules: modules.iter().map(|m| m.id.clone()).collect(),
            min_total,
            max_total,
            slack,
            residual: (span - max_total).max(0.0),
            stretch,
        }
    }

    /// Builds a combination from catalog identifiers.
    pub fn from_modules(ids: Vec<ModuleId>, catalog: &ModuleCatalog, span: f64) -> Result<Self> {
        let modules = ids
            .iter()
            .map(|id| catalog.require(id))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self::from_types(&modules, span))
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// True when elastic resolution can close the zone exactly.
    pub fn is_absorbable(&self, tolerance: f64) -> bool {
        self.residual <= tolerance
    }
}

/// Result of searching one zone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSearch {
    pub zone: ZoneId,
    /// Category that had to appear; differs from the zone's primary when a
    /// fallback was substituted.
    pub primary: Category,
    /// Best combinations, best first.
    pub alternatives: Vec<ZoneCombination>,
    pub explored: usize,
    pub pruned: usize,
    pub feasible: usize,
    /// The combination cap stopped the search early.
    pub truncated: bool,
}

impl ZoneSearch {
    pub fn substituted(&self, zone: &Zone) -> bool {
        self.primary != zone.primary()
    }
}

/// Total order over combinations: slack left after full stretch, then module
/// count, then per-module stretch, then stretch required, then identifiers.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct RankKey {
    residual: i64,
    count: usize,
    stretch: i64,
    slack: i64,
    ids: Vec<ModuleId>,
}

impl RankKey {
    fn of(combination: &ZoneCombination, tolerance: f64) -> Self {
        Self {
            residual: quantize(combination.residual, tolerance),
            count: combination.modules.len(),
            stretch: quantize(combination.stretch, tolerance),
            slack: quantize(combination.slack, tolerance),
            ids: combination.modules.clone(),
        }
    }
}

fn quantize(value: f64, tolerance: f64) -> i64 {
    // Float-to-int casts saturate, so infinities land on the extremes.
    (value / tolerance.max(f64::MIN_POSITIVE)).round() as i64
}

/// Searches the catalog for module sequences that fit each zone.
#[derive(Debug, Clone, Copy)]
pub struct AssignmentSolver<'a> {
    catalog: &'a ModuleCatalog,
    config: &'a SolverConfig,
}

impl<'a> AssignmentSolver<'a> {
    pub fn new(catalog: &'a ModuleCatalog, config: &'a SolverConfig) -> Self {
        Self { catalog, config }
    }

    /// Searches every zone of the plan. Errors are reported for the first
    /// failing zone in plan order.
    pub fn solve_plan(&self, plan: &ZonePlan) -> Result<Vec<ZoneSearch>> {
        let results: Vec<Result<ZoneSearch>> = if self.config.parallel {
            plan.zones.par_iter().map(|z| self.solve_zone(z)).collect()
        } else {
            plan.zones.iter().map(|z| self.solve_zone(z)).collect()
        };
        results.into_iter().collect()
    }

    /// Searches one zone, substituting fallback categories when the primary
    /// category admits no combination.
    pub fn solve_zone(&self, zone: &Zone) -> Result<ZoneSearch> {
        let mut explored = 0;
        let mut pruned = 0;
        let mut truncated = false;

        let primaries = std::iter::once(zone.primary()).chain(zone.fallbacks.iter().copied());
        for primary in primaries {
            if !self.catalog.has_category(primary) {
                continue;
            }
            let search = self.search(zone, primary);
            explored += search.explored;
            pruned += search.pruned;
            truncated |= search.truncated;
            if !search.alternatives.is_empty() {
                return Ok(ZoneSearch {
                    explored,
                    pruned,
                    truncated,
                    ..search
                });
            }
        }

        Err(LayoutError::ZoneInfeasible {
            wall: zone.wall.clone(),
            zone: Some(zone.id.clone()),
            category: zone.primary(),
            span: zone.len(),
            required: self
                .catalog
                .cheapest(zone.primary())
                .unwrap_or(f64::INFINITY),
        })
    }

    /// Single search with `primary` as the mandatory category.
    pub fn search(&self, zone: &Zone, primary: Category) -> ZoneSearch {
        let categories = zone.categories_with_primary(primary);
        let modules = self.catalog.permitted(&categories);
        let widest = modules.iter().map(|m| m.max_width).fold(0.0, f64::max);

        let mut state = SearchState {
            modules: &modules,
            primary,
            span: zone.len(),
            widest,
            max_len: self.config.max_modules_per_zone.max(1),
            cap: self.config.max_combinations_per_zone.max(1),
            keep: self.config.alternatives_per_zone.max(1),
            tolerance: self.config.tolerance,
            stack: Vec::new(),
            min_sum: 0.0,
            max_sum: 0.0,
            explored: 0,
            pruned: 0,
            feasible: 0,
            truncated: false,
            best: Vec::new(),
        };
        state.descend();

        ZoneSearch {
            zone: zone.id.clone(),
            primary,
            alternatives: state.best.into_iter().map(|(_, c)| c).collect(),
            explored: state.explored,
            pruned: state.pruned,
            feasible: state.feasible,
            truncated: state.truncated,
        }
    }
}

struct SearchState<'m, 'c> {
    modules: &'m [&'c ModuleType],
    primary: Category,
    span: f64,
    widest: f64,
    max_len: usize,
    cap: usize,
    keep: usize,
    tolerance: f64,
    stack: Vec<usize>,
    min_sum: f64,
    max_sum: f64,
    explored: usize,
    pruned: usize,
    feasible: usize,
    truncated: bool,
    best: Vec<(RankKey, ZoneCombination)>,
}

impl SearchState<'_, '_> {
    fn descend(&mut self) {
        for idx in 0..self.modules.len() {
            if self.truncated {
                return;
            }
            let module = self.modules[idx];

            if self.min_sum + module.min_width > self.span + self.tolerance {
                self.pruned += 1;
                continue;
            }
            if let Some(&prev) = self.stack.last() {
                if !can_follow(self.modules[prev], module) {
                    self.pruned += 1;
                    continue;
                }
            }

            self.stack.push(idx);
            self.min_sum += module.min_width;
            self.max_sum += module.max_width;

            // Once the kept list holds only combinations that close exactly,
            // a branch that cannot reach the span even at full stretch and
            // full length has nothing left to offer.
            let open_slots = (self.max_len - self.stack.len()) as f64;
            let unreachable = self.max_sum + open_slots * self.widest < self.span - self.tolerance;
            if unreachable && self.saturated_with_absorbable() {
                self.pruned += 1;
            } else {
                self.visit();
                if self.stack.len() < self.max_len {
                    self.descend();
                }
            }

            self.stack.pop();
            self.min_sum -= module.min_width;
            self.max_sum -= module.max_width;
        }
    }

    fn visit(&mut self) {
        if self.explored >= self.cap {
            self.truncated = true;
            return;
        }
        self.explored += 1;

        let sequence: Vec<&ModuleType> = self.stack.iter().map(|&i| self.modules[i]).collect();
        if !sequence.iter().any(|m| m.category == self.primary) {
            return;
        }
        if !sequence_satisfies(&sequence) {
            return;
        }

        self.feasible += 1;
        let combination = ZoneCombination::from_types(&sequence, self.span);
        let key = RankKey::of(&combination, self.tolerance);
        let full = self.best.len() >= self.keep;
        if full && self.best.last().is_some_and(|(worst, _)| key >= *worst) {
            return;
        }
        let pos = self.best.partition_point(|(k, _)| *k <= key);
        self.best.insert(pos, (key, combination));
        self.best.truncate(self.keep);
    }

    fn saturated_with_absorbable(&self) -> bool {
        self.best.len() >= self.keep && self.best.iter().all(|(k, _)| k.residual == 0)
    }
}
