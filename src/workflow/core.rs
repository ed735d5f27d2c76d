use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::error::{LayoutError, Result};
use crate::geometry::{Point, Room};
use crate::layout::CandidateLayout;

/// Ordered station categories a cook visits for one task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskSequence {
    pub name: String,
    pub stations: Vec<Category>,
    /// Relative weight of this task in the aggregate score.
    #[serde(default = "default_frequency")]
    pub frequency: f64,
}

fn default_frequency() -> f64 {
    1.0
}

impl TaskSequence {
    pub fn new(name: impl Into<String>, stations: Vec<Category>, frequency: f64) -> Self {
        Self {
            name: name.into(),
            stations,
            frequency,
        }
    }

    pub fn legs(&self) -> usize {
        self.stations.len().saturating_sub(1)
    }

    /// Built-in task library.
    pub fn defaults() -> Vec<Self> {
        use Category::*;
        vec![
            Self::new("make_pasta", vec![Store, Clean, Prep, Cook, Clean, Cook], 3.0),
            Self::new("morning_coffee", vec![Store, Clean, Cook], 5.0),
            Self::new("unload_groceries", vec![Prep, Store], 1.0),
            Self::new("wash_up", vec![Cook, Clean, Store], 2.0),
        ]
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    /// Manhattan when the layout turns a corner, Euclidean otherwise.
    #[default]
    Auto,
    Euclidean,
    Manhattan,
}

impl DistanceMetric {
    fn distance(self, a: &Point, b: &Point) -> f64 {
        match self {
            DistanceMetric::Manhattan => a.manhattan(b),
            _ => a.euclidean(b),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkflowConfig {
    pub tasks: Vec<TaskSequence>,
    pub metric: DistanceMetric,
    /// Travel per leg of an ideally compact layout (cm).
    pub reference_step: f64,
    /// Distance from the wall where the cook stands (cm).
    pub standing_depth: f64,
    /// Legs longer than this count as out of reach.
    pub max_leg: f64,
    /// Score points lost per out-of-reach leg.
    pub long_leg_penalty: f64,
}

impl WorkflowConfig {
    /// Every task needs at least one station and a finite, non-negative
    /// frequency.
    pub fn validate(&self) -> Result<()> {
        for task in &self.tasks {
            if task.stations.is_empty() {
                return Err(LayoutError::InvalidConfig(format!(
                    "task `{}` visits no stations",
                    task.name
                )));
            }
            if !(task.frequency.is_finite() && task.frequency >= 0.0) {
                return Err(LayoutError::InvalidConfig(format!(
                    "task `{}` frequency must be zero or positive",
                    task.name
                )));
            }
        }
        Ok(())
    }
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            tasks: TaskSequence::defaults(),
            metric: DistanceMetric::Auto,
            reference_step: 60.0,
            standing_depth: 60.0,
            max_leg: 270.0,
            long_leg_penalty: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
    pub name: String,
    pub frequency: f64,
    /// Travel along the chosen route (cm).
    pub cost: f64,
    pub ideal: f64,
    pub score: f64,
    pub long_legs: usize,
    /// Station categories absent from the layout.
    pub missing: Vec<Category>,
}

impl TaskOutcome {
    pub fn is_reachable(&self) -> bool {
        self.missing.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowReport {
    pub metric: DistanceMetric,
    pub tasks: Vec<TaskOutcome>,
    /// Frequency-weighted mean travel (cm); lower is better.
    pub weighted_cost: f64,
    /// Frequency-weighted mean task score, 0 to 100.
    pub score: f64,
}

impl WorkflowReport {
    pub fn task(&self, name: &str) -> Option<&TaskOutcome> {
        self.tasks.iter().find(|t| t.name == name)
    }
}

/// Station positions for one category.
struct Stations {
    category: Category,
    points: Vec<Point>,
}

fn points_of(stations: &[Stations], category: Category) -> &[Point] {
    stations
        .iter()
        .find(|s| s.category == category)
        .map(|s| s.points.as_slice())
        .unwrap_or_default()
}

pub struct GhostChef<'a> {
    config: &'a WorkflowConfig,
}

impl<'a> GhostChef<'a> {
    pub fn new(config: &'a WorkflowConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, layout: &CandidateLayout, room: &Room) -> WorkflowReport {
        let metric = self.resolve_metric(layout, room);
        let stations = self.stations(layout, room);
        let diameter = room.diameter();

        let tasks: Vec<TaskOutcome> = self
            .config
            .tasks
            .iter()
            .map(|task| self.run_task(task, &stations, metric, diameter))
            .collect();

        let total_frequency: f64 = tasks.iter().map(|t| t.frequency.max(0.0)).sum();
        let (weighted_cost, score) = if total_frequency > 0.0 {
            let weigh = |f: fn(&TaskOutcome) -> f64| {
                tasks.iter().map(|t| t.frequency.max(0.0) * f(t)).sum::<f64>() / total_frequency
            };
            (weigh(|t| t.cost), weigh(|t| t.score))
        } else {
            (0.0, 100.0)
        };

        WorkflowReport {
            metric,
            tasks,
            weighted_cost,
            score,
        }
    }

    fn resolve_metric(&self, layout: &CandidateLayout, room: &Room) -> DistanceMetric {
        if self.config.metric != DistanceMetric::Auto {
            return self.config.metric;
        }
        let headings: Vec<_> = room
            .walls
            .iter()
            .filter(|w| layout.modules().any(|m| m.wall() == w.id))
            .map(|w| w.heading)
            .collect();
        let turns_corner = headings
            .iter()
            .any(|a| headings.iter().any(|b| !a.is_parallel(*b)));
        if turns_corner {
            DistanceMetric::Manhattan
        } else {
            DistanceMetric::Euclidean
        }
    }

    /// One station per category per zone, standing in front of the middle of
    /// the run that category occupies within the zone.
    fn stations(&self, layout: &CandidateLayout, room: &Room) -> Vec<Stations> {
        let mut stations: Vec<Stations> = Vec::new();
        for assignment in layout.assignments() {
            let Some(wall) = room.wall(&assignment.zone().wall) else {
                continue;
            };
            let mut extents: Vec<(Category, f64, f64)> = Vec::new();
            for module in assignment.modules() {
                match extents.iter_mut().find(|(c, _, _)| *c == module.category()) {
                    Some((_, start, end)) => {
                        *start = start.min(module.offset());
                        *end = end.max(module.end());
                    }
                    None => extents.push((module.category(), module.offset(), module.end())),
                }
            }
            for (category, start, end) in extents {
                let point = wall.point_at((start + end) / 2.0, self.config.standing_depth);
                match stations.iter_mut().find(|s| s.category == category) {
                    Some(s) => s.points.push(point),
                    None => stations.push(Stations {
                        category,
                        points: vec![point],
                    }),
                }
            }
        }
        stations
    }

    fn run_task(
        &self,
        task: &TaskSequence,
        stations: &[Stations],
        metric: DistanceMetric,
        diameter: f64,
    ) -> TaskOutcome {
        let changes = task
            .stations
            .windows(2)
            .filter(|pair| pair[0] != pair[1])
            .count();
        let ideal = self.config.reference_step * changes.max(1) as f64;

        let mut missing: Vec<Category> = task
            .stations
            .iter()
            .copied()
            .filter(|c| !stations.iter().any(|s| s.category == *c))
            .collect();
        missing.sort();
        missing.dedup();

        let mut outcome = TaskOutcome {
            name: task.name.clone(),
            frequency: task.frequency,
            cost: task.legs() as f64 * diameter,
            ideal,
            score: 0.0,
            long_legs: 0,
            missing,
        };
        if !outcome.is_reachable() {
            return outcome;
        }

        let Some((&first, rest)) = task.stations.split_first() else {
            outcome.cost = 0.0;
            outcome.score = 100.0;
            return outcome;
        };

        let mut best: Option<(f64, f64, usize)> = None;
        for start in points_of(stations, first) {
            let (cost, long_legs) = self.walk(start, rest, stations, metric);
            let score = self.score(cost, ideal, long_legs);
            let better = match best {
                None => true,
                Some((best_score, best_cost, _)) => {
                    score > best_score || (score == best_score && cost < best_cost)
                }
            };
            if better {
                best = Some((score, cost, long_legs));
            }
        }

        if let Some((score, cost, long_legs)) = best {
            outcome.score = score;
            outcome.cost = cost;
            outcome.long_legs = long_legs;
        }
        outcome
    }

    /// Greedy walk visiting the nearest instance of each station in turn.
    fn walk(
        &self,
        start: &Point,
        rest: &[Category],
        stations: &[Stations],
        metric: DistanceMetric,
    ) -> (f64, usize) {
        let mut position = *start;
        let mut cost = 0.0;
        let mut long_legs = 0;
        for &category in rest {
            let nearest = points_of(stations, category)
                .iter()
                .map(|p| (metric.distance(&position, p), *p))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            let Some((leg, next)) = nearest else {
                continue;
            };
            if leg > self.config.max_leg {
                long_legs += 1;
            }
            cost += leg;
            position = next;
        }
        (cost, long_legs)
    }

    fn score(&self, cost: f64, ideal: f64, long_legs: usize) -> f64 {
        let denominator = cost.max(ideal);
        let base = if denominator > 0.0 {
            100.0 * ideal / denominator
        } else {
            100.0
        };
        (base - self.config.long_leg_penalty * long_legs as f64).clamp(0.0, 100.0)
    }
}
