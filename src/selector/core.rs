use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::layout::CandidateLayout;
use crate::style::StyleReport;
use crate::validate::ValidationIssue;
use crate::workflow::WorkflowReport;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingMode {
    /// Weighted sum of the three scores.
    #[default]
    WeightedSum,
    /// Ergonomic first, then style, then simplicity.
    Lexicographic,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub ergonomic: f64,
    pub style: f64,
    /// Preference for fewer modules per zone. Zero by default, which leaves
    /// simplicity to break ties after ergonomics and style.
    pub simplicity: f64,
    pub mode: RankingMode,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            ergonomic: 0.6,
            style: 0.3,
            simplicity: 0.0,
            mode: RankingMode::WeightedSum,
        }
    }
}

impl ScoringWeights {
    pub fn lexicographic() -> Self {
        Self {
            mode: RankingMode::Lexicographic,
            ..Self::default()
        }
    }

    /// Combined score on the same 0 to 100 scale as its inputs.
    pub fn total(&self, report: &ScoreReport) -> f64 {
        match self.mode {
            RankingMode::Lexicographic => report.ergonomic,
            RankingMode::WeightedSum => {
                let (we, ws, wp) = (
                    self.ergonomic.max(0.0),
                    self.style.max(0.0),
                    self.simplicity.max(0.0),
                );
                let sum = we + ws + wp;
                if sum <= 0.0 {
                    return 0.0;
                }
                (we * report.ergonomic + ws * report.style + wp * report.simplicity) / sum
            }
        }
    }
}

/// Scores attached to one candidate. Built once, never changed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreReport {
    feasible: bool,
    ergonomic: f64,
    style: f64,
    simplicity: f64,
    fingerprint: String,
    workflow_report: Option<WorkflowReport>,
    style_report: Option<StyleReport>,
    issues: Vec<ValidationIssue>,
}

impl ScoreReport {
    pub fn new(
        feasible: bool,
        ergonomic: f64,
        style: f64,
        simplicity: f64,
        fingerprint: impl Into<String>,
    ) -> Self {
        Self {
            feasible,
            ergonomic,
            style,
            simplicity,
            fingerprint: fingerprint.into(),
            workflow_report: None,
            style_report: None,
            issues: Vec::new(),
        }
    }

    pub fn with_details(
        mut self,
        workflow: WorkflowReport,
        style: StyleReport,
        issues: Vec<ValidationIssue>,
    ) -> Self {
        self.workflow_report = Some(workflow);
        self.style_report = Some(style);
        self.issues = issues;
        self
    }

    pub fn feasible(&self) -> bool {
        self.feasible
    }

    pub fn ergonomic(&self) -> f64 {
        self.ergonomic
    }

    pub fn style(&self) -> f64 {
        self.style
    }

    pub fn simplicity(&self) -> f64 {
        self.simplicity
    }

    /// Hex BLAKE3 fingerprint of the scored layout.
    pub fn fingerprint(&self) -> &str {
        &self.fingerprint
    }

    pub fn workflow_report(&self) -> Option<&WorkflowReport> {
        self.workflow_report.as_ref()
    }

    pub fn style_report(&self) -> Option<&StyleReport> {
        self.style_report.as_ref()
    }

    pub fn issues(&self) -> &[ValidationIssue] {
        &self.issues
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedLayout {
    pub rank: usize,
    pub total: f64,
    pub layout: CandidateLayout,
    pub report: ScoreReport,
}

#[derive(Debug, Clone, Default)]
pub struct LayoutSelector {
    weights: ScoringWeights,
}

impl LayoutSelector {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Feasible candidates, best first. Infeasible ones are dropped.
    pub fn rank(&self, candidates: Vec<(CandidateLayout, ScoreReport)>) -> Vec<RankedLayout> {
        let mut ranked: Vec<RankedLayout> = candidates
            .into_iter()
            .filter(|(_, report)| report.feasible)
            .map(|(layout, report)| RankedLayout {
                rank: 0,
                total: self.weights.total(&report),
                layout,
                report,
            })
            .collect();
        ranked.sort_by(|a, b| self.compare(a, b));
        for (idx, entry) in ranked.iter_mut().enumerate() {
            entry.rank = idx + 1;
        }
        ranked
    }

    pub fn select(&self, candidates: Vec<(CandidateLayout, ScoreReport)>) -> Result<RankedLayout> {
        let attempted = candidates.len();
        self.rank(candidates)
            .into_iter()
            .next()
            .ok_or(LayoutError::NoFeasibleCandidate { attempted })
    }

    pub fn top_k(
        &self,
        candidates: Vec<(CandidateLayout, ScoreReport)>,
        k: usize,
    ) -> Result<Vec<RankedLayout>> {
        let attempted = candidates.len();
        let mut ranked = self.rank(candidates);
        if ranked.is_empty() {
            return Err(LayoutError::NoFeasibleCandidate { attempted });
        }
        ranked.truncate(k.max(1));
        Ok(ranked)
    }

    fn compare(&self, a: &RankedLayout, b: &RankedLayout) -> Ordering {
        let (ra, rb) = (&a.report, &b.report);
        let desc = |x: f64, y: f64| y.total_cmp(&x);
        let scores = match self.weights.mode {
            RankingMode::WeightedSum => desc(a.total, b.total)
                .then_with(|| desc(ra.ergonomic, rb.ergonomic))
                .then_with(|| desc(ra.style, rb.style))
                .then_with(|| desc(ra.simplicity, rb.simplicity)),
            RankingMode::Lexicographic => desc(ra.ergonomic, rb.ergonomic)
                .then_with(|| desc(ra.style, rb.style))
                .then_with(|| desc(ra.simplicity, rb.simplicity)),
        };
        scores.then_with(|| ra.fingerprint.cmp(&rb.fingerprint))
    }
}
