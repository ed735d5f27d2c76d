//! Candidate scoring and ranking.
//!
//! [`LayoutScorer`] attaches a [`ScoreReport`] to every resolved candidate;
//! [`LayoutSelector`] drops the infeasible ones and orders the rest under a
//! total order, so the winner never depends on evaluation order.

mod core;
mod scoring;

pub use core::{LayoutSelector, RankedLayout, RankingMode, ScoreReport, ScoringWeights};
pub use scoring::LayoutScorer;
