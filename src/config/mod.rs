//! Engine configuration.
//!
//! Every section has defaults, so a JSON document only needs the keys it
//! wants to change:
//!
//! ```
//! use kitchen_layout::EngineConfig;
//!
//! let config = EngineConfig::from_json_str(r#"{ "solver": { "parallel": false }, "top_k": 3 }"#)
//!     .unwrap();
//! assert!(!config.solver.parallel);
//! assert_eq!(config.solver.max_modules_per_zone, 4);
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};
use crate::solver::SolverConfig;
use crate::style::StyleConfig;
use crate::workflow::WorkflowConfig;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverConfig,
    pub workflow: WorkflowConfig,
    pub style: StyleConfig,
    /// Ranked candidates kept in a [`crate::SolveReport`].
    pub top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverConfig::default(),
            workflow: WorkflowConfig::default(),
            style: StyleConfig::default(),
            top_k: 5,
        }
    }
}

impl EngineConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let tolerance = self.solver.tolerance;
        if !(tolerance.is_finite() && tolerance > 0.0) {
            return Err(LayoutError::InvalidConfig(format!(
                "solver tolerance must be positive, got {tolerance}"
            )));
        }
        self.workflow.validate()
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflow::DistanceMetric;

    #[test]
    fn empty_document_yields_defaults() {
        assert_eq!(EngineConfig::from_json_str("{}").unwrap(), EngineConfig::default());
    }

    #[test]
    fn nested_overrides_keep_sibling_defaults() {
        let config = EngineConfig::from_json_str(
            r#"{
                "workflow": { "metric": "manhattan", "max_leg": 200.0 },
                "style": { "alignment_weight": 0.0 }
            }"#,
        )
        .unwrap();
        assert_eq!(config.workflow.metric, DistanceMetric::Manhattan);
        assert_eq!(config.workflow.max_leg, 200.0);
        assert_eq!(config.workflow.tasks.len(), 4);
        assert_eq!(config.style.rhythm_weight, 0.6);
        assert_eq!(config.style.alignment_weight, 0.0);
    }

    #[test]
    fn task_without_stations_is_rejected() {
        let err = EngineConfig::from_json_str(
            r#"{ "workflow": { "tasks": [{ "name": "noop", "stations": [] }] } }"#,
        )
        .unwrap_err();
        assert!(matches!(err, LayoutError::InvalidConfig(ref reason) if reason.contains("noop")));
    }

    #[test]
    fn malformed_json_is_a_config_error() {
        let err = EngineConfig::from_json_str("{ solver: }").unwrap_err();
        assert!(matches!(err, LayoutError::Config(_)));
    }
}
