use thiserror::Error;

use crate::catalog::Category;

/// Unified result type for the kitchen layout crate.
pub type Result<T> = std::result::Result<T, LayoutError>;

/// Errors surfaced by the layout engine.
#[derive(Debug, Error)]
pub enum LayoutError {
    #[error(
        "zone infeasible on wall `{wall}`{}: {category} needs {required:.1} \
         but only {span:.1} is available",
        zone_suffix(.zone)
    )]
    ZoneInfeasible {
        wall: String,
        zone: Option<String>,
        category: Category,
        span: f64,
        required: f64,
    },
    #[error("zone `{zone}` on wall `{wall}` cannot absorb {residual:.3} of slack")]
    OverSpanInfeasible {
        wall: String,
        zone: String,
        residual: f64,
    },
    #[error("no feasible layout among {attempted} candidates")]
    NoFeasibleCandidate { attempted: usize },
    #[error("internal invariant violated: {0}")]
    InvariantViolation(String),
    #[error("invalid room geometry on wall `{wall}`: {reason}")]
    InvalidRoom { wall: String, reason: String },
    #[error("invalid catalog entry `{module}`: {reason}")]
    InvalidCatalog { module: String, reason: String },
    #[error("invalid style template: {0}")]
    InvalidTemplate(String),
    #[error("module `{0}` not found in catalog")]
    UnknownModule(String),
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),
    #[error("configuration error: {0}")]
    Config(#[from] serde_json::Error),
}

fn zone_suffix(zone: &Option<String>) -> String {
    zone.as_deref()
        .map(|z| format!(" (zone `{z}`)"))
        .unwrap_or_default()
}

impl LayoutError {
    /// Wall segment the failure is attributed to, when there is one.
    pub fn wall(&self) -> Option<&str> {
        match self {
            LayoutError::ZoneInfeasible { wall, .. }
            | LayoutError::OverSpanInfeasible { wall, .. }
            | LayoutError::InvalidRoom { wall, .. } => Some(wall),
            _ => None,
        }
    }

    /// True for failures caused by a defect rather than by the inputs.
    pub fn is_internal(&self) -> bool {
        matches!(self, LayoutError::InvariantViolation(_))
    }
}
