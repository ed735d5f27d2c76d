use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::error::{LayoutError, Result};
use crate::geometry::WallId;

fn default_required() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

/// One entry of a style template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneSpec {
    pub name: String,
    pub categories: Vec<Category>,
    #[serde(default = "default_required")]
    pub required: bool,
    /// Relative share of spare wall length this zone should receive.
    #[serde(default = "default_weight")]
    pub weight: f64,
    /// Smallest span the zone may be given; raised to the cheapest module
    /// of its primary category when that is larger.
    #[serde(default)]
    pub min_span: Option<f64>,
    /// Restricts the zone to one wall.
    #[serde(default)]
    pub wall: Option<WallId>,
    #[serde(default)]
    pub fallbacks: Vec<Category>,
}

impl ZoneSpec {
    pub fn required(name: impl Into<String>, categories: Vec<Category>) -> Self {
        Self {
            name: name.into(),
            categories,
            required: true,
            weight: 1.0,
            min_span: None,
            wall: None,
            fallbacks: Vec::new(),
        }
    }

    pub fn optional(name: impl Into<String>, categories: Vec<Category>) -> Self {
        Self {
            required: false,
            ..Self::required(name, categories)
        }
    }

    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_min_span(mut self, span: f64) -> Self {
        self.min_span = Some(span);
        self
    }

    pub fn on_wall(mut self, wall: impl Into<WallId>) -> Self {
        self.wall = Some(wall.into());
        self
    }

    pub fn with_fallback(mut self, category: Category) -> Self {
        self.fallbacks.push(category);
        self
    }

    pub fn primary(&self) -> Category {
        self.categories[0]
    }
}

/// Ordered zone categories describing a kitchen style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleTemplate {
    pub name: String,
    pub zones: Vec<ZoneSpec>,
}

impl StyleTemplate {
    pub fn new(name: impl Into<String>, zones: Vec<ZoneSpec>) -> Self {
        Self {
            name: name.into(),
            zones,
        }
    }

    /// Storage, preparation, cooking, cleaning: the classic production line.
    pub fn galley() -> Self {
        Self::new(
            "galley",
            vec![
                ZoneSpec::required("store", vec![Category::Store]),
                ZoneSpec::required("prep", vec![Category::Prep]),
                ZoneSpec::required("cook", vec![Category::Cook]),
                ZoneSpec::required("clean", vec![Category::Clean]),
            ],
        )
    }

    pub fn validate(&self) -> Result<()> {
        if self.zones.is_empty() {
            return Err(LayoutError::InvalidTemplate(format!(
                "template `{}` has no zones",
                self.name
            )));
        }
        for spec in &self.zones {
            if spec.categories.is_empty() {
                return Err(LayoutError::InvalidTemplate(format!(
                    "zone `{}` permits no categories",
                    spec.name
                )));
            }
            if !(spec.weight.is_finite() && spec.weight > 0.0) {
                return Err(LayoutError::InvalidTemplate(format!(
                    "zone `{}` weight must be positive",
                    spec.name
                )));
            }
            if spec.min_span.is_some_and(|s| !(s.is_finite() && s >= 0.0)) {
                return Err(LayoutError::InvalidTemplate(format!(
                    "zone `{}` minimum span must be zero or positive",
                    spec.name
                )));
            }
        }
        Ok(())
    }
}
