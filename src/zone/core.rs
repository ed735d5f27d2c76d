use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::geometry::{Interval, WallId};

pub type ZoneId = String;

/// Contiguous span of one wall reserved for a set of module categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub id: ZoneId,
    pub wall: WallId,
    /// Name of the template entry this zone came from.
    pub name: String,
    /// Position of that entry in the template.
    pub order: usize,
    /// Permitted categories; the first one must appear in the zone.
    pub categories: Vec<Category>,
    /// Substitutes for the primary category, tried in order.
    pub fallbacks: Vec<Category>,
    pub span: Interval,
}

impl Zone {
    pub fn primary(&self) -> Category {
        self.categories[0]
    }

    pub fn len(&self) -> f64 {
        self.span.len()
    }

    /// Permitted categories with the primary swapped for `primary`.
    pub fn categories_with_primary(&self, primary: Category) -> Vec<Category> {
        let mut categories = vec![primary];
        categories.extend(
            self.categories[1..]
                .iter()
                .copied()
                .filter(|c| *c != primary),
        );
        categories
    }
}

/// Output of the zone planner for one room.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ZonePlan {
    /// Zones in wall order, then offset order.
    pub zones: Vec<Zone>,
    /// Optional template entries that did not fit.
    pub dropped: Vec<String>,
    /// Free runs that received no zone.
    pub unused_runs: Vec<(WallId, Interval)>,
}

impl ZonePlan {
    pub fn zones_on<'a>(&'a self, wall: &'a str) -> impl Iterator<Item = &'a Zone> + 'a {
        self.zones.iter().filter(move |z| z.wall == wall)
    }
}
