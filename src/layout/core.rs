use serde::{Deserialize, Serialize};

use crate::catalog::{Category, ModuleId};
use crate::geometry::{Interval, WallId};
use crate::zone::{Zone, ZoneId};

/// A module instance bound to a position on a wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedModule {
    module: ModuleId,
    category: Category,
    wall: WallId,
    zone: ZoneId,
    offset: f64,
    width: f64,
}

impl PlacedModule {
    pub fn new(
        module: ModuleId,
        category: Category,
        wall: WallId,
        zone: ZoneId,
        offset: f64,
        width: f64,
    ) -> Self {
        Self {
            module,
            category,
            wall,
            zone,
            offset,
            width,
        }
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn wall(&self) -> &str {
        &self.wall
    }

    pub fn zone(&self) -> &str {
        &self.zone
    }

    pub fn offset(&self) -> f64 {
        self.offset
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn end(&self) -> f64 {
        self.offset + self.width
    }

    pub fn center(&self) -> f64 {
        self.offset + self.width / 2.0
    }

    pub fn span(&self) -> Interval {
        Interval::new(self.offset, self.end())
    }
}

/// Modules filling one zone, in wall order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ZoneAssignment {
    zone: Zone,
    modules: Vec<PlacedModule>,
}

impl ZoneAssignment {
    pub fn new(zone: Zone, modules: Vec<PlacedModule>) -> Self {
        Self { zone, modules }
    }

    pub fn zone(&self) -> &Zone {
        &self.zone
    }

    pub fn modules(&self) -> &[PlacedModule] {
        &self.modules
    }

    pub fn occupied_width(&self) -> f64 {
        self.modules.iter().map(PlacedModule::width).sum()
    }
}

/// One complete whole-room arrangement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateLayout {
    assignments: Vec<ZoneAssignment>,
}

impl CandidateLayout {
    pub fn new(assignments: Vec<ZoneAssignment>) -> Self {
        Self { assignments }
    }

    pub fn assignments(&self) -> &[ZoneAssignment] {
        &self.assignments
    }

    pub fn zone_count(&self) -> usize {
        self.assignments.len()
    }

    pub fn modules(&self) -> impl Iterator<Item = &PlacedModule> {
        self.assignments.iter().flat_map(|a| a.modules.iter())
    }

    pub fn module_count(&self) -> usize {
        self.assignments.iter().map(|a| a.modules.len()).sum()
    }

    /// Modules on `wall`, sorted by offset.
    pub fn modules_on<'a>(&'a self, wall: &str) -> Vec<&'a PlacedModule> {
        let mut modules: Vec<_> = self.modules().filter(|m| m.wall == wall).collect();
        modules.sort_by(|a, b| a.offset.total_cmp(&b.offset));
        modules
    }

    pub fn has_category(&self, category: Category) -> bool {
        self.modules().any(|m| m.category == category)
    }

    /// Content hash over zones, module identities and exact geometry.
    pub fn fingerprint(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for assignment in &self.assignments {
            hasher.update(assignment.zone.id.as_bytes());
            hasher.update(&[0]);
            for module in &assignment.modules {
                hasher.update(module.module.as_bytes());
                hasher.update(&[0]);
                hasher.update(module.wall.as_bytes());
                hasher.update(&[0]);
                hasher.update(&module.offset.to_bits().to_le_bytes());
                hasher.update(&module.width.to_bits().to_le_bytes());
            }
            hasher.update(&[1]);
        }
        hasher.finalize()
    }
}
