use crate::catalog::ModuleCatalog;
use crate::geometry::Room;
use crate::layout::CandidateLayout;
use crate::style::{StyleConfig, StyleCritic};
use crate::validate::{has_critical, validate_layout};
use crate::workflow::{GhostChef, WorkflowConfig};

use super::core::ScoreReport;

/// Validates and scores candidates for one room.
#[derive(Clone, Copy)]
pub struct LayoutScorer<'a> {
    room: &'a Room,
    catalog: &'a ModuleCatalog,
    workflow: &'a WorkflowConfig,
    style: &'a StyleConfig,
    tolerance: f64,
}

impl<'a> LayoutScorer<'a> {
    pub fn new(
        room: &'a Room,
        catalog: &'a ModuleCatalog,
        workflow: &'a WorkflowConfig,
        style: &'a StyleConfig,
        tolerance: f64,
    ) -> Self {
        Self {
            room,
            catalog,
            workflow,
            style,
            tolerance,
        }
    }

    pub fn score(&self, layout: &CandidateLayout) -> ScoreReport {
        let issues = validate_layout(layout, self.room, self.catalog, self.tolerance);
        let workflow = GhostChef::new(self.workflow).evaluate(layout, self.room);
        let style = StyleCritic::new(self.style).evaluate(layout, self.room);

        ScoreReport::new(
            !has_critical(&issues),
            workflow.score,
            style.score,
            simplicity(layout),
            layout.fingerprint().to_hex().to_string(),
        )
        .with_details(workflow, style, issues)
    }
}

/// 100 when every zone holds a single module, falling as seams multiply.
fn simplicity(layout: &CandidateLayout) -> f64 {
    let modules = layout.module_count();
    if modules == 0 {
        return 0.0;
    }
    100.0 * layout.zone_count() as f64 / modules as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Category, ModuleType};
    use crate::geometry::{Interval, Wall};
    use crate::layout::{PlacedModule, ZoneAssignment};
    use crate::zone::Zone;

    fn zone(start: f64, end: f64) -> Zone {
        Zone {
            id: "north:z0".into(),
            wall: "north".into(),
            name: "prep".into(),
            order: 0,
            categories: vec![Category::Prep],
            fallbacks: Vec::new(),
            span: Interval::new(start, end),
        }
    }

    fn placed(offset: f64, width: f64) -> PlacedModule {
        PlacedModule::new(
            "drawer".into(),
            Category::Prep,
            "north".into(),
            "north:z0".into(),
            offset,
            width,
        )
    }

    #[test]
    fn scored_report_carries_details_and_feasibility() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let catalog = ModuleCatalog::new([ModuleType::elastic(
            "drawer",
            Category::Prep,
            40.0,
            80.0,
            1.0,
        )])
        .unwrap();
        let workflow = WorkflowConfig::default();
        let style = StyleConfig::default();
        let scorer = LayoutScorer::new(&room, &catalog, &workflow, &style, 1e-6);

        let two = CandidateLayout::new(vec![ZoneAssignment::new(
            zone(0.0, 120.0),
            vec![placed(0.0, 60.0), placed(60.0, 60.0)],
        )]);
        let report = scorer.score(&two);
        assert!(report.feasible());
        assert_eq!(report.simplicity(), 50.0);
        assert_eq!(report.fingerprint(), two.fingerprint().to_hex().as_str());
        assert!(report.workflow_report().is_some());
        assert!(report.style_report().is_some());

        let broken = CandidateLayout::new(vec![ZoneAssignment::new(
            zone(0.0, 120.0),
            vec![placed(0.0, 90.0)],
        )]);
        assert!(!scorer.score(&broken).feasible());
    }
}
