use std::fmt;

use serde::{Deserialize, Serialize};

use crate::catalog::{ModuleCatalog, ModuleType, sequence_satisfies};
use crate::geometry::{Room, Wall};
use crate::layout::{CandidateLayout, PlacedModule, ZoneAssignment};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    UnknownWall,
    UnknownModule,
    CategoryMismatch,
    WidthOutOfBounds,
    EmptyZone,
    ZoneSumMismatch,
    Gap,
    OutsideZone,
    Overlap,
    BlockedSpan,
    Adjacency,
    PrimarySubstituted,
    PrimaryMissing,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub wall: Option<String>,
    pub zone: Option<String>,
    pub module: Option<String>,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.severity, self.message)?;
        if let Some(zone) = &self.zone {
            write!(f, " (zone `{zone}`)")?;
        }
        Ok(())
    }
}

pub fn has_critical(issues: &[ValidationIssue]) -> bool {
    issues.iter().any(|i| i.severity == Severity::Critical)
}

/// Checks every placement of `layout` against the room and catalog.
pub fn validate_layout(
    layout: &CandidateLayout,
    room: &Room,
    catalog: &ModuleCatalog,
    tolerance: f64,
) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();

    for assignment in layout.assignments() {
        check_zone(assignment, room, catalog, tolerance, &mut issues);
    }

    for wall in &room.walls {
        check_wall(layout, wall, tolerance, &mut issues);
    }

    issues
}

fn issue(
    severity: Severity,
    kind: IssueKind,
    assignment: &ZoneAssignment,
    module: Option<&PlacedModule>,
    message: String,
) -> ValidationIssue {
    ValidationIssue {
        severity,
        kind,
        wall: Some(assignment.zone().wall.clone()),
        zone: Some(assignment.zone().id.clone()),
        module: module.map(|m| m.module().to_string()),
        message,
    }
}

fn check_zone(
    assignment: &ZoneAssignment,
    room: &Room,
    catalog: &ModuleCatalog,
    tol: f64,
    issues: &mut Vec<ValidationIssue>,
) {
    use IssueKind::*;
    use Severity::*;

    let zone = assignment.zone();
    if room.wall(&zone.wall).is_none() {
        let message = format!("zone sits on unknown wall `{}`", zone.wall);
        issues.push(issue(Critical, UnknownWall, assignment, None, message));
    }
    if assignment.modules().is_empty() {
        let message = "zone holds no modules".to_string();
        issues.push(issue(Critical, EmptyZone, assignment, None, message));
        return;
    }

    let mut types: Vec<&ModuleType> = Vec::with_capacity(assignment.modules().len());
    let mut cursor = zone.span.start;
    for placed in assignment.modules() {
        let id = placed.module();
        if placed.wall() != zone.wall || placed.zone() != zone.id {
            let message = format!("module `{id}` is tagged for another zone");
            issues.push(issue(Critical, OutsideZone, assignment, Some(placed), message));
        }
        if (placed.offset() - cursor).abs() > tol {
            let message = format!(
                "module `{id}` starts at {:.3}, expected {cursor:.3}",
                placed.offset()
            );
            issues.push(issue(Critical, Gap, assignment, Some(placed), message));
        }
        cursor = placed.end();

        if placed.offset() < zone.span.start - tol || placed.end() > zone.span.end + tol {
            let message = format!(
                "module `{id}` spans [{:.3}, {:.3}) outside the zone",
                placed.offset(),
                placed.end()
            );
            issues.push(issue(Critical, OutsideZone, assignment, Some(placed), message));
        }

        let Some(module) = catalog.get(id) else {
            let message = format!("module `{id}` is not in the catalog");
            issues.push(issue(Critical, UnknownModule, assignment, Some(placed), message));
            continue;
        };
        types.push(module);

        let permitted = zone.categories.contains(&module.category)
            || zone.fallbacks.contains(&module.category);
        if module.category != placed.category() || !permitted {
            let message = format!("module `{id}` ({}) is not permitted here", module.category);
            issues.push(issue(Critical, CategoryMismatch, assignment, Some(placed), message));
        }
        if placed.width() < module.min_width - tol || placed.width() > module.max_width + tol {
            let message = format!(
                "module `{id}` width {:.3} outside [{}, {}]",
                placed.width(),
                module.min_width,
                module.max_width
            );
            issues.push(issue(Critical, WidthOutOfBounds, assignment, Some(placed), message));
        }
    }

    let occupied = assignment.occupied_width();
    if (occupied - zone.len()).abs() > tol {
        let message = format!("modules occupy {occupied:.6} of a {:.6} zone", zone.len());
        issues.push(issue(Critical, ZoneSumMismatch, assignment, None, message));
    }

    if types.len() == assignment.modules().len() && !sequence_satisfies(&types) {
        let message = "neighbour rules are violated".to_string();
        issues.push(issue(Critical, Adjacency, assignment, None, message));
    }

    let present = |c| assignment.modules().iter().any(|m| m.category() == c);
    if !present(zone.primary()) {
        if zone.fallbacks.iter().any(|&c| present(c)) {
            let message = format!("no {} module; a fallback category stands in", zone.primary());
            issues.push(issue(Info, PrimarySubstituted, assignment, None, message));
        } else {
            let message = format!("no {} module in the zone", zone.primary());
            issues.push(issue(Warning, PrimaryMissing, assignment, None, message));
        }
    }
}

fn check_wall(layout: &CandidateLayout, wall: &Wall, tol: f64, issues: &mut Vec<ValidationIssue>) {
    let modules = layout.modules_on(&wall.id);
    let wall_issue = |kind, module: &PlacedModule, message| ValidationIssue {
        severity: Severity::Critical,
        kind,
        wall: Some(wall.id.clone()),
        zone: Some(module.zone().to_string()),
        module: Some(module.module().to_string()),
        message,
    };

    for pair in modules.windows(2) {
        if pair[0].end() > pair[1].offset() + tol {
            let message = format!(
                "modules `{}` and `{}` overlap",
                pair[0].module(),
                pair[1].module()
            );
            issues.push(wall_issue(IssueKind::Overlap, pair[1], message));
        }
    }

    let blocked = wall.blocked();
    for module in &modules {
        let hit = blocked
            .iter()
            .find(|span| module.offset() < span.end - tol && span.start < module.end() - tol);
        if let Some(span) = hit {
            let message = format!(
                "module `{}` intersects blocked span [{}, {})",
                module.module(),
                span.start,
                span.end
            );
            issues.push(wall_issue(IssueKind::BlockedSpan, module, message));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{AdjacencyRule, Category, ModuleType, Side};
    use crate::geometry::{Interval, Opening};
    use crate::zone::Zone;

    fn catalog() -> ModuleCatalog {
        ModuleCatalog::new([
            ModuleType::rigid("hob", Category::Cook, 60.0)
                .with_rule(AdjacencyRule::forbid(Category::Clean, Side::Either)),
            ModuleType::rigid("sink", Category::Clean, 60.0),
            ModuleType::elastic("drawer", Category::Prep, 40.0, 80.0, 1.0),
        ])
        .unwrap()
    }

    fn zone(id: &str, categories: Vec<Category>, start: f64, end: f64) -> Zone {
        Zone {
            id: id.into(),
            wall: "north".into(),
            name: id.into(),
            order: 0,
            categories,
            fallbacks: Vec::new(),
            span: Interval::new(start, end),
        }
    }

    fn placed(
        module: &str,
        category: Category,
        zone: &str,
        offset: f64,
        width: f64,
    ) -> PlacedModule {
        PlacedModule::new(module.into(), category, "north".into(), zone.into(), offset, width)
    }

    fn kinds(issues: &[ValidationIssue]) -> Vec<IssueKind> {
        issues.iter().map(|i| i.kind).collect()
    }

    #[test]
    fn clean_layout_has_no_issues() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let layout = CandidateLayout::new(vec![
            ZoneAssignment::new(
                zone("a", vec![Category::Prep], 0.0, 70.0),
                vec![placed("drawer", Category::Prep, "a", 0.0, 70.0)],
            ),
            ZoneAssignment::new(
                zone("b", vec![Category::Cook], 70.0, 130.0),
                vec![placed("hob", Category::Cook, "b", 70.0, 60.0)],
            ),
        ]);
        let issues = validate_layout(&layout, &room, &catalog(), 1e-6);
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn width_and_sum_violations_are_critical() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let layout = CandidateLayout::new(vec![ZoneAssignment::new(
            zone("a", vec![Category::Prep], 0.0, 100.0),
            vec![placed("drawer", Category::Prep, "a", 0.0, 90.0)],
        )]);
        let issues = validate_layout(&layout, &room, &catalog(), 1e-6);
        assert!(has_critical(&issues));
        assert_eq!(kinds(&issues), vec![IssueKind::WidthOutOfBounds, IssueKind::ZoneSumMismatch]);
    }

    #[test]
    fn blocked_spans_and_overlaps_are_reported() {
        let room = Room::new(vec![
            Wall::new("north", 300.0).with_opening(Opening::door(100.0, 190.0)),
        ]);
        let layout = CandidateLayout::new(vec![
            ZoneAssignment::new(
                zone("a", vec![Category::Cook], 60.0, 120.0),
                vec![placed("hob", Category::Cook, "a", 60.0, 60.0)],
            ),
            ZoneAssignment::new(
                zone("b", vec![Category::Clean], 110.0, 170.0),
                vec![placed("sink", Category::Clean, "b", 110.0, 60.0)],
            ),
        ]);
        let issues = validate_layout(&layout, &room, &catalog(), 1e-6);
        let found = kinds(&issues);
        assert!(found.contains(&IssueKind::Overlap));
        assert_eq!(found.iter().filter(|k| **k == IssueKind::BlockedSpan).count(), 2);
    }

    #[test]
    fn adjacency_and_unknown_modules_are_caught() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let layout = CandidateLayout::new(vec![
            ZoneAssignment::new(
                zone("a", vec![Category::Cook, Category::Clean], 0.0, 120.0),
                vec![
                    placed("hob", Category::Cook, "a", 0.0, 60.0),
                    placed("sink", Category::Clean, "a", 60.0, 60.0),
                ],
            ),
            ZoneAssignment::new(
                zone("b", vec![Category::Prep], 120.0, 180.0),
                vec![placed("ghost", Category::Prep, "b", 120.0, 60.0)],
            ),
        ]);
        let issues = validate_layout(&layout, &room, &catalog(), 1e-6);
        let found = kinds(&issues);
        assert!(found.contains(&IssueKind::Adjacency));
        assert!(found.contains(&IssueKind::UnknownModule));
    }

    #[test]
    fn substituted_primary_is_informational() {
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let mut z = zone("a", vec![Category::Appliance], 0.0, 60.0);
        z.fallbacks = vec![Category::Cook];
        let layout = CandidateLayout::new(vec![ZoneAssignment::new(
            z,
            vec![placed("hob", Category::Cook, "a", 0.0, 60.0)],
        )]);
        let issues = validate_layout(&layout, &room, &catalog(), 1e-6);
        assert_eq!(kinds(&issues), vec![IssueKind::PrimarySubstituted]);
        assert!(!has_critical(&issues));
    }
}
