use crate::catalog::{ModuleCatalog, ModuleType};
use crate::error::{LayoutError, Result};
use crate::layout::{PlacedModule, ZoneAssignment};
use crate::solver::ZoneCombination;
use crate::zone::Zone;

/// One stretchable length taking part in a water-fill pass.
#[derive(Debug, Clone)]
pub(crate) struct Segment {
    pub length: f64,
    pub max: f64,
    pub flex: f64,
    pub locked: bool,
}

impl Segment {
    pub fn new(length: f64, max: f64, flex: f64) -> Self {
        Self {
            length,
            max,
            flex,
            locked: false,
        }
    }
}

/// Spreads `slack` over the segments in proportion to their flex weight,
/// clipping each at its maximum and handing the overflow to the segments
/// that are still open. Returns the slack that could not be placed.
///
/// Every pass that does not finish locks at least one segment, so the loop
/// runs at most `segments.len() + 1` times.
pub(crate) fn water_fill(segments: &mut [Segment], slack: f64, tolerance: f64) -> f64 {
    let mut slack = slack.max(0.0);
    for segment in segments.iter_mut() {
        segment.locked = segment.flex <= 0.0 || segment.length >= segment.max - tolerance;
    }

    for _ in 0..=segments.len() {
        if slack <= tolerance {
            return 0.0;
        }

        let total_flex: f64 = segments
            .iter()
            .filter(|s| !s.locked)
            .map(|s| s.flex)
            .sum();
        if total_flex <= 0.0 {
            break;
        }

        let overflows = segments
            .iter()
            .filter(|s| !s.locked)
            .any(|s| s.length + slack * s.flex / total_flex >= s.max - tolerance);

        if !overflows {
            for segment in segments.iter_mut().filter(|s| !s.locked) {
                segment.length += slack * segment.flex / total_flex;
            }
            return 0.0;
        }

        let mut absorbed = 0.0;
        for segment in segments.iter_mut().filter(|s| !s.locked) {
            let share = slack * segment.flex / total_flex;
            if segment.length + share >= segment.max - tolerance {
                absorbed += segment.max - segment.length;
                segment.length = segment.max;
                segment.locked = true;
            }
        }
        slack -= absorbed;
    }

    slack.max(0.0)
}

/// Resolves solver combinations into concrete module placements.
#[derive(Debug, Clone, Copy)]
pub struct ElasticResolver {
    tolerance: f64,
}

impl Default for ElasticResolver {
    fn default() -> Self {
        Self { tolerance: 1e-6 }
    }
}

impl ElasticResolver {
    pub fn new(tolerance: f64) -> Self {
        Self { tolerance }
    }

    /// Computes exact widths for `combination` so that it fills `zone`
    /// edge to edge.
    pub fn resolve(
        &self,
        zone: &Zone,
        combination: &ZoneCombination,
        catalog: &ModuleCatalog,
    ) -> Result<ZoneAssignment> {
        let modules = combination
            .modules
            .iter()
            .map(|id| catalog.require(id))
            .collect::<Result<Vec<&ModuleType>>>()?;
        let widths = self.resolve_widths(zone, &modules)?;

        let mut cursor = zone.span.start;
        let placed = modules
            .iter()
            .zip(widths)
            .map(|(module, width)| {
                let placed = PlacedModule::new(
                    module.id.clone(),
                    module.category,
                    zone.wall.clone(),
                    zone.id.clone(),
                    cursor,
                    width,
                );
                cursor += width;
                placed
            })
            .collect();

        Ok(ZoneAssignment::new(zone.clone(), placed))
    }

    /// Final widths for `modules` in order, summing to the zone span.
    pub fn resolve_widths(&self, zone: &Zone, modules: &[&ModuleType]) -> Result<Vec<f64>> {
        if modules.is_empty() {
            return Err(LayoutError::InvariantViolation(format!(
                "zone `{}` resolved with no modules",
                zone.id
            )));
        }

        let span = zone.span.len();
        let min_total: f64 = modules.iter().map(|m| m.min_width).sum();
        let slack = span - min_total;
        if slack < -self.tolerance {
            return Err(LayoutError::InvariantViolation(format!(
                "zone `{}` received a combination {:.3} wider than its span",
                zone.id, -slack
            )));
        }

        let mut segments: Vec<Segment> = modules
            .iter()
            .map(|m| Segment::new(m.min_width, m.max_width, m.elasticity))
            .collect();
        let residual = water_fill(&mut segments, slack, self.tolerance);
        if residual > self.tolerance {
            return Err(LayoutError::OverSpanInfeasible {
                wall: zone.wall.clone(),
                zone: zone.id.clone(),
                residual,
            });
        }

        let mut widths: Vec<f64> = segments.into_iter().map(|s| s.length).collect();
        absorb_rounding(&mut widths, modules, span);
        Ok(widths)
    }
}

/// Folds floating-point drift back into the last module that can take it so
/// the widths sum to `span` as exactly as the representation allows.
fn absorb_rounding(widths: &mut [f64], modules: &[&ModuleType], span: f64) {
    let drift = span - widths.iter().sum::<f64>();
    if drift == 0.0 {
        return;
    }
    let target = (0..widths.len()).rev().find(|&idx| {
        let adjusted = widths[idx] + drift;
        adjusted >= modules[idx].min_width && adjusted <= modules[idx].max_width
    });
    if let Some(idx) = target {
        widths[idx] += drift;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Category;
    use crate::geometry::Interval;

    fn zone(span: f64) -> Zone {
        Zone {
            id: "north:z0".into(),
            wall: "north".into(),
            name: "store".into(),
            order: 0,
            categories: vec![Category::Store],
            fallbacks: Vec::new(),
            span: Interval::new(100.0, 100.0 + span),
        }
    }

    #[test]
    fn water_fill_splits_by_weight() {
        let mut segments = vec![
            Segment::new(10.0, 100.0, 1.0),
            Segment::new(10.0, 100.0, 3.0),
        ];
        let residual = water_fill(&mut segments, 40.0, 1e-9);
        assert_eq!(residual, 0.0);
        assert!((segments[0].length - 20.0).abs() < 1e-9);
        assert!((segments[1].length - 40.0).abs() < 1e-9);
    }

    #[test]
    fn water_fill_redistributes_clipped_overflow() {
        let mut segments = vec![
            Segment::new(0.0, 5.0, 1.0),
            Segment::new(0.0, 100.0, 1.0),
            Segment::new(0.0, 100.0, 0.0),
        ];
        let residual = water_fill(&mut segments, 30.0, 1e-9);
        assert_eq!(residual, 0.0);
        assert_eq!(segments[0].length, 5.0);
        assert!((segments[1].length - 25.0).abs() < 1e-9);
        assert_eq!(segments[2].length, 0.0);
    }

    #[test]
    fn water_fill_reports_unplaceable_slack() {
        let mut segments = vec![Segment::new(0.0, 10.0, 1.0), Segment::new(0.0, 10.0, 2.0)];
        let residual = water_fill(&mut segments, 25.0, 1e-9);
        assert!((residual - 5.0).abs() < 1e-9);
        assert!(segments.iter().all(|s| s.locked));
    }

    #[test]
    fn resolve_fills_span_exactly() {
        let rigid = ModuleType::rigid("store-60", Category::Store, 60.0);
        let tall = ModuleType::elastic("tall", Category::Store, 60.0, 120.0, 1.0);
        let resolver = ElasticResolver::default();
        let widths = resolver
            .resolve_widths(&zone(150.0), &[&rigid, &tall])
            .unwrap();
        assert_eq!(widths, vec![60.0, 90.0]);
    }

    #[test]
    fn resolve_places_modules_from_zone_start() {
        let catalog = ModuleCatalog::new([
            ModuleType::rigid("store-60", Category::Store, 60.0),
            ModuleType::elastic("filler", Category::Filler, 5.0, 30.0, 1.0),
        ])
        .unwrap();
        let combination = ZoneCombination::from_modules(
            vec!["store-60".into(), "filler".into()],
            &catalog,
            80.0,
        )
        .unwrap();
        let assignment = ElasticResolver::default()
            .resolve(&zone(80.0), &combination, &catalog)
            .unwrap();

        let modules = assignment.modules();
        assert_eq!(modules.len(), 2);
        assert_eq!(modules[0].offset(), 100.0);
        assert_eq!(modules[1].offset(), 160.0);
        assert!((modules[1].width() - 20.0).abs() < 1e-9);
    }

    #[test]
    fn excess_slack_is_over_span() {
        let filler = ModuleType::elastic("filler", Category::Filler, 5.0, 30.0, 1.0);
        let err = ElasticResolver::default()
            .resolve_widths(&zone(50.0), &[&filler])
            .unwrap_err();
        match err {
            LayoutError::OverSpanInfeasible { zone, residual, .. } => {
                assert_eq!(zone, "north:z0");
                assert!((residual - 20.0).abs() < 1e-6);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn negative_slack_is_an_invariant_violation() {
        let rigid = ModuleType::rigid("store-60", Category::Store, 60.0);
        let err = ElasticResolver::default()
            .resolve_widths(&zone(50.0), &[&rigid])
            .unwrap_err();
        assert!(err.is_internal());
    }
}
