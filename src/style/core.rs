use serde::{Deserialize, Serialize};

use crate::catalog::Category;
use crate::geometry::{Heading, Room, Wall};
use crate::layout::{CandidateLayout, PlacedModule};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub rhythm_weight: f64,
    pub alignment_weight: f64,
    /// Largest offset (cm) at which two reference lines still count as one.
    pub alignment_tolerance: f64,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            rhythm_weight: 0.6,
            alignment_weight: 0.4,
            alignment_tolerance: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleReport {
    /// 0 to 100; uniform widths within each category score highest.
    pub rhythm: f64,
    /// 0 to 100; share of seams sitting on a shared reference line.
    pub alignment: f64,
    pub seams: usize,
    pub aligned_seams: usize,
    pub score: f64,
}

/// A joint between two adjacent modules on one wall.
#[derive(Debug, Clone, Copy)]
struct Seam<'w> {
    wall: &'w Wall,
    offset: f64,
}

impl Seam<'_> {
    /// Coordinate of the vertical line through this seam, along the axis
    /// the wall runs on.
    fn axis_coordinate(&self) -> f64 {
        let point = self.wall.point_at(self.offset, 0.0);
        match self.wall.heading {
            Heading::East | Heading::West => point.x,
            Heading::North | Heading::South => point.y,
        }
    }
}

pub struct StyleCritic<'a> {
    config: &'a StyleConfig,
}

impl<'a> StyleCritic<'a> {
    pub fn new(config: &'a StyleConfig) -> Self {
        Self { config }
    }

    pub fn evaluate(&self, layout: &CandidateLayout, room: &Room) -> StyleReport {
        let rhythm = rhythm(layout);
        let seams = seams(layout, room, self.config.alignment_tolerance);
        let aligned = seams
            .iter()
            .filter(|seam| self.is_aligned(seam, &seams))
            .count();
        let alignment = if seams.is_empty() {
            100.0
        } else {
            100.0 * aligned as f64 / seams.len() as f64
        };

        let rw = self.config.rhythm_weight.max(0.0);
        let aw = self.config.alignment_weight.max(0.0);
        let score = if rw + aw > 0.0 {
            (rw * rhythm + aw * alignment) / (rw + aw)
        } else {
            (rhythm + alignment) / 2.0
        };

        StyleReport {
            rhythm,
            alignment,
            seams: seams.len(),
            aligned_seams: aligned,
            score,
        }
    }

    fn is_aligned(&self, seam: &Seam<'_>, all: &[Seam<'_>]) -> bool {
        let tol = self.config.alignment_tolerance;
        let on_feature = seam
            .wall
            .features()
            .iter()
            .any(|f| (f.start - seam.offset).abs() <= tol || (f.end - seam.offset).abs() <= tol);
        if on_feature {
            return true;
        }
        let axis = seam.axis_coordinate();
        all.iter().any(|other| {
            other.wall.id != seam.wall.id
                && other.wall.heading.is_parallel(seam.wall.heading)
                && (other.axis_coordinate() - axis).abs() <= tol
        })
    }
}

/// 100 × (1 − mean coefficient of variation), the mean weighted by how many
/// modules each category has.
fn rhythm(layout: &CandidateLayout) -> f64 {
    let mut total = 0usize;
    let mut weighted = 0.0;
    for category in Category::ALL {
        let widths: Vec<f64> = layout
            .modules()
            .filter(|m| m.category() == category)
            .map(PlacedModule::width)
            .collect();
        if widths.is_empty() {
            continue;
        }
        let n = widths.len() as f64;
        let mean = widths.iter().sum::<f64>() / n;
        let variance = widths.iter().map(|w| (w - mean).powi(2)).sum::<f64>() / n;
        let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };
        weighted += cv * n;
        total += widths.len();
    }
    if total == 0 {
        return 100.0;
    }
    100.0 * (1.0 - (weighted / total as f64).min(1.0))
}

fn seams<'w>(layout: &CandidateLayout, room: &'w Room, tolerance: f64) -> Vec<Seam<'w>> {
    let mut seams = Vec::new();
    for wall in &room.walls {
        let modules = layout.modules_on(&wall.id);
        for pair in modules.windows(2) {
            if (pair[1].offset() - pair[0].end()).abs() <= tolerance {
                seams.push(Seam {
                    wall,
                    offset: pair[0].end(),
                });
            }
        }
    }
    seams
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Interval, Opening, Point};
    use crate::layout::ZoneAssignment;
    use crate::zone::Zone;

    fn layout(modules: &[(&str, Category, f64, f64)]) -> CandidateLayout {
        let assignments = modules
            .iter()
            .enumerate()
            .map(|(idx, &(wall, category, offset, width))| {
                let zone = Zone {
                    id: format!("{wall}:z{idx}"),
                    wall: wall.into(),
                    name: category.as_str().into(),
                    order: idx,
                    categories: vec![category],
                    fallbacks: Vec::new(),
                    span: Interval::new(offset, offset + width),
                };
                let placed = PlacedModule::new(
                    format!("m{idx}"),
                    category,
                    wall.into(),
                    zone.id.clone(),
                    offset,
                    width,
                );
                ZoneAssignment::new(zone, vec![placed])
            })
            .collect();
        CandidateLayout::new(assignments)
    }

    #[test]
    fn uniform_widths_keep_full_rhythm() {
        use Category::*;
        let config = StyleConfig::default();
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let even = layout(&[("north", Prep, 0.0, 60.0), ("north", Prep, 60.0, 60.0)]);
        let uneven = layout(&[("north", Prep, 0.0, 30.0), ("north", Prep, 30.0, 90.0)]);

        let critic = StyleCritic::new(&config);
        assert_eq!(critic.evaluate(&even, &room).rhythm, 100.0);
        // Widths 30 and 90: mean 60, deviation 30.
        assert!((critic.evaluate(&uneven, &room).rhythm - 50.0).abs() < 1e-9);
    }

    #[test]
    fn seams_facing_each_other_across_a_galley_align() {
        use Category::*;
        let config = StyleConfig::default();
        let room = Room::new(vec![
            Wall::new("north", 300.0),
            Wall::new("south", 300.0).placed(Point::new(300.0, 240.0), Heading::West),
        ]);
        let layout = layout(&[
            ("north", Prep, 0.0, 60.0),
            ("north", Cook, 60.0, 90.0),
            ("south", Store, 150.0, 90.0),
            ("south", Clean, 240.0, 60.0),
        ]);
        let report = StyleCritic::new(&config).evaluate(&layout, &room);

        // North seams at x=60 and x=150; south seam at x=60.
        assert_eq!(report.seams, 3);
        assert_eq!(report.aligned_seams, 2);
    }

    #[test]
    fn seam_on_window_edge_counts_as_aligned() {
        use Category::*;
        let config = StyleConfig::default();
        let room = Room::new(vec![
            Wall::new("north", 300.0).with_opening(Opening::window(60.0, 150.0)),
        ]);
        let layout = layout(&[
            ("north", Clean, 0.0, 60.0),
            ("north", Prep, 60.0, 45.0),
            ("north", Prep, 105.0, 45.0),
        ]);
        let report = StyleCritic::new(&config).evaluate(&layout, &room);

        assert_eq!(report.seams, 2);
        assert_eq!(report.aligned_seams, 1);
        assert!((report.alignment - 50.0).abs() < 1e-9);
    }

    #[test]
    fn weights_blend_the_two_scores() {
        use Category::*;
        let config = StyleConfig {
            rhythm_weight: 1.0,
            alignment_weight: 0.0,
            ..StyleConfig::default()
        };
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let layout = layout(&[("north", Prep, 0.0, 30.0), ("north", Prep, 30.0, 90.0)]);
        let report = StyleCritic::new(&config).evaluate(&layout, &room);
        assert_eq!(report.score, report.rhythm);
    }

    #[test]
    fn layout_without_seams_is_fully_aligned() {
        use Category::*;
        let config = StyleConfig::default();
        let room = Room::new(vec![Wall::new("north", 300.0)]);
        let layout = layout(&[("north", Prep, 0.0, 60.0)]);
        let report = StyleCritic::new(&config).evaluate(&layout, &room);
        assert_eq!(report.alignment, 100.0);
        assert_eq!(report.score, 100.0);
    }
}
