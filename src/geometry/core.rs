use serde::{Deserialize, Serialize};

use crate::error::{LayoutError, Result};

pub type WallId = String;

/// Tolerance used when comparing interval endpoints.
const EPS: f64 = 1e-9;

/// Half-open span `[start, end)` along a wall, in centimetres.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f64,
    pub end: f64,
}

impl Interval {
    pub const fn new(start: f64, end: f64) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f64 {
        (self.end - self.start).max(0.0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= EPS
    }

    /// True when the two spans share more than a boundary point.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end - EPS && other.start < self.end - EPS
    }

    pub fn contains(&self, other: &Interval) -> bool {
        other.start >= self.start - EPS && other.end <= self.end + EPS
    }
}

/// Point in the floor plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn euclidean(&self, other: &Point) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }

    pub fn manhattan(&self, other: &Point) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }
}

/// Axis-aligned direction a wall runs in, from its origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Heading {
    #[default]
    East,
    North,
    West,
    South,
}

impl Heading {
    /// Unit vector along the wall.
    pub fn unit(self) -> (f64, f64) {
        match self {
            Heading::East => (1.0, 0.0),
            Heading::North => (0.0, 1.0),
            Heading::West => (-1.0, 0.0),
            Heading::South => (0.0, -1.0),
        }
    }

    /// Unit vector pointing into the room (left of the direction of travel).
    pub fn inward(self) -> (f64, f64) {
        let (dx, dy) = self.unit();
        (-dy, dx)
    }

    /// Walls running along the same axis (either direction).
    pub fn is_parallel(self, other: Heading) -> bool {
        matches!(
            (self, other),
            (Heading::East | Heading::West, Heading::East | Heading::West)
                | (Heading::North | Heading::South, Heading::North | Heading::South)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpeningKind {
    Door,
    Window,
}

/// Door or window interrupting a wall run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub kind: OpeningKind,
    pub span: Interval,
}

impl Opening {
    pub const fn door(start: f64, end: f64) -> Self {
        Self {
            kind: OpeningKind::Door,
            span: Interval::new(start, end),
        }
    }

    pub const fn window(start: f64, end: f64) -> Self {
        Self {
            kind: OpeningKind::Window,
            span: Interval::new(start, end),
        }
    }
}

/// One straight wall segment of the room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wall {
    pub id: WallId,
    pub length: f64,
    #[serde(default)]
    pub obstructions: Vec<Interval>,
    #[serde(default)]
    pub openings: Vec<Opening>,
    #[serde(default)]
    pub origin: Point,
    #[serde(default)]
    pub heading: Heading,
    /// Span held back at the start of the wall for an inner corner.
    #[serde(default)]
    pub start_reserved: f64,
    /// Span held back at the end of the wall for an inner corner.
    #[serde(default)]
    pub end_reserved: f64,
}

impl Wall {
    pub fn new(id: impl Into<WallId>, length: f64) -> Self {
        Self {
            id: id.into(),
            length,
            obstructions: Vec::new(),
            openings: Vec::new(),
            origin: Point::default(),
            heading: Heading::default(),
            start_reserved: 0.0,
            end_reserved: 0.0,
        }
    }

    pub fn with_obstruction(mut self, start: f64, end: f64) -> Self {
        self.obstructions.push(Interval::new(start, end));
        self
    }

    pub fn with_opening(mut self, opening: Opening) -> Self {
        self.openings.push(opening);
        self
    }

    pub fn placed(mut self, origin: Point, heading: Heading) -> Self {
        self.origin = origin;
        self.heading = heading;
        self
    }

    pub fn with_corner_reservations(mut self, start: f64, end: f64) -> Self {
        self.start_reserved = start;
        self.end_reserved = end;
        self
    }

    /// Obstructions and openings, sorted by start. These are the spans that
    /// must never be occupied and that seams may align with.
    pub fn features(&self) -> Vec<Interval> {
        let mut spans: Vec<Interval> = self
            .obstructions
            .iter()
            .copied()
            .chain(self.openings.iter().map(|o| o.span))
            .collect();
        spans.sort_by(|a, b| a.start.total_cmp(&b.start));
        spans
    }

    /// Every unoccupiable span including corner reservations, sorted.
    pub fn blocked(&self) -> Vec<Interval> {
        let mut spans = self.features();
        if self.start_reserved > EPS {
            spans.push(Interval::new(0.0, self.start_reserved.min(self.length)));
        }
        if self.end_reserved > EPS {
            spans.push(Interval::new(
                (self.length - self.end_reserved).max(0.0),
                self.length,
            ));
        }
        spans.sort_by(|a, b| a.start.total_cmp(&b.start));
        spans
    }

    /// Maximal unblocked runs, in wall order.
    pub fn free_runs(&self) -> Vec<Interval> {
        let mut runs = Vec::new();
        let mut cursor = 0.0_f64;
        for span in self.blocked() {
            if span.start > cursor + EPS {
                runs.push(Interval::new(cursor, span.start));
            }
            cursor = cursor.max(span.end);
        }
        if self.length > cursor + EPS {
            runs.push(Interval::new(cursor, self.length));
        }
        runs
    }

    /// Floor-plane point at `offset` along the wall, pushed `depth` into the room.
    pub fn point_at(&self, offset: f64, depth: f64) -> Point {
        let (dx, dy) = self.heading.unit();
        let (nx, ny) = self.heading.inward();
        Point::new(
            self.origin.x + dx * offset + nx * depth,
            self.origin.y + dy * offset + ny * depth,
        )
    }

    fn validate(&self) -> Result<()> {
        let invalid = |reason: String| LayoutError::InvalidRoom {
            wall: self.id.clone(),
            reason,
        };

        if !(self.length.is_finite() && self.length > 0.0) {
            return Err(invalid(format!("length {} must be positive", self.length)));
        }
        if self.start_reserved < 0.0
            || self.end_reserved < 0.0
            || self.start_reserved + self.end_reserved > self.length + EPS
        {
            return Err(invalid("corner reservations exceed wall length".into()));
        }

        let features = self.features();
        for span in &features {
            if !(span.start.is_finite() && span.end.is_finite()) || span.end <= span.start {
                return Err(invalid(format!(
                    "interval [{}, {}) is empty or inverted",
                    span.start, span.end
                )));
            }
            if span.start < -EPS || span.end > self.length + EPS {
                return Err(invalid(format!(
                    "interval [{}, {}) lies outside [0, {}]",
                    span.start, span.end, self.length
                )));
            }
        }
        for pair in features.windows(2) {
            if pair[0].overlaps(&pair[1]) {
                return Err(invalid(format!(
                    "intervals [{}, {}) and [{}, {}) overlap",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }
        Ok(())
    }
}

/// Ordered wall segments plus optional floor area (m²) for the storage index.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub walls: Vec<Wall>,
    #[serde(default)]
    pub floor_area: Option<f64>,
}

impl Room {
    pub fn new(walls: Vec<Wall>) -> Self {
        Self {
            walls,
            floor_area: None,
        }
    }

    pub fn with_floor_area(mut self, square_metres: f64) -> Self {
        self.floor_area = Some(square_metres);
        self
    }

    pub fn wall(&self, id: &str) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id == id)
    }

    pub fn validate(&self) -> Result<()> {
        if self.walls.is_empty() {
            return Err(LayoutError::InvalidRoom {
                wall: String::new(),
                reason: "room has no walls".into(),
            });
        }
        for (idx, wall) in self.walls.iter().enumerate() {
            if self.walls[..idx].iter().any(|w| w.id == wall.id) {
                return Err(LayoutError::InvalidRoom {
                    wall: wall.id.clone(),
                    reason: "duplicate wall id".into(),
                });
            }
            wall.validate()?;
        }
        Ok(())
    }

    /// Largest distance between any two wall endpoints; used as the
    /// worst-case travel leg.
    pub fn diameter(&self) -> f64 {
        let points: Vec<Point> = self
            .walls
            .iter()
            .flat_map(|w| [w.point_at(0.0, 0.0), w.point_at(w.length, 0.0)])
            .collect();
        let mut best = 0.0_f64;
        for (i, a) in points.iter().enumerate() {
            for b in &points[i + 1..] {
                best = best.max(a.euclidean(b));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_runs_skip_openings_and_reservations() {
        let wall = Wall::new("north", 400.0)
            .with_opening(Opening::door(100.0, 190.0))
            .with_obstruction(300.0, 320.0)
            .with_corner_reservations(0.0, 65.0);

        let runs = wall.free_runs();
        assert_eq!(
            runs,
            vec![
                Interval::new(0.0, 100.0),
                Interval::new(190.0, 300.0),
                Interval::new(320.0, 335.0),
            ]
        );
    }

    #[test]
    fn wall_without_features_is_one_run() {
        let wall = Wall::new("north", 300.0);
        assert_eq!(wall.free_runs(), vec![Interval::new(0.0, 300.0)]);
    }

    #[test]
    fn overlapping_features_are_rejected() {
        let room = Room::new(vec![
            Wall::new("north", 300.0)
                .with_obstruction(10.0, 50.0)
                .with_opening(Opening::window(40.0, 80.0)),
        ]);
        let err = room.validate().unwrap_err();
        assert!(matches!(err, LayoutError::InvalidRoom { ref wall, .. } if wall == "north"));
    }

    #[test]
    fn features_outside_wall_are_rejected() {
        let room = Room::new(vec![Wall::new("east", 100.0).with_obstruction(90.0, 120.0)]);
        assert!(room.validate().is_err());
    }

    #[test]
    fn touching_features_are_allowed() {
        let room = Room::new(vec![
            Wall::new("north", 300.0)
                .with_obstruction(10.0, 50.0)
                .with_opening(Opening::window(50.0, 80.0)),
        ]);
        assert!(room.validate().is_ok());
    }

    #[test]
    fn point_at_follows_heading_and_depth() {
        let wall = Wall::new("east", 200.0).placed(Point::new(300.0, 0.0), Heading::North);
        let p = wall.point_at(100.0, 60.0);
        assert!((p.x - 240.0).abs() < 1e-9);
        assert!((p.y - 100.0).abs() < 1e-9);
        assert!(Heading::North.is_parallel(Heading::South));
        assert!(!Heading::North.is_parallel(Heading::East));
    }

    #[test]
    fn diameter_spans_l_shaped_room() {
        let room = Room::new(vec![
            Wall::new("a", 300.0),
            Wall::new("b", 400.0).placed(Point::new(300.0, 0.0), Heading::North),
        ]);
        assert!((room.diameter() - 500.0).abs() < 1e-9);
    }
}
