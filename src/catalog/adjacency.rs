//! Neighbour rules between modules placed side by side in a zone.
//!
//! Left and right are taken in wall order. A zone boundary counts as "no
//! neighbour": it never violates a forbidden rule and always satisfies a
//! required one.

use serde::{Deserialize, Serialize};

use super::core::{Category, ModuleType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    /// Symmetric rule, checked against both neighbours.
    Either,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AdjacencyKind {
    Forbidden,
    Required,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdjacencyRule {
    pub kind: AdjacencyKind,
    pub category: Category,
    pub side: Side,
}

impl AdjacencyRule {
    pub const fn forbid(category: Category, side: Side) -> Self {
        Self {
            kind: AdjacencyKind::Forbidden,
            category,
            side,
        }
    }

    pub const fn require(category: Category, side: Side) -> Self {
        Self {
            kind: AdjacencyKind::Required,
            category,
            side,
        }
    }

    fn holds(&self, left: Option<Category>, right: Option<Category>) -> bool {
        let is = |n: Option<Category>| n == Some(self.category);
        let open_or_is = |n: Option<Category>| n.is_none() || n == Some(self.category);
        match (self.kind, self.side) {
            (AdjacencyKind::Forbidden, Side::Left) => !is(left),
            (AdjacencyKind::Forbidden, Side::Right) => !is(right),
            (AdjacencyKind::Forbidden, Side::Either) => !is(left) && !is(right),
            (AdjacencyKind::Required, Side::Left) => open_or_is(left),
            (AdjacencyKind::Required, Side::Right) => open_or_is(right),
            (AdjacencyKind::Required, Side::Either) => open_or_is(left) || open_or_is(right),
        }
    }
}

/// Whether every rule of `module` holds with the given neighbours.
pub fn fits_between(
    left: Option<&ModuleType>,
    module: &ModuleType,
    right: Option<&ModuleType>,
) -> bool {
    let left = left.map(|m| m.category);
    let right = right.map(|m| m.category);
    module.adjacency.iter().all(|rule| rule.holds(left, right))
}

/// Checks the rules that placing `next` directly right of `prev` settles for
/// good. Symmetric required rules can still be met by the other neighbour,
/// so those wait for [`sequence_satisfies`].
pub fn can_follow(prev: &ModuleType, next: &ModuleType) -> bool {
    let prev_ok = prev.adjacency.iter().all(|rule| match (rule.kind, rule.side) {
        (AdjacencyKind::Forbidden, Side::Right | Side::Either) => next.category != rule.category,
        (AdjacencyKind::Required, Side::Right) => next.category == rule.category,
        _ => true,
    });
    let next_ok = next.adjacency.iter().all(|rule| match (rule.kind, rule.side) {
        (AdjacencyKind::Forbidden, Side::Left | Side::Either) => prev.category != rule.category,
        (AdjacencyKind::Required, Side::Left) => prev.category == rule.category,
        _ => true,
    });
    prev_ok && next_ok
}

/// Full check of an ordered zone sequence, boundaries included.
pub fn sequence_satisfies(sequence: &[&ModuleType]) -> bool {
    sequence.iter().enumerate().all(|(idx, module)| {
        let left = idx.checked_sub(1).map(|i| sequence[i]);
        let right = sequence.get(idx + 1).copied();
        fits_between(left, module, right)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hob() -> ModuleType {
        ModuleType::rigid("hob", Category::Cook, 60.0)
            .with_rule(AdjacencyRule::forbid(Category::Clean, Side::Either))
    }

    fn sink() -> ModuleType {
        ModuleType::rigid("sink", Category::Clean, 60.0)
    }

    fn landing() -> ModuleType {
        ModuleType::rigid("landing", Category::Prep, 30.0)
    }

    #[test]
    fn symmetric_forbidden_rule_blocks_both_sides() {
        let (hob, sink) = (hob(), sink());
        assert!(!can_follow(&hob, &sink));
        assert!(!can_follow(&sink, &hob));
        assert!(!sequence_satisfies(&[&sink, &hob]));
        assert!(sequence_satisfies(&[&sink, &landing(), &hob]));
    }

    #[test]
    fn directional_forbidden_rule_only_checks_its_side() {
        let oven = ModuleType::rigid("oven", Category::Appliance, 60.0)
            .with_rule(AdjacencyRule::forbid(Category::Store, Side::Left));
        let pantry = ModuleType::rigid("pantry", Category::Store, 60.0);

        assert!(!can_follow(&pantry, &oven));
        assert!(can_follow(&oven, &pantry));
        assert!(sequence_satisfies(&[&oven, &pantry]));
        assert!(!sequence_satisfies(&[&pantry, &oven]));
    }

    #[test]
    fn required_neighbour_is_satisfied_by_zone_boundary() {
        let dishwasher = ModuleType::rigid("dishwasher", Category::Appliance, 60.0)
            .with_rule(AdjacencyRule::require(Category::Clean, Side::Left));
        let sink = sink();
        let landing = landing();

        assert!(sequence_satisfies(&[&dishwasher]));
        assert!(sequence_satisfies(&[&sink, &dishwasher]));
        assert!(!sequence_satisfies(&[&landing, &dishwasher]));
        assert!(!can_follow(&landing, &dishwasher));
    }

    #[test]
    fn symmetric_required_rule_accepts_either_neighbour() {
        let dishwasher = ModuleType::rigid("dishwasher", Category::Appliance, 60.0)
            .with_rule(AdjacencyRule::require(Category::Clean, Side::Either));
        let (sink, landing) = (sink(), landing());

        assert!(can_follow(&landing, &dishwasher));
        assert!(sequence_satisfies(&[&landing, &dishwasher, &sink]));
        assert!(!sequence_satisfies(&[&landing, &dishwasher, &landing]));
    }
}
