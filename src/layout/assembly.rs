//! Enumeration of whole-room candidates from per-zone alternatives.

use std::collections::BTreeSet;

/// Picks up to `limit` index vectors (one alternative index per zone), best
/// first: ordered by the sum of alternative ranks, then lexicographically.
/// The order is a pure function of `counts` and `limit`.
pub(crate) fn enumerate_choices(counts: &[usize], limit: usize) -> Vec<Vec<usize>> {
    if limit == 0 || counts.iter().any(|&c| c == 0) {
        return Vec::new();
    }

    let start = vec![0usize; counts.len()];
    let mut frontier: BTreeSet<(usize, Vec<usize>)> = BTreeSet::new();
    let mut seen: BTreeSet<Vec<usize>> = BTreeSet::new();
    seen.insert(start.clone());
    frontier.insert((0, start));

    let mut out = Vec::new();
    while let Some((rank, choice)) = frontier.pop_first() {
        for zone in 0..choice.len() {
            if choice[zone] + 1 < counts[zone] {
                let mut next = choice.clone();
                next[zone] += 1;
                if seen.insert(next.clone()) {
                    frontier.insert((rank + 1, next));
                }
            }
        }
        out.push(choice);
        if out.len() >= limit {
            break;
        }
    }
    out
}
