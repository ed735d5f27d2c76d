use std::collections::HashMap;

use blake3::Hash;

use crate::layout::CandidateLayout;

/// A candidate together with its content fingerprint.
#[derive(Debug, Clone)]
pub struct RegisteredCandidate {
    pub fingerprint: Hash,
    pub layout: CandidateLayout,
}

/// Keeps the first occurrence of every distinct layout, in insertion order.
///
/// Different zone alternatives can resolve to the same placements (two
/// combinations with the same modules in the same order on different search
/// paths), so assembly feeds everything through here before scoring.
#[derive(Debug, Default)]
pub struct CandidateRegistry {
    entries: Vec<RegisteredCandidate>,
    index: HashMap<Hash, usize>,
    duplicates: usize,
}

impl CandidateRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `layout`; returns false when an identical layout was
    /// already present.
    pub fn insert(&mut self, layout: CandidateLayout) -> bool {
        let fingerprint = layout.fingerprint();
        if self.index.contains_key(&fingerprint) {
            self.duplicates += 1;
            return false;
        }
        self.index.insert(fingerprint, self.entries.len());
        self.entries.push(RegisteredCandidate {
            fingerprint,
            layout,
        });
        true
    }

    pub fn get(&self, fingerprint: &Hash) -> Option<&CandidateLayout> {
        self.index.get(fingerprint).map(|&idx| &self.entries[idx].layout)
    }

    pub fn contains(&self, fingerprint: &Hash) -> bool {
        self.index.contains_key(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegisteredCandidate> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> Vec<RegisteredCandidate> {
        self.entries
    }
}

impl Extend<CandidateLayout> for CandidateRegistry {
    fn extend<I: IntoIterator<Item = CandidateLayout>>(&mut self, iter: I) {
        for layout in iter {
            self.insert(layout);
        }
    }
}
