//! # Uniqueness Guard
//!
//! Pure validation shared by reorder and renumber. Given the values a request
//! proposes for a set of rows, and the values currently persisted for the
//! auction, it reports:
//!
//! - **duplicates**: values proposed more than once within the request;
//! - **collisions**: proposed values already held by a persisted row that is
//!   not itself part of the request.
//!
//! Rows named by the request release their current value, so swaps and longer
//! cycles (1→2, 2→3, 3→1) never collide with themselves.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

/// Result of a uniqueness check. Both lists are sorted and de-duplicated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniquenessReport<V> {
    pub duplicates: Vec<V>,
    pub collisions: Vec<V>,
}

impl<V> UniquenessReport<V> {
    pub fn is_clean(&self) -> bool {
        self.duplicates.is_empty() && self.collisions.is_empty()
    }
}

/// Values occurring more than once, sorted.
pub fn find_duplicates<'a, V, I>(values: I) -> Vec<V>
where
    V: Eq + Hash + Ord + Clone + 'a,
    I: IntoIterator<Item = &'a V>,
{
    let mut counts: HashMap<&V, usize> = HashMap::new();
    for value in values {
        *counts.entry(value).or_default() += 1;
    }
    let mut duplicates: Vec<V> = counts
        .into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(value, _)| value.clone())
        .collect();
    duplicates.sort();
    duplicates
}

/// Check proposed `(owner, value)` pairs against persisted `(owner, value)` pairs.
pub fn check_uniqueness<'a, K, V, P, Q>(proposed: P, persisted: Q) -> UniquenessReport<V>
where
    K: Eq + Hash + 'a,
    V: Eq + Hash + Ord + Clone + 'a,
    P: IntoIterator<Item = (&'a K, &'a V)>,
    Q: IntoIterator<Item = (&'a K, &'a V)>,
{
    let proposed: Vec<(&K, &V)> = proposed.into_iter().collect();
    let sources: HashSet<&K> = proposed.iter().map(|(owner, _)| *owner).collect();

    let held: HashSet<&V> = persisted
        .into_iter()
        .filter(|(owner, _)| !sources.contains(owner))
        .map(|(_, value)| value)
        .collect();

    let duplicates = find_duplicates(proposed.iter().map(|(_, value)| *value));

    let mut collisions: Vec<V> = proposed
        .iter()
        .map(|(_, value)| *value)
        .filter(|value| held.contains(value))
        .collect::<HashSet<_>>()
        .into_iter()
        .cloned()
        .collect();
    collisions.sort();

    UniquenessReport {
        duplicates,
        collisions,
    }
}
