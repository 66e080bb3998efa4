use std::collections::HashSet;

use lkv_types::IndexPair;

/// Flattened index pairs to add and remove when an object's declarations
/// change from `old` to `new`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexDiff {
    pub added: Vec<IndexPair>,
    pub removed: Vec<IndexPair>,
}

impl IndexDiff {
    /// Returns `true` if there is nothing to apply.
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Total number of posting updates this diff produces.
    pub fn len(&self) -> usize {
        self.added.len() + self.removed.len()
    }
}

/// Compute the index diff between new and old declarations.
///
/// Both sides are flattened first, so `("color", "red,blue")` against
/// `("color", "blue")` removes only `color=red`. Output follows the first
/// occurrence order of each flattened input, and repeated pairs appear once.
pub fn diff(new: &[IndexPair], old: &[IndexPair]) -> IndexDiff {
    let new_flat = flatten_unique(new);
    let old_flat = flatten_unique(old);

    let new_set: HashSet<&IndexPair> = new_flat.iter().collect();
    let old_set: HashSet<&IndexPair> = old_flat.iter().collect();

    let added = new_flat
        .iter()
        .filter(|p| !old_set.contains(p))
        .cloned()
        .collect();
    let removed = old_flat
        .iter()
        .filter(|p| !new_set.contains(p))
        .cloned()
        .collect();

    IndexDiff { added, removed }
}

fn flatten_unique(pairs: &[IndexPair]) -> Vec<IndexPair> {
    let mut seen = HashSet::new();
    pairs
        .iter()
        .flat_map(IndexPair::flatten)
        .filter(|p| seen.insert(p.clone()))
        .collect()
}
