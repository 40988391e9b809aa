//! Exclusion filter

use std::collections::HashSet;

use contracts::{Destination, DestinationId};

/// Caller-supplied deny-list; membership is the only operation
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExclusionSet(HashSet<DestinationId>);

impl ExclusionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: DestinationId) -> bool {
        self.0.contains(&id)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = DestinationId> + '_ {
        self.0.iter().copied()
    }
}

impl Extend<DestinationId> for ExclusionSet {
    fn extend<I: IntoIterator<Item = DestinationId>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<DestinationId> for ExclusionSet {
    fn from_iter<I: IntoIterator<Item = DestinationId>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl From<&[DestinationId]> for ExclusionSet {
    fn from(ids: &[DestinationId]) -> Self {
        ids.iter().copied().collect()
    }
}

/// Catalog split by exclusion membership, each side in catalog order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub accepted: Vec<Destination>,
    pub skipped: Vec<Destination>,
}

/// Partition `catalog` by membership in `exclusion`
pub fn filter(catalog: Vec<Destination>, exclusion: &ExclusionSet) -> Partition {
    let (skipped, accepted) = catalog
        .into_iter()
        .partition(|destination| exclusion.contains(destination.id));
    Partition { accepted, skipped }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::DestinationKind;

    fn catalog(ids: &[i64]) -> Vec<Destination> {
        ids.iter()
            .map(|id| Destination::new(DestinationId::new(*id), format!("G{id}"), DestinationKind::Group))
            .collect()
    }

    fn ids(destinations: &[Destination]) -> Vec<i64> {
        destinations.iter().map(|d| d.id.get()).collect()
    }

    #[test]
    fn test_partition_preserves_order() {
        let exclusion: ExclusionSet = [2, 4].into_iter().map(DestinationId::new).collect();
        let partition = filter(catalog(&[5, 4, 3, 2, 1]), &exclusion);

        assert_eq!(ids(&partition.accepted), vec![5, 3, 1]);
        assert_eq!(ids(&partition.skipped), vec![4, 2]);
    }

    #[test]
    fn test_partition_covers_catalog_disjointly() {
        let input = catalog(&[1, 2, 3, 4, 5, 6]);
        for mask in 0u32..64 {
            let exclusion: ExclusionSet = (1..=6)
                .filter(|i| mask & (1 << (i - 1)) != 0)
                .map(DestinationId::new)
                .collect();
            let partition = filter(input.clone(), &exclusion);

            let mut union: Vec<i64> = ids(&partition.accepted);
            union.extend(ids(&partition.skipped));
            union.sort_unstable();
            assert_eq!(union, vec![1, 2, 3, 4, 5, 6]);
            assert!(partition
                .accepted
                .iter()
                .all(|d| !partition.skipped.contains(d)));
        }
    }

    #[test]
    fn test_unknown_ids_are_ignored() {
        let exclusion: ExclusionSet = [99].into_iter().map(DestinationId::new).collect();
        let partition = filter(catalog(&[1, 2]), &exclusion);
        assert_eq!(partition.accepted.len(), 2);
        assert!(partition.skipped.is_empty());
    }

    #[test]
    fn test_empty_exclusion() {
        let partition = filter(catalog(&[1]), &ExclusionSet::new());
        assert_eq!(ids(&partition.accepted), vec![1]);
    }
}
