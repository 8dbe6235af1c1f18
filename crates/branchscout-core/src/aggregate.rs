//! Global deduplication of scraped batches.
//!
//! Batches from every region or page are folded into one [`Aggregator`]. The
//! first record seen for an identity key is kept; later duplicates are
//! dropped, even when they were scraped under a different region.

use std::collections::{HashMap, HashSet};

use crate::branches::{BranchRecord, IdentityKey};

/// Accumulating, deduplicated record set for a single run.
#[derive(Debug, Default, Clone)]
pub struct Aggregator {
    seen: HashSet<IdentityKey>,
    records: Vec<BranchRecord>,
    discarded: usize,
}

/// Outcome of a single [`Aggregator::absorb`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AbsorbStats {
    pub accepted: usize,
    pub discarded: usize,
}

/// Records of one region, in aggregate order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionGroup<'a> {
    pub region: &'a str,
    pub records: Vec<&'a BranchRecord>,
}

impl Aggregator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold a batch into the aggregate, keeping the first record per identity key.
    pub fn absorb<I>(&mut self, batch: I) -> AbsorbStats
    where
        I: IntoIterator<Item = BranchRecord>,
    {
        let mut stats = AbsorbStats::default();
        for record in batch {
            if self.seen.insert(record.identity_key()) {
                self.records.push(record);
                stats.accepted += 1;
            } else {
                stats.discarded += 1;
            }
        }
        self.discarded += stats.discarded;
        stats
    }

    #[must_use]
    pub fn records(&self) -> &[BranchRecord] {
        &self.records
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Total duplicates dropped across every absorb call.
    #[must_use]
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    /// Group the aggregate by region.
    ///
    /// Groups appear in the order their region was first seen; records keep
    /// aggregate order. Records without a region (paginated runs) are left out.
    #[must_use]
    pub fn partition_by_region(&self) -> Vec<RegionGroup<'_>> {
        let mut groups: Vec<RegionGroup<'_>> = Vec::new();
        let mut index: HashMap<&str, usize> = HashMap::new();

        for record in &self.records {
            let Some(region) = record.region.as_deref() else {
                continue;
            };
            let slot = *index.entry(region).or_insert_with(|| {
                groups.push(RegionGroup {
                    region,
                    records: Vec::new(),
                });
                groups.len() - 1
            });
            groups[slot].records.push(record);
        }

        groups
    }
}
