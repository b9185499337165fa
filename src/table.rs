use std::collections::HashSet;
use std::mem::size_of;

use crate::fingerprint::Fingerprint;

const CONTROL_GROUP_WIDTH: usize = 16;

/// Set of fingerprints seen since the last reset.
#[derive(Debug, Default)]
pub struct MembershipTable {
    seen: HashSet<Fingerprint>,
}

impl MembershipTable {
    pub fn new() -> Self {
        MembershipTable::default()
    }

    pub fn contains(&self, fingerprint: Fingerprint) -> bool {
        self.seen.contains(&fingerprint)
    }

    pub fn insert(&mut self, fingerprint: Fingerprint) {
        self.seen.insert(fingerprint);
    }

    /// Approximate heap and inline footprint. The set allocates a power-of-two number of
    /// buckets of which at most 7/8 are usable; each bucket costs one key plus one control
    /// byte, and a trailing group of control bytes mirrors the first.
    pub fn estimate_bytes(&self) -> u64 {
        let capacity = self.seen.capacity();
        let table = if capacity == 0 {
            0
        } else {
            let buckets = (capacity * 8 / 7).next_power_of_two();
            buckets * (size_of::<Fingerprint>() + 1) + CONTROL_GROUP_WIDTH
        };
        (size_of::<Self>() + table) as u64
    }

    /// Drops every entry and releases the allocation.
    pub fn reset(&mut self) {
        self.seen = HashSet::new();
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

/// Total-clear policy: every `interval` chunks the table is discarded wholesale if its
/// estimated footprint exceeds `budget_bytes`. No eviction of individual entries.
///
/// After a reset, repeats of chunks seen before it are classified as unique, so duplicate
/// counts are a lower bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetPolicy {
    pub interval: u64,
    pub budget_bytes: u64,
}

impl ResetPolicy {
    pub fn new(interval: u64, budget_bytes: u64) -> Self {
        ResetPolicy {
            interval,
            budget_bytes,
        }
    }

    /// A policy whose budget is never exceeded.
    pub fn unbounded() -> Self {
        ResetPolicy::new(u64::MAX, u64::MAX)
    }

    pub fn is_checkpoint(&self, index: u64) -> bool {
        self.interval != 0 && index % self.interval == 0
    }

    /// Resets `table` when `index` is a checkpoint and the budget is exceeded.
    /// Returns whether a reset happened.
    pub fn enforce(&self, index: u64, table: &mut MembershipTable) -> bool {
        if !self.is_checkpoint(index) || table.is_empty() {
            return false;
        }
        let used = table.estimate_bytes();
        log::debug!(
            "chunk {index}: membership table holds {} fingerprints in ~{used} bytes",
            table.len()
        );
        if used <= self.budget_bytes {
            return false;
        }
        log::warn!(
            "membership table flushed at chunk {index}: ~{used} bytes over budget of {} bytes, {} fingerprints dropped",
            self.budget_bytes,
            table.len()
        );
        table.reset();
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_is_idempotent() {
        let mut table = MembershipTable::new();
        assert!(!table.contains(42));
        table.insert(42);
        table.insert(42);
        assert!(table.contains(42));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn reset_discards_everything_and_shrinks() {
        let mut table = MembershipTable::new();
        let empty = table.estimate_bytes();
        for fp in 0..10_000 {
            table.insert(fp);
        }
        assert!(table.estimate_bytes() > empty + 10_000 * 4);

        table.reset();
        assert!(table.is_empty());
        assert!(!table.contains(0));
        assert_eq!(table.estimate_bytes(), empty);
    }

    #[test]
    fn policy_only_checks_at_interval() {
        let policy = ResetPolicy::new(4, 0);
        let mut table = MembershipTable::new();

        table.insert(1);
        assert!(!policy.enforce(3, &mut table));
        assert!(table.contains(1));

        assert!(policy.enforce(4, &mut table));
        assert!(table.is_empty());
    }

    #[test]
    fn empty_table_is_never_reset() {
        let policy = ResetPolicy::new(1, 0);
        let mut table = MembershipTable::new();
        assert!(!policy.enforce(0, &mut table));

        table.insert(1);
        table.reset();
        assert!(!policy.enforce(1, &mut table));
    }

    #[test]
    fn estimate_counts_buckets_not_usable_capacity() {
        let mut table = MembershipTable::new();
        for fp in 0..1000 {
            table.insert(fp);
        }
        let capacity = table.seen.capacity();
        let buckets = (capacity * 8 / 7).next_power_of_two();
        assert!(buckets > capacity);
        assert_eq!(
            table.estimate_bytes() as usize,
            size_of::<MembershipTable>() + buckets * 5 + CONTROL_GROUP_WIDTH
        );
        assert!(table.estimate_bytes() as usize > size_of::<MembershipTable>() + capacity * 5);
    }

    #[test]
    fn policy_keeps_table_under_budget() {
        let mut table = MembershipTable::new();
        table.insert(1);
        let policy = ResetPolicy::new(1, table.estimate_bytes());
        assert!(!policy.enforce(0, &mut table));
        assert!(table.contains(1));

        assert!(!ResetPolicy::unbounded().enforce(0, &mut table));
        assert!(!ResetPolicy::unbounded().is_checkpoint(7));
    }
}
