//! Temporal existence index.
//!
//! Every vertex and edge carries a [`TemporalIndex`]: a sorted,
//! append-only log of the timestamps at which the entity was observed.
//! Windowed membership and count queries truncate the log at the range
//! boundaries with binary search, so their cost scales with the number of
//! in-range entries rather than the full history.

use serde::{Deserialize, Serialize};

/// Sorted log of existence timestamps for a single entity.
///
/// Duplicates are kept: one entry per ingestion event, never deduplicated
/// by timestamp. Entries are only ever added; history is immutable once
/// written.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalIndex {
    timestamps: Vec<i64>,
}

impl TemporalIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an observation at time `t`, keeping the log sorted.
    pub fn push(&mut self, t: i64) {
        let at = self.timestamps.partition_point(|&x| x <= t);
        self.timestamps.insert(at, t);
    }

    /// Number of recorded observations, duplicates included.
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    /// Earliest observation, or `None` for an empty log.
    pub fn earliest(&self) -> Option<i64> {
        self.timestamps.first().copied()
    }

    /// Latest observation, or `None` for an empty log.
    pub fn latest(&self) -> Option<i64> {
        self.timestamps.last().copied()
    }

    /// True if any observation `t` satisfies `start <= t < end`.
    ///
    /// An inverted interval (`start >= end`) never matches.
    pub fn active_in(&self, start: i64, end: i64) -> bool {
        self.count_in(start, end) > 0
    }

    /// Number of observations with `start <= t < end`.
    pub fn count_in(&self, start: i64, end: i64) -> usize {
        if start >= end {
            return 0;
        }
        let lo = self.timestamps.partition_point(|&t| t < start);
        let hi = self.timestamps.partition_point(|&t| t < end);
        hi - lo
    }

    /// Observations falling within `[start, end)`, ascending.
    pub fn range(&self, start: i64, end: i64) -> &[i64] {
        if start >= end {
            return &[];
        }
        let lo = self.timestamps.partition_point(|&t| t < start);
        let hi = self.timestamps.partition_point(|&t| t < end);
        &self.timestamps[lo..hi]
    }

    /// All observations, ascending.
    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.timestamps.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_keeps_sorted() {
        let mut index = TemporalIndex::new();
        for t in [5, -1, 3, 3, 0] {
            index.push(t);
        }
        let collected: Vec<i64> = index.iter().collect();
        assert_eq!(collected, vec![-1, 0, 3, 3, 5]);
    }

    #[test]
    fn test_duplicates_kept() {
        let mut index = TemporalIndex::new();
        index.push(1);
        index.push(1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.count_in(1, 2), 2);
    }

    #[test]
    fn test_window_is_half_open() {
        let mut index = TemporalIndex::new();
        index.push(0);
        index.push(2);

        assert!(index.active_in(0, 1));
        assert!(index.active_in(2, 3));
        // an observation at exactly `end` is excluded
        assert!(!index.active_in(0, 2) || index.count_in(0, 2) == 1);
        assert_eq!(index.count_in(0, 2), 1);
        assert_eq!(index.count_in(0, 3), 2);
    }

    #[test]
    fn test_inverted_window_is_empty() {
        let mut index = TemporalIndex::new();
        index.push(1);

        assert!(!index.active_in(5, 5));
        assert!(!index.active_in(5, 0));
        assert_eq!(index.count_in(5, 0), 0);
        assert!(index.range(5, 0).is_empty());
    }

    #[test]
    fn test_earliest_latest() {
        let mut index = TemporalIndex::new();
        assert_eq!(index.earliest(), None);
        assert_eq!(index.latest(), None);

        index.push(7);
        index.push(-3);
        assert_eq!(index.earliest(), Some(-3));
        assert_eq!(index.latest(), Some(7));
    }

    #[test]
    fn test_range_extremes() {
        let mut index = TemporalIndex::new();
        index.push(i64::MIN);
        index.push(0);
        index.push(i64::MAX);

        assert_eq!(index.count_in(i64::MIN, i64::MAX), 2);
        assert_eq!(index.range(i64::MIN, i64::MAX), &[i64::MIN, 0]);
    }
}
