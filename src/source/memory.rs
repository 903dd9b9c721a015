//! In-memory group source
//!
//! Reference adapter: keeps the items sorted by key next to a per-key count
//! index, and answers every query with ordered range scans.

use super::traits::{GroupCountStream, GroupSequenceSource};
use crate::error::Result;
use crate::types::{Direction, GroupCount, GroupKey, GroupedItem};
use std::collections::BTreeMap;
use std::ops::Bound;

/// Group source over an in-memory list of items
#[derive(Debug, Clone)]
pub struct MemorySource<T: GroupedItem> {
    /// Items sorted by key (stable, so insertion order is kept inside a group)
    items: Vec<T>,
    /// Item count per key
    counts: BTreeMap<T::Key, u64>,
}

impl<T: GroupedItem> MemorySource<T> {
    /// Create a source from items in any order
    pub fn new(items: impl IntoIterator<Item = T>) -> Self {
        let mut items: Vec<T> = items.into_iter().collect();
        items.sort_by(|a, b| a.group_key().cmp(b.group_key()));

        let mut counts = BTreeMap::new();
        for item in &items {
            *counts.entry(item.group_key().clone()).or_insert(0) += 1;
        }

        Self { items, counts }
    }

    /// Number of distinct groups
    pub fn group_count(&self) -> usize {
        self.counts.len()
    }

    /// All items in ascending key order
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Slice of items with keys in the inclusive ascending range `[low, high]`
    fn slice(&self, low: &T::Key, high: &T::Key) -> &[T] {
        let from = self.items.partition_point(|item| item.group_key() < low);
        let to = self.items.partition_point(|item| item.group_key() <= high);
        if from >= to {
            &[]
        } else {
            &self.items[from..to]
        }
    }
}

impl<K: GroupKey> MemorySource<(K, u64)> {
    /// Build a source from `(key, count)` pairs
    ///
    /// Each group gets `count` items `(key, 0..count)`. Zero counts add nothing.
    pub fn from_group_counts(groups: impl IntoIterator<Item = (K, u64)>) -> Self {
        Self::new(
            groups
                .into_iter()
                .flat_map(|(key, count)| (0..count).map(move |i| (key.clone(), i))),
        )
    }
}

impl<T> GroupSequenceSource for MemorySource<T>
where
    T: GroupedItem + Clone,
{
    type Key = T::Key;
    type Item = T;

    fn ordered_group_counts(
        &self,
        direction: Direction,
        from: &T::Key,
    ) -> Result<GroupCountStream<'_, T::Key>> {
        let to_count = |(key, count): (&T::Key, &u64)| -> Result<GroupCount<T::Key>> {
            Ok(GroupCount::new(key.clone(), *count))
        };
        let stream: GroupCountStream<'_, T::Key> = match direction {
            Direction::Forward => Box::new(self.counts.range(from.clone()..).map(to_count)),
            Direction::Backward => Box::new(self.counts.range(..=from.clone()).rev().map(to_count)),
        };
        Ok(stream)
    }

    fn first_group_key(&self, direction: Direction) -> Result<Option<T::Key>> {
        let first = match direction {
            Direction::Forward => self.counts.keys().next(),
            Direction::Backward => self.counts.keys().next_back(),
        };
        Ok(first.cloned())
    }

    fn next_group_key_beyond(&self, direction: Direction, key: &T::Key) -> Result<Option<T::Key>> {
        let next = match direction {
            Direction::Forward => self
                .counts
                .range((Bound::Excluded(key.clone()), Bound::Unbounded))
                .map(|(k, _)| k)
                .next(),
            Direction::Backward => self.counts.range(..key.clone()).map(|(k, _)| k).next_back(),
        };
        Ok(next.cloned())
    }

    fn fetch_items(&self, direction: Direction, start: &T::Key, end: &T::Key) -> Result<Vec<T>> {
        if !direction.reaches(end, start) {
            return Ok(Vec::new());
        }
        Ok(match direction {
            Direction::Forward => self.slice(start, end).to_vec(),
            Direction::Backward => self.slice(end, start).iter().rev().cloned().collect(),
        })
    }

    fn fetch_group_counts(
        &self,
        direction: Direction,
        start: &T::Key,
        end: &T::Key,
    ) -> Result<Vec<GroupCount<T::Key>>> {
        if !direction.reaches(end, start) {
            return Ok(Vec::new());
        }
        let to_count = |(key, count): (&T::Key, &u64)| GroupCount::new(key.clone(), *count);
        Ok(match direction {
            Direction::Forward => self
                .counts
                .range(start.clone()..=end.clone())
                .map(to_count)
                .collect(),
            Direction::Backward => self
                .counts
                .range(end.clone()..=start.clone())
                .rev()
                .map(to_count)
                .collect(),
        })
    }

    fn count(&self) -> Result<u64> {
        Ok(self.items.len() as u64)
    }
}
