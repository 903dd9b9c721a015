//! Source trait
//!
//! Defines the interface the paginator requires from a backing store.

use crate::error::Result;
use crate::types::{Direction, GroupCount, GroupKey, GroupedItem};

/// Lazily pulled stream of group counts
pub type GroupCountStream<'a, K> = Box<dyn Iterator<Item = Result<GroupCount<K>>> + 'a>;

/// Ordered, counted access to a grouped data set
///
/// All range arguments are inclusive and interpreted in the given
/// `direction`: for `Direction::Backward`, `from` is the greatest key of the
/// range and results come back in descending order.
pub trait GroupSequenceSource {
    /// Grouping value type
    type Key: GroupKey;

    /// Record type
    type Item: GroupedItem<Key = Self::Key>;

    /// Group counts ordered by `direction`, starting at and including `from`
    ///
    /// The stream must be lazy: the paginator usually stops after a handful
    /// of groups.
    fn ordered_group_counts(
        &self,
        direction: Direction,
        from: &Self::Key,
    ) -> Result<GroupCountStream<'_, Self::Key>>;

    /// Key of the first group in `direction`, or `None` for an empty data set
    ///
    /// Fails with `Error::NullGroupingValue` if that group's key is NULL.
    fn first_group_key(&self, direction: Direction) -> Result<Option<Self::Key>>;

    /// First group key strictly beyond `key` in `direction`
    fn next_group_key_beyond(&self, direction: Direction, key: &Self::Key)
        -> Result<Option<Self::Key>>;

    /// All items whose key lies between `start` and `end`, ordered by `direction`
    fn fetch_items(
        &self,
        direction: Direction,
        start: &Self::Key,
        end: &Self::Key,
    ) -> Result<Vec<Self::Item>>;

    /// Group counts for every group between `start` and `end`, ordered by `direction`
    fn fetch_group_counts(
        &self,
        direction: Direction,
        start: &Self::Key,
        end: &Self::Key,
    ) -> Result<Vec<GroupCount<Self::Key>>>;

    /// Total number of items
    fn count(&self) -> Result<u64>;
}

impl<S: GroupSequenceSource + ?Sized> GroupSequenceSource for &S {
    type Key = S::Key;
    type Item = S::Item;

    fn ordered_group_counts(
        &self,
        direction: Direction,
        from: &Self::Key,
    ) -> Result<GroupCountStream<'_, Self::Key>> {
        (**self).ordered_group_counts(direction, from)
    }

    fn first_group_key(&self, direction: Direction) -> Result<Option<Self::Key>> {
        (**self).first_group_key(direction)
    }

    fn next_group_key_beyond(
        &self,
        direction: Direction,
        key: &Self::Key,
    ) -> Result<Option<Self::Key>> {
        (**self).next_group_key_beyond(direction, key)
    }

    fn fetch_items(
        &self,
        direction: Direction,
        start: &Self::Key,
        end: &Self::Key,
    ) -> Result<Vec<Self::Item>> {
        (**self).fetch_items(direction, start, end)
    }

    fn fetch_group_counts(
        &self,
        direction: Direction,
        start: &Self::Key,
        end: &Self::Key,
    ) -> Result<Vec<GroupCount<Self::Key>>> {
        (**self).fetch_group_counts(direction, start, end)
    }

    fn count(&self) -> Result<u64> {
        (**self).count()
    }
}
