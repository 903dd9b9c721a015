//! Page view
//!
//! An immutable page of items plus its navigation metadata.

use super::types::PageBoundary;
use crate::types::{Direction, GroupCount, GroupedItem};
use serde::Serialize;

/// One page of grouped items
#[derive(Debug, Clone, Serialize)]
#[serde(bound(serialize = "T: Serialize, T::Key: Serialize"))]
pub struct Page<T: GroupedItem> {
    anchor: T::Key,
    items: Vec<T>,
    boundary: PageBoundary<T::Key>,
    group_counts: Vec<GroupCount<T::Key>>,
    direction: Direction,
}

impl<T: GroupedItem> Page<T> {
    pub(crate) fn new(
        anchor: T::Key,
        items: Vec<T>,
        boundary: PageBoundary<T::Key>,
        group_counts: Vec<GroupCount<T::Key>>,
        direction: Direction,
    ) -> Self {
        Self {
            anchor,
            items,
            boundary,
            group_counts,
            direction,
        }
    }

    /// Anchor the page was requested with (after default resolution)
    pub fn anchor(&self) -> &T::Key {
        &self.anchor
    }

    /// Items on the page, ordered by direction
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Consume the page, returning its items
    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn boundary(&self) -> &PageBoundary<T::Key> {
        &self.boundary
    }

    /// Item count of every group on the page
    pub fn group_counts(&self) -> &[GroupCount<T::Key>] {
        &self.group_counts
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn has_next(&self) -> bool {
        self.boundary.next.is_some()
    }

    pub fn has_previous(&self) -> bool {
        self.boundary.previous.is_some()
    }

    pub fn has_other_pages(&self) -> bool {
        self.has_previous() || self.has_next()
    }

    /// Anchor of the following page
    pub fn next_anchor(&self) -> Option<&T::Key> {
        self.boundary.next.as_ref()
    }

    /// Key of the group right before this page
    pub fn previous_anchor(&self) -> Option<&T::Key> {
        self.boundary.previous.as_ref()
    }

    /// Items split into runs sharing a key
    ///
    /// Each call builds a fresh iterator over the page, so the view can be
    /// read any number of times.
    pub fn grouped(&self) -> GroupedItems<'_, T> {
        group_adjacent(&self.items)
    }
}

/// Split ordered items into consecutive runs sharing the same key
pub fn group_adjacent<T: GroupedItem>(items: &[T]) -> GroupedItems<'_, T> {
    GroupedItems { rest: items }
}

/// Iterator over `(key, run)` pairs of adjacent items
#[derive(Debug, Clone)]
pub struct GroupedItems<'a, T> {
    rest: &'a [T],
}

impl<'a, T: GroupedItem> Iterator for GroupedItems<'a, T> {
    type Item = (&'a T::Key, &'a [T]);

    fn next(&mut self) -> Option<Self::Item> {
        let first = self.rest.first()?;
        let key = first.group_key();
        let len = self
            .rest
            .iter()
            .position(|item| item.group_key() != key)
            .unwrap_or(self.rest.len());
        let (run, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some((key, run))
    }
}
