//! Lax grouped paginator
//!
//! Pages never split a group. Each page collects whole groups until it holds
//! at least `want_per_page` items; if the running total has already passed
//! `want_per_page * (1 + lax_threshold)` when the next group comes up, the
//! most recently added group is moved to the next page instead, as long as
//! the page keeps at least one group.

use super::page::Page;
use super::types::{LaxSettings, PageBoundary};
use crate::error::{Error, Result};
use crate::source::GroupSequenceSource;
use crate::types::{Direction, GroupCount};
use tracing::{debug, trace};

/// Paginator over a grouped, ordered source
#[derive(Debug, Clone)]
pub struct LaxGroupPaginator<S> {
    source: S,
    settings: LaxSettings,
    lax_max: f64,
}

/// Keys collected while scanning forward from the anchor
struct Scan<K> {
    start: K,
    end: K,
    /// Value of `end` before the last accepted group
    end_prev: K,
}

impl<S: GroupSequenceSource> LaxGroupPaginator<S> {
    /// Create a paginator, validating the settings
    pub fn new(source: S, settings: LaxSettings) -> Result<Self> {
        settings.validate()?;
        let lax_max = settings.lax_max();
        Ok(Self {
            source,
            settings,
            lax_max,
        })
    }

    pub fn settings(&self) -> &LaxSettings {
        &self.settings
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Direction pages are read in
    pub fn direction(&self) -> Direction {
        if self.settings.reverse {
            Direction::Backward
        } else {
            Direction::Forward
        }
    }

    /// Total number of items in the source
    pub fn count(&self) -> Result<u64> {
        self.source.count()
    }

    /// Build the page starting at `anchor`, or at the first group if `None`
    ///
    /// An anchor does not have to be an existing key: the page starts at the
    /// first group at or beyond it.
    pub fn page(&self, anchor: Option<S::Key>) -> Result<Page<S::Item>> {
        let direction = self.direction();

        let anchor = match anchor {
            Some(anchor) => anchor,
            None => self
                .source
                .first_group_key(direction)?
                .ok_or(Error::NullGroupingValue)?,
        };

        let counts = self.source.ordered_group_counts(direction, &anchor)?;
        let (scan, next) = match self.scan(counts)? {
            Some(found) => found,
            None => return Err(Error::empty_page(&anchor)),
        };

        let previous = self
            .source
            .next_group_key_beyond(direction.reversed(), &scan.start)?;

        debug!(
            ?anchor,
            start = ?scan.start,
            end = ?scan.end,
            ?next,
            ?previous,
            "Selected page boundary"
        );

        let items = self.source.fetch_items(direction, &scan.start, &scan.end)?;
        let group_counts = self
            .source
            .fetch_group_counts(direction, &scan.start, &scan.end)?;

        let boundary = PageBoundary {
            start: scan.start,
            end: scan.end,
            next,
            previous,
        };

        Ok(Page::new(anchor, items, boundary, group_counts, direction))
    }

    /// Iterate pages by following `next` from `anchor` until the last page
    pub fn walk(&self, anchor: Option<S::Key>) -> PageWalker<'_, S> {
        PageWalker {
            paginator: self,
            state: WalkState::Start(anchor),
        }
    }

    /// Pick the run of groups for one page
    ///
    /// Returns `None` when the stream is empty, otherwise the scanned keys
    /// and the first key of the next page, if any.
    #[allow(clippy::type_complexity)]
    fn scan<I>(&self, counts: I) -> Result<Option<(Scan<S::Key>, Option<S::Key>)>>
    where
        I: Iterator<Item = Result<GroupCount<S::Key>>>,
    {
        let want = self.settings.want_per_page;
        let mut scan: Option<Scan<S::Key>> = None;
        let mut accumulated: u64 = 0;

        for group in counts {
            let GroupCount { key, count } = group?;
            trace!(?key, count, accumulated, "Considering group");

            let Some(current) = scan.as_mut() else {
                scan = Some(Scan {
                    start: key.clone(),
                    end: key.clone(),
                    end_prev: key,
                });
                accumulated += count;
                continue;
            };

            if self.settings.lax_threshold > 0.0
                && accumulated as f64 > self.lax_max
                && current.start != current.end
            {
                // Too far over the ceiling: hand the last group to the next page
                let rolled_back = std::mem::replace(&mut current.end, current.end_prev.clone());
                return Ok(scan.map(|s| (s, Some(rolled_back))));
            }

            if accumulated >= want {
                return Ok(scan.map(|s| (s, Some(key))));
            }

            current.end_prev = std::mem::replace(&mut current.end, key);
            accumulated += count;
        }

        Ok(scan.map(|s| (s, None)))
    }
}

enum WalkState<K> {
    Start(Option<K>),
    Next(K),
    Done,
}

/// Iterator over consecutive pages, see [`LaxGroupPaginator::walk`]
///
/// Stops after the last page or after the first error.
pub struct PageWalker<'p, S: GroupSequenceSource> {
    paginator: &'p LaxGroupPaginator<S>,
    state: WalkState<S::Key>,
}

impl<S: GroupSequenceSource> Iterator for PageWalker<'_, S> {
    type Item = Result<Page<S::Item>>;

    fn next(&mut self) -> Option<Self::Item> {
        let anchor = match std::mem::replace(&mut self.state, WalkState::Done) {
            WalkState::Start(anchor) => anchor,
            WalkState::Next(anchor) => Some(anchor),
            WalkState::Done => return None,
        };

        let page = self.paginator.page(anchor);
        if let Ok(page) = &page {
            if let Some(next) = page.next_anchor() {
                self.state = WalkState::Next(next.clone());
            }
        }
        Some(page)
    }
}
