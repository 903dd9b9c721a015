//! Tests for pagination module

use super::*;
use crate::error::{Error, Result};
use crate::source::{GroupCountStream, GroupSequenceSource, MemorySource};
use crate::types::{Direction, GroupCount};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use test_case::test_case;

type Item = (&'static str, u64);

fn letters() -> MemorySource<Item> {
    MemorySource::from_group_counts([("A", 3), ("B", 10), ("C", 2), ("D", 1)])
}

fn paginator(want: u64, threshold: f64) -> LaxGroupPaginator<MemorySource<Item>> {
    LaxGroupPaginator::new(letters(), LaxSettings::new(want, threshold)).unwrap()
}

fn keys<T: crate::types::GroupedItem>(page: &Page<T>) -> Vec<T::Key> {
    page.grouped().map(|(key, _)| key.clone()).collect()
}

/// Source with `counts[i]` items under key `i`
fn numbered(counts: &[u64]) -> MemorySource<(i64, u64)> {
    MemorySource::from_group_counts(counts.iter().enumerate().map(|(i, c)| (i as i64, *c)))
}

// ============================================================================
// Settings Tests
// ============================================================================

#[test]
fn test_settings_defaults() {
    let settings = LaxSettings::default();
    assert_eq!(settings.want_per_page, 25);
    assert!((settings.lax_threshold - 0.5).abs() < f64::EPSILON);
    assert!(!settings.reverse);
    assert!((settings.lax_max() - 37.5).abs() < f64::EPSILON);
}

#[test_case(0, 0.5; "zero want")]
#[test_case(5, -0.1; "negative threshold")]
#[test_case(5, f64::NAN; "nan threshold")]
#[test_case(5, f64::INFINITY; "infinite threshold")]
fn test_invalid_settings(want: u64, threshold: f64) {
    let result = LaxGroupPaginator::new(letters(), LaxSettings::new(want, threshold));
    assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
}

// ============================================================================
// Boundary Selection Tests
// ============================================================================

#[test]
fn test_first_page_rolls_back_oversized_group() {
    let page = paginator(5, 0.5).page(Some("A")).unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(
        page.boundary(),
        &PageBoundary {
            start: "A",
            end: "A",
            next: Some("B"),
            previous: None,
        }
    );
    assert!(page.has_next());
    assert!(!page.has_previous());
}

#[test]
fn test_single_oversized_group_is_kept_whole() {
    let page = paginator(5, 0.5).page(Some("B")).unwrap();

    assert_eq!(page.len(), 10);
    assert_eq!(
        page.boundary(),
        &PageBoundary {
            start: "B",
            end: "B",
            next: Some("C"),
            previous: Some("A"),
        }
    );
}

#[test]
fn test_last_page_absorbs_remaining_groups() {
    let page = paginator(5, 0.5).page(Some("C")).unwrap();

    assert_eq!(page.len(), 3);
    assert_eq!(keys(&page), vec!["C", "D"]);
    assert_eq!(
        page.boundary(),
        &PageBoundary {
            start: "C",
            end: "D",
            next: None,
            previous: Some("B"),
        }
    );
    assert!(page.has_other_pages());
}

#[test]
fn test_default_anchor_is_first_group() {
    let page = paginator(5, 0.5).page(None).unwrap();
    assert_eq!(*page.anchor(), "A");
    assert_eq!(page.boundary().start, "A");
}

#[test]
fn test_anchor_between_groups_starts_at_following_group() {
    let page = paginator(5, 0.5).page(Some("BB")).unwrap();
    assert_eq!(*page.anchor(), "BB");
    assert_eq!(page.boundary().start, "C");
    assert_eq!(page.previous_anchor(), Some(&"B"));
}

#[test]
fn test_anchor_past_last_group_is_empty_page() {
    let err = paginator(5, 0.5).page(Some("Z")).unwrap_err();
    assert!(matches!(err, Error::EmptyPage { .. }));
    assert!(err.is_invalid_page());
}

#[test]
fn test_empty_source_without_anchor() {
    let source: MemorySource<Item> = MemorySource::new(Vec::new());
    let paginator = LaxGroupPaginator::new(source, LaxSettings::default()).unwrap();
    assert!(matches!(paginator.page(None), Err(Error::NullGroupingValue)));
}

#[test]
fn test_zero_threshold_disables_rollback() {
    let page = paginator(5, 0.0).page(Some("A")).unwrap();

    assert_eq!(page.len(), 13);
    assert_eq!(page.boundary().end, "B");
    assert_eq!(page.next_anchor(), Some(&"C"));
}

#[test]
fn test_singleton_pages() {
    let source = numbered(&[4, 1, 7, 2, 2]);
    let paginator = LaxGroupPaginator::new(&source, LaxSettings::new(1, 0.0)).unwrap();

    let pages: Vec<_> = paginator.walk(None).collect::<Result<_>>().unwrap();
    assert_eq!(pages.len(), 5);
    for (i, page) in pages.iter().enumerate() {
        assert_eq!(keys(page), vec![i as i64]);
    }
}

#[test]
fn test_page_fills_up_to_want() {
    let source = numbered(&[2, 2, 2, 2, 2, 2]);
    let paginator = LaxGroupPaginator::new(&source, LaxSettings::new(5, 0.5)).unwrap();

    let page = paginator.page(None).unwrap();
    assert_eq!(keys(&page), vec![0, 1, 2]);
    assert_eq!(page.len(), 6);
    assert_eq!(page.next_anchor(), Some(&3));
}

#[test]
fn test_group_counts_cover_page_items() {
    let page = paginator(5, 0.5).page(Some("C")).unwrap();
    assert_eq!(
        page.group_counts(),
        &[GroupCount::new("C", 2), GroupCount::new("D", 1)]
    );
    let total: u64 = page.group_counts().iter().map(|g| g.count).sum();
    assert_eq!(total, page.len() as u64);
}

// ============================================================================
// Traversal Tests
// ============================================================================

#[test]
fn test_walk_partitions_data_set() {
    let counts = [3, 1, 9, 1, 1, 4, 12, 2, 2, 5, 1, 1, 1, 6];
    let source = numbered(&counts);
    let paginator = LaxGroupPaginator::new(&source, LaxSettings::new(5, 0.5)).unwrap();

    let pages: Vec<_> = paginator.walk(None).collect::<Result<_>>().unwrap();

    let concatenated: Vec<_> = pages.iter().flat_map(|p| p.items().to_vec()).collect();
    assert_eq!(concatenated, source.items().to_vec());

    let mut seen = Vec::new();
    for page in &pages {
        for key in keys(page) {
            assert!(!seen.contains(&key), "group {key} split across pages");
            seen.push(key);
        }
    }
    assert_eq!(seen.len(), counts.len());
}

#[test]
fn test_boundary_symmetry() {
    let source = numbered(&[3, 1, 9, 1, 1, 4, 12, 2, 2, 5]);
    let paginator = LaxGroupPaginator::new(&source, LaxSettings::new(4, 0.25)).unwrap();

    let pages: Vec<_> = paginator.walk(None).collect::<Result<_>>().unwrap();
    for pair in pages.windows(2) {
        assert_eq!(pair[0].next_anchor(), Some(&pair[1].boundary().start));
        assert_eq!(pair[1].previous_anchor(), Some(&pair[0].boundary().end));
    }
    assert!(!pages[0].has_previous());
    assert!(!pages[pages.len() - 1].has_next());
}

#[test]
fn test_walk_stops_after_error() {
    let paginator = paginator(5, 0.5);
    let mut walker = paginator.walk(Some("Z"));
    assert!(matches!(walker.next(), Some(Err(Error::EmptyPage { .. }))));
    assert!(walker.next().is_none());
}

#[test]
fn test_count() {
    assert_eq!(paginator(5, 0.5).count().unwrap(), 16);
}

// ============================================================================
// Reverse Tests
// ============================================================================

#[test]
fn test_reverse_pages() {
    let paginator =
        LaxGroupPaginator::new(letters(), LaxSettings::new(5, 0.5).reversed()).unwrap();
    assert_eq!(paginator.direction(), Direction::Backward);

    let pages: Vec<_> = paginator.walk(None).collect::<Result<_>>().unwrap();
    let boundaries: Vec<_> = pages.iter().map(|p| p.boundary().clone()).collect();
    assert_eq!(
        boundaries,
        vec![
            PageBoundary {
                start: "D",
                end: "C",
                next: Some("B"),
                previous: None,
            },
            PageBoundary {
                start: "B",
                end: "B",
                next: Some("A"),
                previous: Some("C"),
            },
            PageBoundary {
                start: "A",
                end: "A",
                next: None,
                previous: Some("B"),
            },
        ]
    );
    assert_eq!(keys(&pages[0]), vec!["D", "C"]);
    assert_eq!(pages[0].direction(), Direction::Backward);
}

#[test]
fn test_reverse_mirrors_forward_over_negated_keys() {
    let counts = [3u64, 1, 9, 1, 1, 4, 12, 2, 2, 5, 1, 6];
    let source = numbered(&counts);
    let mirrored = MemorySource::from_group_counts(
        counts.iter().enumerate().map(|(i, c)| (-(i as i64), *c)),
    );

    let settings = LaxSettings::new(5, 0.5);
    let backward = LaxGroupPaginator::new(&source, settings.clone().reversed()).unwrap();
    let forward = LaxGroupPaginator::new(&mirrored, settings).unwrap();

    let negate = |b: &PageBoundary<i64>| PageBoundary {
        start: -b.start,
        end: -b.end,
        next: b.next.map(|k| -k),
        previous: b.previous.map(|k| -k),
    };

    let backward: Vec<_> = backward
        .walk(None)
        .map(|p| p.map(|p| p.boundary().clone()))
        .collect::<Result<_>>()
        .unwrap();
    let forward: Vec<_> = forward
        .walk(None)
        .map(|p| p.map(|p| negate(p.boundary())))
        .collect::<Result<_>>()
        .unwrap();
    assert_eq!(backward, forward);
}

#[test]
fn test_reverse_of_symmetric_data_set() {
    let source = numbered(&[2, 2, 2, 2]);
    let settings = LaxSettings::new(4, 0.5);
    let forward = LaxGroupPaginator::new(&source, settings.clone()).unwrap();
    let backward = LaxGroupPaginator::new(&source, settings.reversed()).unwrap();

    let forward: Vec<_> = forward.walk(None).collect::<Result<_>>().unwrap();
    let backward: Vec<_> = backward.walk(None).collect::<Result<_>>().unwrap();
    assert_eq!(forward.len(), backward.len());

    for (f, b) in forward.iter().zip(backward.iter().rev()) {
        let mut f_keys = keys(f);
        f_keys.reverse();
        assert_eq!(f_keys, keys(b));
        assert_eq!(f.boundary().previous, b.boundary().next);
        assert_eq!(f.boundary().next, b.boundary().previous);
    }
}

// ============================================================================
// Grouped View Tests
// ============================================================================

#[test]
fn test_grouped_view_is_repeatable() {
    let page = paginator(5, 0.5).page(Some("C")).unwrap();

    let first: Vec<_> = page.grouped().map(|(k, run)| (*k, run.len())).collect();
    let second: Vec<_> = page.grouped().map(|(k, run)| (*k, run.len())).collect();
    assert_eq!(first, vec![("C", 2), ("D", 1)]);
    assert_eq!(first, second);
}

#[test]
fn test_group_adjacent_splits_runs_only() {
    let items = [("x", 1), ("x", 2), ("y", 3), ("x", 4)];
    let runs: Vec<_> = group_adjacent(&items).map(|(k, r)| (*k, r.len())).collect();
    assert_eq!(runs, vec![("x", 2), ("y", 1), ("x", 1)]);

    let empty: [(&str, u64); 0] = [];
    assert_eq!(group_adjacent(&empty).count(), 0);
}

// ============================================================================
// Laziness and Sharing Tests
// ============================================================================

/// Source wrapper counting how many group counts were pulled
struct CountingSource {
    inner: MemorySource<(i64, u64)>,
    pulled: Cell<usize>,
}

impl GroupSequenceSource for CountingSource {
    type Key = i64;
    type Item = (i64, u64);

    fn ordered_group_counts(
        &self,
        direction: Direction,
        from: &i64,
    ) -> Result<GroupCountStream<'_, i64>> {
        let stream = self.inner.ordered_group_counts(direction, from)?;
        Ok(Box::new(stream.inspect(|_| {
            self.pulled.set(self.pulled.get() + 1);
        })))
    }

    fn first_group_key(&self, direction: Direction) -> Result<Option<i64>> {
        self.inner.first_group_key(direction)
    }

    fn next_group_key_beyond(&self, direction: Direction, key: &i64) -> Result<Option<i64>> {
        self.inner.next_group_key_beyond(direction, key)
    }

    fn fetch_items(&self, direction: Direction, start: &i64, end: &i64) -> Result<Vec<Self::Item>> {
        self.inner.fetch_items(direction, start, end)
    }

    fn fetch_group_counts(
        &self,
        direction: Direction,
        start: &i64,
        end: &i64,
    ) -> Result<Vec<GroupCount<i64>>> {
        self.inner.fetch_group_counts(direction, start, end)
    }

    fn count(&self) -> Result<u64> {
        self.inner.count()
    }
}

#[test]
fn test_scan_stops_early() {
    let source = CountingSource {
        inner: numbered(&[1; 10_000]),
        pulled: Cell::new(0),
    };
    let paginator = LaxGroupPaginator::new(&source, LaxSettings::new(3, 0.5)).unwrap();

    let page = paginator.page(Some(100)).unwrap();
    assert_eq!(keys(&page), vec![100, 101, 102]);
    assert_eq!(source.pulled.get(), 4);
}

#[test]
fn test_shared_across_threads() {
    let paginator =
        LaxGroupPaginator::new(numbered(&[2, 3, 1, 4, 2, 2, 5]), LaxSettings::new(4, 0.5))
            .unwrap();

    let expected: Vec<_> = (0..7)
        .map(|anchor| paginator.page(Some(anchor)).unwrap().boundary().clone())
        .collect();

    std::thread::scope(|scope| {
        let handles: Vec<_> = (0..7)
            .map(|anchor| {
                let paginator = &paginator;
                scope.spawn(move || paginator.page(Some(anchor)).unwrap().boundary().clone())
            })
            .collect();
        let actual: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        assert_eq!(actual, expected);
    });
}

#[test]
fn test_page_serializes_boundary() {
    let page = paginator(5, 0.5).page(Some("C")).unwrap();
    let json = serde_json::to_value(&page).unwrap();

    assert_eq!(json["anchor"], "C");
    assert_eq!(json["boundary"]["start"], "C");
    assert_eq!(json["boundary"]["previous"], "B");
    assert!(json["boundary"].get("next").is_none());
    assert_eq!(json["direction"], "forward");
    assert_eq!(json["items"].as_array().unwrap().len(), 3);
}
