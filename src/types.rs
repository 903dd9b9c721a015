//! Common types used throughout grouped-pager
//!
//! This module contains the shared vocabulary of the pager: iteration
//! direction, group keys, per-group counts and the dynamic key value used
//! by the database adapter.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Direction
// ============================================================================

/// Key order in which groups are visited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Ascending key order
    #[default]
    Forward,
    /// Descending key order
    Backward,
}

impl Direction {
    /// The opposite direction
    #[must_use]
    pub fn reversed(self) -> Self {
        match self {
            Self::Forward => Self::Backward,
            Self::Backward => Self::Forward,
        }
    }

    /// Check if this is the ascending direction
    pub fn is_forward(self) -> bool {
        matches!(self, Self::Forward)
    }

    /// SQL keyword for ordering in this direction
    pub fn sql_order(self) -> &'static str {
        match self {
            Self::Forward => "ASC",
            Self::Backward => "DESC",
        }
    }

    /// Whether `key` lies at or beyond `bound` when walking in this direction
    pub fn reaches<K: Ord>(self, key: &K, bound: &K) -> bool {
        match self {
            Self::Forward => key >= bound,
            Self::Backward => key <= bound,
        }
    }
}

// ============================================================================
// Group Keys and Items
// ============================================================================

/// A totally ordered, non-null grouping value
///
/// Blanket-implemented for every `Ord + Clone + Debug` type.
pub trait GroupKey: Ord + Clone + fmt::Debug {}

impl<T: Ord + Clone + fmt::Debug> GroupKey for T {}

/// A record that belongs to exactly one group
pub trait GroupedItem {
    /// Type of the grouping value
    type Key: GroupKey;

    /// The grouping value of this record
    fn group_key(&self) -> &Self::Key;
}

impl<K: GroupKey, V> GroupedItem for (K, V) {
    type Key = K;

    fn group_key(&self) -> &K {
        &self.0
    }
}

/// Number of items sharing one grouping value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupCount<K> {
    /// Grouping value
    pub key: K,
    /// Number of items in the group (always >= 1)
    pub count: u64,
}

impl<K> GroupCount<K> {
    /// Create a new group count
    pub fn new(key: K, count: u64) -> Self {
        Self { key, count }
    }
}

// ============================================================================
// Dynamic Key Value
// ============================================================================

/// Grouping value read from a database column
///
/// Values from one column always share a variant, so the derived ordering
/// (variant first, then value) matches the column ordering.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum KeyValue {
    /// Integer column (any width)
    Int(i64),
    /// Text column
    Text(String),
    /// Date column
    Date(NaiveDate),
    /// Timestamp column (microsecond precision)
    Timestamp(NaiveDateTime),
}

impl KeyValue {
    /// Infer a key from a raw literal: integer, then date, then timestamp, else text
    pub fn infer(raw: &str) -> Self {
        if let Ok(i) = raw.parse::<i64>() {
            return Self::Int(i);
        }
        if let Ok(d) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
            return Self::Date(d);
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
            if let Ok(ts) = NaiveDateTime::parse_from_str(raw, format) {
                return Self::Timestamp(ts);
            }
        }
        Self::Text(raw.to_string())
    }
}

impl fmt::Display for KeyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => write!(f, "{s}"),
            Self::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Self::Timestamp(ts) => write!(f, "{}", ts.format("%Y-%m-%dT%H:%M:%S%.6f")),
        }
    }
}

impl From<i64> for KeyValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<&str> for KeyValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for KeyValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<NaiveDate> for KeyValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}
