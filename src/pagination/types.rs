//! Pagination types
//!
//! Settings for the lax paginator and the boundary of a single page.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sizing and ordering settings for a [`LaxGroupPaginator`](super::LaxGroupPaginator)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaxSettings {
    /// Ideal number of items per page
    #[serde(default = "default_want_per_page")]
    pub want_per_page: u64,

    /// Fraction of `want_per_page` a page may overflow before its last
    /// group is pushed to the next page (0 disables the rollback)
    #[serde(default = "default_lax_threshold")]
    pub lax_threshold: f64,

    /// Paginate from the greatest key down
    #[serde(default)]
    pub reverse: bool,
}

fn default_want_per_page() -> u64 {
    25
}

fn default_lax_threshold() -> f64 {
    0.5
}

impl Default for LaxSettings {
    fn default() -> Self {
        Self {
            want_per_page: default_want_per_page(),
            lax_threshold: default_lax_threshold(),
            reverse: false,
        }
    }
}

impl LaxSettings {
    /// Create settings with the given target page size
    pub fn new(want_per_page: u64, lax_threshold: f64) -> Self {
        Self {
            want_per_page,
            lax_threshold,
            reverse: false,
        }
    }

    /// Paginate in descending key order
    #[must_use]
    pub fn reversed(mut self) -> Self {
        self.reverse = true;
        self
    }

    /// Upper bound on page size before the rollback rule applies
    pub fn lax_max(&self) -> f64 {
        self.want_per_page as f64 * (1.0 + self.lax_threshold)
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.want_per_page == 0 {
            return Err(Error::invalid_configuration(
                "want_per_page must be greater than 0",
            ));
        }
        if !self.lax_threshold.is_finite() || self.lax_threshold < 0.0 {
            return Err(Error::invalid_configuration(format!(
                "lax_threshold must be a finite number >= 0, got {}",
                self.lax_threshold
            )));
        }
        Ok(())
    }
}

/// Keys delimiting a page and its neighbours
///
/// `start` and `end` are inclusive and ordered by the page direction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageBoundary<K> {
    /// First group on the page
    pub start: K,
    /// Last group on the page
    pub end: K,
    /// First group of the following page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<K>,
    /// Group immediately before `start`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous: Option<K>,
}
