//! Pager configuration
//!
//! A config file names the grouped relation to page through and the lax
//! sizing settings:
//!
//! ```yaml
//! source:
//!   database: events.duckdb
//!   table: events
//!   group_by: day
//! pagination:
//!   want_per_page: 25
//!   lax_threshold: 0.5
//! ```

use crate::error::{Error, Result, ResultExt};
use crate::pagination::LaxSettings;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::LazyLock;

/// Plain or schema-qualified SQL identifier
static IDENTIFIER_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z_][A-Za-z0-9_]*)*$").unwrap()
});

// ============================================================================
// Top-Level Config
// ============================================================================

/// Complete pager configuration loaded from YAML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Where the groups come from
    pub source: SourceConfig,

    /// Page sizing and ordering
    #[serde(default)]
    pub pagination: LaxSettings,
}

impl Config {
    /// Validate the whole configuration
    pub fn validate(&self) -> Result<()> {
        self.source.validate()?;
        self.pagination.validate()
    }
}

// ============================================================================
// Source Config
// ============================================================================

/// DuckDB relation grouped by one column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Database file path, or `:memory:`
    #[serde(default = "default_database")]
    pub database: String,

    /// Table or view to read (exclusive with `query`)
    #[serde(default)]
    pub table: Option<String>,

    /// Custom SELECT statement (exclusive with `table`)
    #[serde(default)]
    pub query: Option<String>,

    /// Grouping column
    pub group_by: String,

    /// Number of group counts fetched per round trip
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

fn default_database() -> String {
    ":memory:".to_string()
}

fn default_batch_size() -> usize {
    256
}

impl SourceConfig {
    /// Validate the source definition
    pub fn validate(&self) -> Result<()> {
        match (&self.table, &self.query) {
            (Some(_), Some(_)) => {
                return Err(Error::config(
                    "Source cannot define both 'table' and 'query'",
                ))
            }
            (None, None) => {
                return Err(Error::config("Source must define either 'table' or 'query'"))
            }
            (Some(table), None) => check_identifier("table", table, true)?,
            (None, Some(query)) if query.trim().is_empty() => {
                return Err(Error::invalid_value("query", "query cannot be empty"));
            }
            _ => {}
        }

        check_identifier("group_by", &self.group_by, false)?;

        if self.batch_size == 0 {
            return Err(Error::invalid_value(
                "batch_size",
                "batch_size must be greater than 0",
            ));
        }

        Ok(())
    }
}

/// Check that `value` can be spliced into SQL as an identifier
///
/// `qualified` allows dotted `schema.name` forms.
pub(crate) fn check_identifier(field: &str, value: &str, qualified: bool) -> Result<()> {
    if !IDENTIFIER_REGEX.is_match(value) || (!qualified && value.contains('.')) {
        return Err(Error::invalid_value(
            field,
            format!("'{value}' is not an identifier"),
        ));
    }
    Ok(())
}

// ============================================================================
// Loading
// ============================================================================

/// Load and validate a config file
pub fn load_config(path: impl AsRef<Path>) -> Result<Config> {
    let path = path.as_ref();
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            })
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read config '{}'", path.display()))
        }
    };
    load_config_from_str(&content)
}

/// Parse and validate a config from a YAML string
pub fn load_config_from_str(yaml: &str) -> Result<Config> {
    let config: Config = serde_yaml::from_str(yaml).context("Failed to parse config YAML")?;
    config.validate()?;
    Ok(config)
}
