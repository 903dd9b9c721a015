//! Error types for grouped-pager
//!
//! This module defines the error hierarchy for the entire crate.
//! All public APIs return `Result<T, Error>` where Error is defined here.

use thiserror::Error;

/// The main error type for grouped-pager
#[derive(Error, Debug)]
pub enum Error {
    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid config value for '{field}': {message}")]
    InvalidConfigValue { field: String, message: String },

    #[error("Failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    // ============================================================================
    // Pagination Errors
    // ============================================================================
    #[error("Invalid paginator configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("Grouping field has a NULL value; NULL groups cannot anchor a page")]
    NullGroupingValue,

    #[error("{anchor} is not a valid page")]
    EmptyPage { anchor: String },

    // ============================================================================
    // Source Errors
    // ============================================================================
    #[error("Group source error: {message}")]
    Source { message: String },

    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    // ============================================================================
    // Anchor Errors
    // ============================================================================
    #[error("Invalid anchor token: {message}")]
    InvalidAnchor { message: String },

    // ============================================================================
    // I/O Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("File not found: {path}")]
    FileNotFound { path: String },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create an invalid config value error
    pub fn invalid_value(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidConfigValue {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an invalid paginator configuration error
    pub fn invalid_configuration(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }

    /// Create an empty page error for the given anchor
    pub fn empty_page(anchor: impl std::fmt::Debug) -> Self {
        Self::EmptyPage {
            anchor: format!("{anchor:?}"),
        }
    }

    /// Create a source error
    pub fn source(message: impl Into<String>) -> Self {
        Self::Source {
            message: message.into(),
        }
    }

    /// Create an invalid anchor error
    pub fn invalid_anchor(message: impl Into<String>) -> Self {
        Self::InvalidAnchor {
            message: message.into(),
        }
    }

    /// Check if this error was caused by the page requested by the caller
    /// rather than by configuration or the backing store
    pub fn is_invalid_page(&self) -> bool {
        matches!(
            self,
            Error::EmptyPage { .. } | Error::InvalidAnchor { .. } | Error::NullGroupingValue
        )
    }
}

/// Result type alias for grouped-pager
pub type Result<T> = std::result::Result<T, Error>;

/// Extension trait for adding context to errors
pub trait ResultExt<T> {
    /// Add context to an error
    fn context(self, message: impl Into<String>) -> Result<T>;

    /// Add context with a closure (lazy evaluation)
    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T>;
}

impl<T, E: Into<Error>> ResultExt<T> for std::result::Result<T, E> {
    fn context(self, message: impl Into<String>) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", message.into(), inner))
        })
    }

    fn with_context<F: FnOnce() -> String>(self, f: F) -> Result<T> {
        self.map_err(|e| {
            let inner = e.into();
            Error::Other(format!("{}: {}", f(), inner))
        })
    }
}
