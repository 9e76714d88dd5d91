use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Engine-wide limits and defaults.
///
/// `QueryConfig` is cheap to clone and serde-friendly so it can be embedded in
/// the top-level YAML config. Every field has a default, so an empty mapping
/// deserializes to [`QueryConfig::default`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct QueryConfig {
    /// Page size used when a query does not ask for one.
    #[serde(default = "QueryConfig::default_page_size")]
    pub default_page_size: usize,
    /// Largest page size a query may request.
    #[serde(default = "QueryConfig::default_max_page_size")]
    pub max_page_size: usize,
    /// Time budget for a single `execute` or `suggest` call.
    #[serde(
        rename = "timeout_ms",
        with = "crate::serde_millis",
        default = "QueryConfig::default_timeout"
    )]
    pub timeout: Duration,
    /// Maximum number of characters of source text in an excerpt.
    #[serde(default = "QueryConfig::default_excerpt_chars")]
    pub excerpt_chars: usize,
    /// Largest `limit` a suggestion request may ask for.
    #[serde(default = "QueryConfig::default_max_suggestions")]
    pub max_suggestions: usize,
}

impl QueryConfig {
    pub(crate) fn default_page_size() -> usize {
        10
    }

    pub(crate) fn default_max_page_size() -> usize {
        100
    }

    pub(crate) fn default_timeout() -> Duration {
        Duration::from_millis(5_000)
    }

    pub(crate) fn default_excerpt_chars() -> usize {
        160
    }

    pub(crate) fn default_max_suggestions() -> usize {
        50
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_page_sizes(mut self, default_page_size: usize, max_page_size: usize) -> Self {
        self.default_page_size = default_page_size;
        self.max_page_size = max_page_size;
        self
    }

    pub fn with_excerpt_chars(mut self, excerpt_chars: usize) -> Self {
        self.excerpt_chars = excerpt_chars;
        self
    }

    pub fn validate(&self) -> Result<(), QueryError> {
        if self.max_page_size == 0 {
            return Err(QueryError::InvalidConfig(
                "max_page_size must be greater than zero".into(),
            ));
        }
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(QueryError::InvalidConfig(format!(
                "default_page_size must be between 1 and max_page_size ({})",
                self.max_page_size
            )));
        }
        if self.timeout.is_zero() {
            return Err(QueryError::InvalidConfig(
                "timeout_ms must be greater than zero".into(),
            ));
        }
        if self.excerpt_chars == 0 {
            return Err(QueryError::InvalidConfig(
                "excerpt_chars must be greater than zero".into(),
            ));
        }
        if self.max_suggestions == 0 {
            return Err(QueryError::InvalidConfig(
                "max_suggestions must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_page_size: Self::default_page_size(),
            max_page_size: Self::default_max_page_size(),
            timeout: Self::default_timeout(),
            excerpt_chars: Self::default_excerpt_chars(),
            max_suggestions: Self::default_max_suggestions(),
        }
    }
}
