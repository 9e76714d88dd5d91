use std::time::Duration;

use thiserror::Error;

/// Errors produced by the query engine.
///
/// Every failure is all-or-nothing: a call that returns an error never hands
/// back a partially computed result.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    /// The referenced index does not exist. Client error.
    #[error("index not found: {0}")]
    IndexNotFound(String),
    /// A filter, sort or pagination parameter is malformed. Client error;
    /// `field` names the offending parameter or document field.
    #[error("invalid query: {field}: {reason}")]
    InvalidQuery { field: String, reason: String },
    /// Execution ran past its time budget. Service error, retryable.
    #[error("query exceeded its time budget of {}ms", .budget.as_millis())]
    QueryTimeout { budget: Duration },
    /// Engine configuration rejected at construction.
    #[error("invalid query config: {0}")]
    InvalidConfig(String),
}

impl QueryError {
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        QueryError::InvalidQuery {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether retrying the same call may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, QueryError::QueryTimeout { .. })
    }

    /// Parameter or field named by an `InvalidQuery` error.
    pub fn field(&self) -> Option<&str> {
        match self {
            QueryError::InvalidQuery { field, .. } => Some(field),
            _ => None,
        }
    }
}
