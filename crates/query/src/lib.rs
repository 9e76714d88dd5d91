//! # docsearch Query Engine (`query`)
//!
//! ## Purpose
//!
//! `query` answers search requests against the indexes held by an
//! [`index::IndexStore`] (or anything else implementing
//! [`index::SnapshotSource`]). A request names one index and combines an
//! optional free-text term, per-field filters, a sort key and a page. The
//! engine resolves one immutable snapshot per call, so concurrent ingestion
//! never leaks half-applied batches into a result.
//!
//! ## Core Types
//!
//! - [`Query`]: index id, term, filters, [`SortSpec`], page and page size.
//! - [`Constraint`]: `Equals`, inclusive `Range`, or `OneOf` on one field.
//! - [`ResultSet`]: one page of [`Hit`]s plus the pre-pagination `total`, the
//!   snapshot version and the execution time.
//! - [`SuggestRequest`]: prefix completion over a text or keyword field.
//! - [`QueryConfig`]: page-size bounds, time budget, excerpt length and
//!   suggestion limit.
//! - [`QueryEngine`]: the engine itself.
//!
//! ## Matching and ranking
//!
//! Terms are normalized (NFKC, lowercase) and split on Unicode word
//! boundaries. A document matches when any query token occurs in one of its
//! text fields. Relevance is length-normalized TF-IDF:
//! `Σ (tf / len) · ln(1 + N / df)`. Without a term every match scores `1.0`.
//! Ties on the sort key always fall back to ascending document id, so results
//! are deterministic for a given snapshot.
//!
//! ## Example Usage
//!
//! ```
//! use std::sync::Arc;
//! use index::{Document, FieldMappings, FieldType, FieldValue, IndexStore};
//! use query::{Constraint, Query, QueryConfig, QueryEngine};
//!
//! let store = Arc::new(IndexStore::new());
//! let id = store
//!     .create_index(
//!         "products",
//!         FieldMappings::new()
//!             .with_field("title", FieldType::Text)
//!             .with_field("price", FieldType::Number),
//!     )
//!     .unwrap();
//! store
//!     .add_document(
//!         &id,
//!         Document::new("1")
//!             .with_field("title", FieldValue::Text("red shoes".into()))
//!             .with_field("price", FieldValue::Number(40.0)),
//!     )
//!     .unwrap();
//!
//! let engine = QueryEngine::new(store, QueryConfig::default()).unwrap();
//! let results = engine
//!     .execute(
//!         &Query::new(id)
//!             .with_term("shoes")
//!             .with_filter("price", Constraint::range(None, Some(50.into()))),
//!     )
//!     .unwrap();
//! assert_eq!(results.total, 1);
//! assert_eq!(results.hits[0].id, "1");
//! ```
//!
//! ## Time budget
//!
//! Every call runs against a deadline (`QueryConfig::timeout`, or an explicit
//! instant via [`QueryEngine::execute_before`]). The deadline is checked every
//! [`DEADLINE_CHECK_INTERVAL`] documents and around sorting; once it passes the
//! call fails with [`QueryError::QueryTimeout`] and returns nothing.
//!
//! ## Observability
//!
//! Install a [`QueryMetrics`] implementation via [`set_query_metrics`] to
//! record latency, result counts and timeouts.

pub mod config;
pub mod engine;
pub mod error;
mod filter;
pub mod metrics;
mod score;
pub(crate) mod serde_millis;
pub mod types;

pub use crate::config::QueryConfig;
pub use crate::engine::{QueryEngine, DEADLINE_CHECK_INTERVAL};
pub use crate::error::QueryError;
pub use crate::metrics::{set_query_metrics, QueryMetrics};
pub use crate::types::{
    Constraint, Excerpt, Hit, Query, ResultSet, SortField, SortOrder, SortSpec, SuggestRequest,
    SCORE_SORT_KEY,
};
