//! # docsearch index
//!
//! The index store the query engine reads from. It owns index definitions,
//! validates documents against their index's field mappings at ingestion, and
//! publishes immutable, versioned snapshots for readers.
//!
//! ## Core Features
//!
//! - **Typed schema**: every index declares its fields as `text`, `number`,
//!   `keyword` or `date` ([`FieldMappings`]); documents whose values disagree
//!   with the mapping are rejected with a typed [`IndexError`].
//! - **Versioned snapshots**: ingestion never mutates a published
//!   [`IndexSnapshot`]. It builds the next version (sharing unchanged documents
//!   through `Arc`) and swaps it in, so a reader holding a snapshot has a stable
//!   view for the whole duration of a query.
//! - **Precomputed statistics**: each snapshot carries per-document term
//!   frequencies and per-term document frequencies for its `text` fields.
//! - **Portable encoding**: snapshots can be exported and imported as bincode,
//!   optionally zstd-compressed ([`CompressionConfig`]).
//!
//! ## Example Usage
//!
//! ```
//! use index::{Document, FieldMappings, FieldType, FieldValue, IndexStore, SnapshotSource};
//!
//! let store = IndexStore::new();
//! let mappings = FieldMappings::new()
//!     .with_field("title", FieldType::Text)
//!     .with_field("price", FieldType::Number);
//! let id = store.create_index("products", mappings).unwrap();
//!
//! store
//!     .add_document(
//!         &id,
//!         Document::new("1")
//!             .with_field("title", FieldValue::Text("red shoes".into()))
//!             .with_field("price", FieldValue::Number(49.0)),
//!     )
//!     .unwrap();
//!
//! let snapshot = store.snapshot(&id).expect("index exists");
//! assert_eq!(snapshot.version(), 1);
//! assert_eq!(snapshot.doc_freq("shoes"), 1);
//! ```

mod codec;
mod document;
mod schema;
mod snapshot;
mod store;

pub use crate::codec::{
    decode_snapshot, encode_snapshot, CompressionCodec, CompressionConfig,
    SNAPSHOT_SCHEMA_VERSION,
};
pub use crate::document::{Document, DocumentId, FieldValue};
pub use crate::schema::{FieldMappings, FieldType, IndexId, IndexMeta};
pub use crate::snapshot::{DocumentStats, IndexSnapshot, SnapshotEntry};
pub use crate::store::{IndexStore, SnapshotSource};

use bincode::error::{DecodeError, EncodeError};
use thiserror::Error;

/// Errors raised by the index store.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IndexError {
    #[error("index already exists: {0}")]
    DuplicateIndex(String),
    #[error("unknown index: {0}")]
    UnknownIndex(String),
    #[error("invalid index definition: {0}")]
    InvalidMeta(String),
    #[error("document {id} already exists in index {index}")]
    DuplicateDocument { index: IndexId, id: DocumentId },
    #[error("field {0} is not declared in the index mappings")]
    UnmappedField(String),
    #[error("field {field} expects {expected} values, got {found}")]
    FieldTypeMismatch {
        field: String,
        expected: FieldType,
        found: FieldType,
    },
    #[error("invalid value for field {field}: {reason}")]
    InvalidValue { field: String, reason: String },
    #[error("Backend error: {0}")]
    Backend(String),
    #[error("Serialization encode error: {0}")]
    Encode(String),
    #[error("Serialization decode error: {0}")]
    Decode(String),
    #[error("Compression error: {0}")]
    Compression(String),
}

impl From<EncodeError> for IndexError {
    fn from(e: EncodeError) -> Self {
        IndexError::Encode(e.to_string())
    }
}

impl From<DecodeError> for IndexError {
    fn from(e: DecodeError) -> Self {
        IndexError::Decode(e.to_string())
    }
}

impl From<std::io::Error> for IndexError {
    fn from(e: std::io::Error) -> Self {
        IndexError::Compression(e.to_string())
    }
}

impl IndexError {
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }
}
