//! JSON seed files: index definitions plus their initial documents.
//!
//! ```json
//! {
//!   "indexes": [
//!     {
//!       "id": "products",
//!       "name": "products",
//!       "mappings": { "title": "text", "price": "number" },
//!       "documents": [
//!         { "id": "1", "fields": { "title": "red shoes", "price": 40 } }
//!       ]
//!     }
//!   ]
//! }
//! ```
//!
//! An index without an `id` gets a generated one. Each index's documents are
//! added as one batch, so a bad document leaves that index empty.

use std::fs;
use std::path::Path;

use index::{Document, FieldMappings, IndexError, IndexId, IndexMeta, IndexStore};
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Value as JsonValue};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("failed to read seed file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse seed JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("seed index `{index}`: {source}")]
    Index {
        index: String,
        #[source]
        source: IndexError,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct SeedFile {
    #[serde(default)]
    pub indexes: Vec<SeedIndex>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedIndex {
    #[serde(default)]
    pub id: Option<IndexId>,
    pub name: String,
    pub mappings: FieldMappings,
    #[serde(default)]
    pub documents: Vec<SeedDocument>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeedDocument {
    pub id: String,
    #[serde(default)]
    pub fields: JsonMap<String, JsonValue>,
}

impl SeedFile {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SeedError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, SeedError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Register every index and load its documents. Returns the ids of the
    /// indexes in file order.
    pub fn apply(&self, store: &IndexStore) -> Result<Vec<IndexId>, SeedError> {
        let mut ids = Vec::with_capacity(self.indexes.len());
        for seed in &self.indexes {
            let wrap = |source: IndexError| SeedError::Index {
                index: seed.name.clone(),
                source,
            };
            let id = match &seed.id {
                Some(id) => {
                    store
                        .register_index(IndexMeta::new(id.clone(), &seed.name, seed.mappings.clone()))
                        .map_err(wrap)?;
                    id.clone()
                }
                None => store
                    .create_index(&seed.name, seed.mappings.clone())
                    .map_err(wrap)?,
            };

            let documents = seed
                .documents
                .iter()
                .map(|doc| Document::from_json(doc.id.clone(), &seed.mappings, &doc.fields))
                .collect::<Result<Vec<_>, _>>()
                .map_err(wrap)?;
            if !documents.is_empty() {
                store.add_documents(&id, documents).map_err(wrap)?;
            }
            tracing::info!(
                index_id = %id,
                name = %seed.name,
                documents = seed.documents.len(),
                "seed index loaded"
            );
            ids.push(id);
        }
        Ok(ids)
    }
}

/// Read `path` and apply it to `store`.
pub fn load_seed<P: AsRef<Path>>(path: P, store: &IndexStore) -> Result<Vec<IndexId>, SeedError> {
    SeedFile::from_file(path)?.apply(store)
}
