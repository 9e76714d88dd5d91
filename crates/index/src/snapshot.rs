use std::sync::Arc;

use hashbrown::HashMap;

use crate::document::{Document, DocumentId};
use crate::schema::{FieldMappings, IndexId, IndexMeta};
use crate::IndexError;

/// Token statistics for one document, computed over all of its `Text` fields.
#[derive(Debug, Clone, Default)]
pub struct DocumentStats {
    term_freqs: HashMap<String, u32>,
    token_count: u32,
}

impl DocumentStats {
    fn from_document(doc: &Document, mappings: &FieldMappings) -> Self {
        let mut stats = DocumentStats::default();
        for field in mappings.text_fields() {
            let Some(text) = doc.get(field).and_then(|v| v.as_str()) else {
                continue;
            };
            for token in canonical::tokenize(text) {
                *stats.term_freqs.entry(token.text).or_insert(0) += 1;
                stats.token_count += 1;
            }
        }
        stats
    }

    /// Occurrences of `token` (already normalized) across the text fields.
    pub fn term_freq(&self, token: &str) -> u32 {
        self.term_freqs.get(token).copied().unwrap_or(0)
    }

    pub fn token_count(&self) -> u32 {
        self.token_count
    }

    pub fn distinct_terms(&self) -> impl Iterator<Item = &str> {
        self.term_freqs.keys().map(String::as_str)
    }
}

/// A document paired with its precomputed statistics.
#[derive(Debug, Clone)]
pub struct SnapshotEntry {
    document: Arc<Document>,
    stats: Arc<DocumentStats>,
}

impl SnapshotEntry {
    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn stats(&self) -> &DocumentStats {
        &self.stats
    }
}

/// Immutable, point-in-time view of one index.
///
/// A snapshot never changes after construction. Ingestion produces a new
/// snapshot with a higher `version`; documents and their statistics are shared
/// between versions through `Arc`, so readers holding an older snapshot keep a
/// consistent view for as long as they need it.
#[derive(Debug, Clone)]
pub struct IndexSnapshot {
    meta: Arc<IndexMeta>,
    version: u64,
    entries: Vec<SnapshotEntry>,
    positions: HashMap<DocumentId, usize>,
    doc_freqs: HashMap<String, u32>,
}

impl IndexSnapshot {
    /// Version 0: no documents.
    pub fn empty(meta: IndexMeta) -> Result<Self, IndexError> {
        meta.validate()?;
        Ok(Self {
            meta: Arc::new(meta),
            version: 0,
            entries: Vec::new(),
            positions: HashMap::new(),
            doc_freqs: HashMap::new(),
        })
    }

    /// Build a snapshot directly from documents, validating each one.
    pub fn from_parts(
        meta: IndexMeta,
        version: u64,
        documents: Vec<Document>,
    ) -> Result<Self, IndexError> {
        let mut snapshot = Self::empty(meta)?;
        snapshot.append(documents)?;
        snapshot.version = version;
        Ok(snapshot)
    }

    /// Next version of this snapshot with `documents` appended.
    ///
    /// Fails without side effects if any document is invalid or its id is
    /// already taken (in the snapshot or earlier in the batch).
    pub fn with_appended(&self, documents: Vec<Document>) -> Result<Self, IndexError> {
        let mut next = self.clone();
        next.append(documents)?;
        next.version = self.version + 1;
        Ok(next)
    }

    fn append(&mut self, documents: Vec<Document>) -> Result<(), IndexError> {
        for doc in &documents {
            doc.validate(&self.meta.mappings)?;
        }
        self.entries.reserve(documents.len());
        for doc in documents {
            if self.positions.contains_key(&doc.id) {
                return Err(IndexError::DuplicateDocument {
                    index: self.meta.id.clone(),
                    id: doc.id,
                });
            }
            let stats = DocumentStats::from_document(&doc, &self.meta.mappings);
            for term in stats.distinct_terms() {
                *self.doc_freqs.entry_ref(term).or_insert(0) += 1;
            }
            self.positions.insert(doc.id.clone(), self.entries.len());
            self.entries.push(SnapshotEntry {
                document: Arc::new(doc),
                stats: Arc::new(stats),
            });
        }
        Ok(())
    }

    pub fn meta(&self) -> &IndexMeta {
        &self.meta
    }

    pub fn id(&self) -> &IndexId {
        &self.meta.id
    }

    pub fn mappings(&self) -> &FieldMappings {
        &self.meta.mappings
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn entries(&self) -> &[SnapshotEntry] {
        &self.entries
    }

    pub fn documents(&self) -> impl Iterator<Item = &Document> {
        self.entries.iter().map(SnapshotEntry::document)
    }

    pub fn get(&self, id: &str) -> Option<&Document> {
        self.positions.get(id).map(|&pos| self.entries[pos].document())
    }

    /// Number of documents whose text fields contain `token` (already normalized).
    pub fn doc_freq(&self, token: &str) -> u32 {
        self.doc_freqs.get(token).copied().unwrap_or(0)
    }
}
