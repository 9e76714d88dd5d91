use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::codec::{decode_snapshot, encode_snapshot, CompressionConfig};
use crate::document::Document;
use crate::schema::{FieldMappings, IndexId, IndexMeta};
use crate::snapshot::IndexSnapshot;
use crate::IndexError;

/// Read access to published snapshots.
///
/// The query engine only ever sees indexes through this trait. Implementations
/// must hand out immutable snapshots: whatever a caller receives stays valid and
/// unchanged for as long as it holds the `Arc`.
pub trait SnapshotSource: Send + Sync {
    /// Current snapshot of `index_id`, or `None` if no such index exists.
    fn snapshot(&self, index_id: &str) -> Option<Arc<IndexSnapshot>>;
}

#[derive(Default)]
struct Catalog {
    by_id: HashMap<IndexId, Arc<IndexSnapshot>>,
    by_name: HashMap<String, IndexId>,
}

/// In-process index store with copy-on-write snapshot versions.
///
/// Writers build the next snapshot outside the lock and publish it with a
/// compare-and-swap on the version number; readers only take the read lock long
/// enough to clone an `Arc`.
#[derive(Default)]
pub struct IndexStore {
    catalog: RwLock<Catalog>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty index with a generated id.
    pub fn create_index(
        &self,
        name: impl Into<String>,
        mappings: FieldMappings,
    ) -> Result<IndexId, IndexError> {
        let id = uuid::Uuid::new_v4().to_string();
        self.register_index(IndexMeta::new(id.clone(), name, mappings))?;
        Ok(id)
    }

    /// Register an empty index with caller-chosen metadata.
    pub fn register_index(&self, meta: IndexMeta) -> Result<(), IndexError> {
        let snapshot = IndexSnapshot::empty(meta)?;
        self.install(snapshot)
    }

    /// Install a complete snapshot (e.g. one restored with [`IndexStore::import`]).
    fn install(&self, snapshot: IndexSnapshot) -> Result<(), IndexError> {
        let mut catalog = self.write()?;
        let meta = snapshot.meta();
        if catalog.by_id.contains_key(&meta.id) {
            return Err(IndexError::DuplicateIndex(meta.id.clone()));
        }
        if catalog.by_name.contains_key(&meta.name) {
            return Err(IndexError::DuplicateIndex(meta.name.clone()));
        }
        tracing::info!(
            index_id = %meta.id,
            name = %meta.name,
            fields = meta.mappings.len(),
            documents = snapshot.len(),
            "index registered"
        );
        catalog.by_name.insert(meta.name.clone(), meta.id.clone());
        catalog
            .by_id
            .insert(meta.id.clone(), Arc::new(snapshot));
        Ok(())
    }

    /// Append documents to an index and publish the next snapshot version.
    ///
    /// The batch is all-or-nothing: one invalid or duplicate document rejects
    /// the whole batch and leaves the current version in place.
    pub fn add_documents(
        &self,
        index_id: &str,
        documents: Vec<Document>,
    ) -> Result<u64, IndexError> {
        loop {
            let base = self.try_snapshot(index_id)?;
            let next = base.with_appended(documents.clone())?;
            let version = next.version();

            let mut catalog = self.write()?;
            let current = catalog
                .by_id
                .get_mut(index_id)
                .ok_or_else(|| IndexError::UnknownIndex(index_id.to_string()))?;
            if current.version() != base.version() {
                // Another writer published first; rebuild on top of its version.
                continue;
            }
            *current = Arc::new(next);
            tracing::debug!(
                index_id,
                version,
                documents = current.len(),
                "snapshot published"
            );
            return Ok(version);
        }
    }

    pub fn add_document(&self, index_id: &str, document: Document) -> Result<u64, IndexError> {
        self.add_documents(index_id, vec![document])
    }

    /// Like [`SnapshotSource::snapshot`] but with a typed error for unknown ids.
    pub fn try_snapshot(&self, index_id: &str) -> Result<Arc<IndexSnapshot>, IndexError> {
        self.read()?
            .by_id
            .get(index_id)
            .cloned()
            .ok_or_else(|| IndexError::UnknownIndex(index_id.to_string()))
    }

    pub fn find_by_name(&self, name: &str) -> Option<IndexId> {
        self.read().ok()?.by_name.get(name).cloned()
    }

    /// Metadata of every index, ordered by name.
    pub fn list_indexes(&self) -> Result<Vec<IndexMeta>, IndexError> {
        let catalog = self.read()?;
        let mut metas: Vec<IndexMeta> =
            catalog.by_id.values().map(|s| s.meta().clone()).collect();
        metas.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(metas)
    }

    pub fn get_document(
        &self,
        index_id: &str,
        document_id: &str,
    ) -> Result<Option<Document>, IndexError> {
        Ok(self.try_snapshot(index_id)?.get(document_id).cloned())
    }

    /// Encode the current snapshot of an index.
    pub fn export(
        &self,
        index_id: &str,
        compression: &CompressionConfig,
    ) -> Result<Vec<u8>, IndexError> {
        let snapshot = self.try_snapshot(index_id)?;
        encode_snapshot(&snapshot, compression)
    }

    /// Restore an index from bytes produced by [`IndexStore::export`].
    pub fn import(
        &self,
        data: &[u8],
        compression: &CompressionConfig,
    ) -> Result<IndexId, IndexError> {
        let snapshot = decode_snapshot(data, compression)?;
        let id = snapshot.id().clone();
        self.install(snapshot)?;
        Ok(id)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Catalog>, IndexError> {
        self.catalog
            .read()
            .map_err(|_| IndexError::backend("poisoned lock"))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Catalog>, IndexError> {
        self.catalog
            .write()
            .map_err(|_| IndexError::backend("poisoned lock"))
    }
}

impl SnapshotSource for IndexStore {
    fn snapshot(&self, index_id: &str) -> Option<Arc<IndexSnapshot>> {
        self.try_snapshot(index_id).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::CompressionCodec;
    use crate::document::FieldValue;
    use crate::schema::FieldType;

    fn mappings() -> FieldMappings {
        FieldMappings::new()
            .with_field("title", FieldType::Text)
            .with_field("price", FieldType::Number)
    }

    fn doc(id: &str, title: &str) -> Document {
        Document::new(id).with_field("title", FieldValue::Text(title.into()))
    }

    #[test]
    fn create_and_append_publishes_versions() {
        let store = IndexStore::new();
        let id = store.create_index("products", mappings()).unwrap();
        assert_eq!(store.find_by_name("products"), Some(id.clone()));

        let before = store.try_snapshot(&id).unwrap();
        let version = store
            .add_documents(&id, vec![doc("1", "red shoes"), doc("2", "blue shoes")])
            .unwrap();
        assert_eq!(version, 1);

        // The handle taken before ingestion still sees the old version.
        assert_eq!(before.len(), 0);
        assert_eq!(store.try_snapshot(&id).unwrap().len(), 2);
        assert_eq!(
            store.get_document(&id, "2").unwrap().map(|d| d.id),
            Some("2".to_string())
        );
    }

    #[test]
    fn duplicate_names_and_unknown_indexes_rejected() {
        let store = IndexStore::new();
        store.create_index("products", mappings()).unwrap();
        assert!(matches!(
            store.create_index("products", mappings()),
            Err(IndexError::DuplicateIndex(_))
        ));
        assert!(matches!(
            store.add_document("nope", doc("1", "x")),
            Err(IndexError::UnknownIndex(_))
        ));
        assert!(store.snapshot("nope").is_none());
    }

    #[test]
    fn rejected_batch_keeps_current_version() {
        let store = IndexStore::new();
        let id = store.create_index("products", mappings()).unwrap();
        store.add_document(&id, doc("1", "red shoes")).unwrap();

        let bad = Document::new("2").with_field("price", FieldValue::Text("cheap".into()));
        let err = store
            .add_documents(&id, vec![doc("3", "fine"), bad])
            .expect_err("mistyped document");
        assert!(matches!(err, IndexError::FieldTypeMismatch { .. }));

        let snapshot = store.try_snapshot(&id).unwrap();
        assert_eq!(snapshot.version(), 1);
        assert!(snapshot.get("3").is_none());
    }

    #[test]
    fn export_import_restores_index() {
        let source = IndexStore::new();
        let id = source.create_index("products", mappings()).unwrap();
        source.add_document(&id, doc("1", "red shoes")).unwrap();

        let cfg = CompressionConfig::default().with_codec(CompressionCodec::None);
        let bytes = source.export(&id, &cfg).unwrap();

        let target = IndexStore::new();
        let restored = target.import(&bytes, &cfg).unwrap();
        assert_eq!(restored, id);
        assert_eq!(target.try_snapshot(&id).unwrap().version(), 1);
        assert_eq!(target.list_indexes().unwrap()[0].name, "products");
    }
}
