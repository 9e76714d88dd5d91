//! Workspace umbrella crate for docsearch.
//!
//! This crate stitches the index store and the query engine together behind a
//! single [`SearchService`], driven by a YAML [`DocsearchConfig`] and an
//! optional JSON seed file. The member crates are re-exported so callers can
//! depend on `docsearch` alone.

mod config;
mod seed;

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

pub use canonical::{Token, normalize, tokenize};
pub use index::{
    CompressionCodec, CompressionConfig, Document, DocumentId, FieldMappings, FieldType,
    FieldValue, IndexError, IndexId, IndexMeta, IndexSnapshot, IndexStore, SnapshotSource,
};
pub use query::{
    Constraint, Excerpt, Hit, Query, QueryConfig, QueryEngine, QueryError, QueryMetrics,
    ResultSet, SortField, SortOrder, SortSpec, SuggestRequest, set_query_metrics,
};

pub use crate::config::{ConfigLoadError, DocsearchConfig, IndexYamlConfig};
pub use crate::seed::{SeedDocument, SeedError, SeedFile, SeedIndex, load_seed};

/// Errors raised while assembling a [`SearchService`].
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("configuration: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("seed: {0}")]
    Seed(#[from] SeedError),

    #[error("query engine: {0}")]
    Engine(#[from] QueryError),
}

/// An index store plus the query engine reading from it.
pub struct SearchService {
    config: DocsearchConfig,
    store: Arc<IndexStore>,
    engine: QueryEngine,
}

impl SearchService {
    /// Build an empty store, apply the configured seed file (if any) and start
    /// an engine over it.
    pub fn new(config: DocsearchConfig) -> Result<Self, ServiceError> {
        let store = Arc::new(IndexStore::new());
        if let Some(path) = &config.seed_path {
            let ids = load_seed(path, &store)?;
            tracing::info!(path = %path.display(), indexes = ids.len(), "seed applied");
        }
        Self::with_store(config, store)
    }

    /// Serve an existing store.
    pub fn with_store(config: DocsearchConfig, store: Arc<IndexStore>) -> Result<Self, ServiceError> {
        config.validate()?;
        let engine = QueryEngine::new(store.clone(), config.query.clone())?;
        Ok(Self {
            config,
            store,
            engine,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ServiceError> {
        Self::new(DocsearchConfig::from_file(path)?)
    }

    pub fn config(&self) -> &DocsearchConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<IndexStore> {
        &self.store
    }

    pub fn engine(&self) -> &QueryEngine {
        &self.engine
    }

    pub fn search(&self, query: &Query) -> Result<ResultSet, QueryError> {
        self.engine.execute(query)
    }

    pub fn suggest(&self, request: &SuggestRequest) -> Result<Vec<String>, QueryError> {
        self.engine.suggest(request)
    }

    /// Encode the current snapshot of `index_id` with the configured codec.
    pub fn export_index(&self, index_id: &str) -> Result<Vec<u8>, IndexError> {
        self.store
            .export(index_id, &self.config.index.compression_config())
    }

    /// Restore an index produced by [`SearchService::export_index`].
    pub fn import_index(&self, bytes: &[u8]) -> Result<IndexId, IndexError> {
        self.store
            .import(bytes, &self.config.index.compression_config())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> SearchService {
        let service = SearchService::new(DocsearchConfig::default()).unwrap();
        let id = service
            .store()
            .create_index(
                "notes",
                FieldMappings::new().with_field("body", FieldType::Text),
            )
            .unwrap();
        service
            .store()
            .add_document(
                &id,
                Document::new("n1").with_field("body", FieldValue::Text("hello world".into())),
            )
            .unwrap();
        service
    }

    #[test]
    fn search_goes_through_the_engine() {
        let service = service();
        let id = service.store().find_by_name("notes").unwrap();
        let results = service.search(&Query::new(id).with_term("hello")).unwrap();
        assert_eq!(results.total, 1);
    }

    #[test]
    fn export_then_import_under_a_fresh_service() {
        let source = service();
        let id = source.store().find_by_name("notes").unwrap();
        let bytes = source.export_index(&id).unwrap();

        let target = SearchService::new(DocsearchConfig::default()).unwrap();
        let restored = target.import_index(&bytes).unwrap();
        assert_eq!(restored, id);
        let results = target.search(&Query::new(restored).with_term("world")).unwrap();
        assert_eq!(results.ids(), vec!["n1"]);
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = DocsearchConfig::default();
        config.query.max_page_size = 0;
        assert!(matches!(
            SearchService::new(config),
            Err(ServiceError::Config(ConfigLoadError::Validation(_)))
        ));
    }
}
