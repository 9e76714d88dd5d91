use crate::config::ServerConfig;
use crate::error::ServerResult;
use docsearch::{DocsearchConfig, SearchService};
use std::sync::Arc;

/// Shared application state
#[derive(Clone)]
pub struct ServerState {
    /// Server configuration
    pub config: Arc<ServerConfig>,

    /// Store and engine (shared across requests)
    pub service: Arc<SearchService>,
}

impl ServerState {
    /// Create new server state, loading the docsearch config named by
    /// `pipeline_config` (and its seed file) if one is set
    pub fn new(config: ServerConfig) -> ServerResult<Self> {
        let pipeline = match &config.pipeline_config {
            Some(path) => DocsearchConfig::from_file(path).map_err(docsearch::ServiceError::from)?,
            None => DocsearchConfig::default(),
        };
        let service = SearchService::new(pipeline)?;
        Ok(Self::with_service(config, Arc::new(service)))
    }

    /// Wrap an already-built service
    pub fn with_service(config: ServerConfig, service: Arc<SearchService>) -> Self {
        Self {
            config: Arc::new(config),
            service,
        }
    }
}
