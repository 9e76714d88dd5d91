//! docsearch Server - HTTP boundary for the docsearch query engine
//!
//! Exposes [`docsearch::SearchService`] over two JSON endpoints and maps
//! engine errors onto HTTP statuses.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use server::ServerConfig;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServerConfig::load()?;
//!     server::start_server(config).await?;
//!     Ok(())
//! }
//! ```
//!
//! # API Endpoints
//!
//! - `POST /search` - `{indexId, query?, filters?, sort?, page?, limit?}` →
//!   `{results: [{id, score, fields, excerpt?}], total, executionTime}`
//! - `POST /search/suggestions` - `{indexId, field, prefix?, limit?}` →
//!   `["value", ...]`
//!
//! Errors use the body `{"error": {"code", "message"}}`: unknown index → 404,
//! invalid query or malformed JSON → 400, time budget exceeded → 503.

pub mod config;
pub mod error;
pub mod metrics;
pub mod routes;
pub mod server;
pub mod state;

pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use server::{build_router, start_server};
pub use state::ServerState;
