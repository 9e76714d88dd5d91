//! API route handlers
//!
//! - `search`: ranked search and prefix suggestions

pub mod search;

use crate::error::ServerError;

/// 404 Not Found handler
///
/// Returns a standardized error response for undefined routes.
pub async fn not_found() -> ServerError {
    ServerError::NotFound
}
