use crate::error::ServerResult;
use crate::state::ServerState;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use docsearch::{Constraint, Query, QueryError, ResultSet, SortSpec, SuggestRequest};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::sync::Arc;

/// Search request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Index to search
    pub index_id: String,

    /// Free-text term; omitted or empty matches every document
    #[serde(default)]
    pub query: Option<String>,

    /// Field name to constraint: a scalar for equality, an array for
    /// membership, or an object with `min`/`max` bounds
    #[serde(default)]
    pub filters: Map<String, Value>,

    /// `{ "field": "<name>" | "_score", "order": "asc" | "desc" }`
    #[serde(default)]
    pub sort: SortSpec,

    /// 1-based page number
    #[serde(default = "default_page")]
    pub page: usize,

    /// Page size; engine default when omitted
    #[serde(default)]
    pub limit: Option<usize>,
}

impl SearchRequest {
    /// Convert into an engine query. Malformed filters are reported against
    /// their field name.
    pub fn into_query(self) -> Result<Query, QueryError> {
        let mut query = Query::new(self.index_id).sorted_by(self.sort);
        query.term = self.query;
        query.page = self.page;
        query.page_size = self.limit;
        for (field, value) in self.filters {
            let constraint =
                Constraint::from_json(value).map_err(|reason| QueryError::invalid(&field, reason))?;
            query.filters.insert(field, constraint);
        }
        Ok(query)
    }
}

/// Search response
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub results: Vec<SearchHit>,
    pub total: usize,
    /// Milliseconds spent matching, sorting and paginating
    pub execution_time: f64,
}

/// Single search result
#[derive(Debug, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    pub score: f32,
    pub fields: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<ExcerptBody>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ExcerptBody {
    pub field: String,
    pub text: String,
}

impl From<ResultSet> for SearchResponse {
    fn from(results: ResultSet) -> Self {
        Self {
            execution_time: results.execution_time.as_secs_f64() * 1_000.0,
            total: results.total,
            results: results
                .hits
                .into_iter()
                .map(|hit| SearchHit {
                    id: hit.id,
                    score: hit.score,
                    fields: hit
                        .fields
                        .iter()
                        .map(|(name, value)| (name.clone(), value.to_json()))
                        .collect(),
                    excerpt: hit.excerpt.map(|e| ExcerptBody {
                        field: e.field,
                        text: e.text,
                    }),
                })
                .collect(),
        }
    }
}

/// Suggestions request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionsRequest {
    pub index_id: String,
    pub field: String,
    #[serde(default)]
    pub prefix: String,
    #[serde(default = "default_suggestion_limit")]
    pub limit: usize,
}

fn default_page() -> usize {
    1
}

fn default_suggestion_limit() -> usize {
    10
}

/// Ranked, filtered, paginated search over one index.
///
/// # Errors
///
/// - `404 INDEX_NOT_FOUND` when `indexId` does not exist
/// - `400 INVALID_QUERY` for bad filters, sort or pagination (the message names
///   the field)
/// - `400 BAD_REQUEST` for malformed JSON
/// - `503 QUERY_TIMEOUT` when the engine's time budget runs out; retryable
pub async fn search(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> ServerResult<Json<SearchResponse>> {
    let Json(request) = payload?;
    let query = request.into_query()?;

    let service = state.service.clone();
    let results = tokio::task::spawn_blocking(move || service.search(&query)).await??;

    Ok(Json(SearchResponse::from(results)))
}

/// Distinct values of a text or keyword field starting with `prefix`, most
/// frequent first.
pub async fn suggestions(
    State(state): State<Arc<ServerState>>,
    payload: Result<Json<SuggestionsRequest>, JsonRejection>,
) -> ServerResult<Json<Vec<String>>> {
    let Json(request) = payload?;
    let request = SuggestRequest::new(request.index_id, request.field, request.prefix, request.limit);

    let service = state.service.clone();
    let values = tokio::task::spawn_blocking(move || service.suggest(&request)).await??;

    Ok(Json(values))
}
