use std::cmp::Ordering;
use std::sync::Arc;
use std::time::{Duration, Instant};

use hashbrown::HashMap;
use index::{FieldType, IndexSnapshot, SnapshotEntry, SnapshotSource};

use crate::config::QueryConfig;
use crate::error::QueryError;
use crate::filter::compile_filters;
use crate::metrics::metrics_recorder;
use crate::score::TermQuery;
use crate::types::{Hit, Query, ResultSet, SortField, SortOrder, SuggestRequest};

/// Documents scanned between two deadline checks.
pub const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Point in time after which a call gives up.
#[derive(Debug, Clone, Copy)]
struct Deadline {
    at: Instant,
    budget: Duration,
}

impl Deadline {
    /// The configured budget, counted from `start`.
    fn after(start: Instant, budget: Duration) -> Self {
        // Budgets past the platform's `Instant` range never expire.
        let at = start
            .checked_add(budget)
            .unwrap_or_else(|| start + Duration::from_secs(u32::MAX.into()));
        Self { at, budget }
    }

    /// An explicit point in time; the budget is whatever remains of it.
    fn at(start: Instant, at: Instant) -> Self {
        Self {
            at,
            budget: at.saturating_duration_since(start),
        }
    }

    fn check(&self) -> Result<(), QueryError> {
        if Instant::now() >= self.at {
            Err(QueryError::QueryTimeout {
                budget: self.budget,
            })
        } else {
            Ok(())
        }
    }
}

/// A document that survived filtering, with its relevance.
struct Candidate<'a> {
    entry: &'a SnapshotEntry,
    score: f64,
}

impl Candidate<'_> {
    fn id(&self) -> &str {
        &self.entry.document().id
    }
}

/// Read-only query engine over published index snapshots.
///
/// The engine holds no per-call state: every call resolves one immutable
/// snapshot and works on it alone, so a single instance can be shared across
/// threads behind an `Arc`.
pub struct QueryEngine {
    source: Arc<dyn SnapshotSource>,
    config: QueryConfig,
}

impl QueryEngine {
    pub fn new(source: Arc<dyn SnapshotSource>, config: QueryConfig) -> Result<Self, QueryError> {
        config.validate()?;
        Ok(Self { source, config })
    }

    pub fn config(&self) -> &QueryConfig {
        &self.config
    }

    fn resolve(&self, index_id: &str) -> Result<Arc<IndexSnapshot>, QueryError> {
        self.source
            .snapshot(index_id)
            .ok_or_else(|| QueryError::IndexNotFound(index_id.to_string()))
    }

    /// Run `query` against the current snapshot of its index.
    pub fn execute(&self, query: &Query) -> Result<ResultSet, QueryError> {
        let deadline = Deadline::after(Instant::now(), self.config.timeout);
        let snapshot = self.resolve(&query.index_id)?;
        self.execute_within(&snapshot, query, deadline)
    }

    /// Run `query` against a snapshot the caller already holds.
    pub fn execute_on(&self, snapshot: &IndexSnapshot, query: &Query) -> Result<ResultSet, QueryError> {
        let deadline = Deadline::after(Instant::now(), self.config.timeout);
        self.execute_within(snapshot, query, deadline)
    }

    /// Run `query` with an explicit deadline instead of the configured budget.
    pub fn execute_before(
        &self,
        snapshot: &IndexSnapshot,
        query: &Query,
        deadline: Instant,
    ) -> Result<ResultSet, QueryError> {
        self.execute_within(snapshot, query, Deadline::at(Instant::now(), deadline))
    }

    fn execute_within(
        &self,
        snapshot: &IndexSnapshot,
        query: &Query,
        deadline: Deadline,
    ) -> Result<ResultSet, QueryError> {
        if snapshot.id() != &query.index_id {
            return Err(QueryError::IndexNotFound(query.index_id.clone()));
        }
        let start = Instant::now();
        let outcome = self.run_execute(snapshot, query, start, deadline);

        match &outcome {
            Ok(results) => {
                tracing::debug!(
                    index_id = %query.index_id,
                    version = results.version,
                    total = results.total,
                    returned = results.hits.len(),
                    elapsed_ms = results.execution_time.as_secs_f64() * 1_000.0,
                    "query executed"
                );
                if let Some(recorder) = metrics_recorder() {
                    recorder.record_execute(
                        &query.index_id,
                        results.execution_time,
                        results.total,
                        results.hits.len(),
                    );
                }
            }
            Err(QueryError::QueryTimeout { budget }) => {
                self.report_timeout(&query.index_id, *budget, "execute");
            }
            Err(_) => {}
        }
        outcome
    }

    fn run_execute(
        &self,
        snapshot: &IndexSnapshot,
        query: &Query,
        start: Instant,
        deadline: Deadline,
    ) -> Result<ResultSet, QueryError> {
        let page_size = query.page_size.unwrap_or(self.config.default_page_size);
        if page_size == 0 || page_size > self.config.max_page_size {
            return Err(QueryError::invalid(
                "page_size",
                format!("must be between 1 and {}", self.config.max_page_size),
            ));
        }
        if query.page == 0 {
            return Err(QueryError::invalid("page", "must be at least 1"));
        }

        let mappings = snapshot.mappings();
        let filters = compile_filters(&query.filters, mappings)?;
        if let SortField::Field(name) = &query.sort.field {
            if !mappings.contains(name) {
                return Err(QueryError::invalid(
                    name.as_str(),
                    "sort field is not declared in the index mappings",
                ));
            }
        }
        let term = query.term.as_deref().and_then(TermQuery::parse);

        let mut candidates = Vec::new();
        for (i, entry) in snapshot.entries().iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                deadline.check()?;
            }
            if !filters.iter().all(|f| f.matches(entry.document())) {
                continue;
            }
            let score = match &term {
                Some(term) if !term.matches(entry.stats()) => continue,
                Some(term) => term.score(entry.stats(), snapshot),
                None => 1.0,
            };
            candidates.push(Candidate { entry, score });
        }

        deadline.check()?;
        sort_candidates(&mut candidates, &query.sort.field, query.sort.effective_order());
        deadline.check()?;

        let total = candidates.len();
        let offset = (query.page - 1).saturating_mul(page_size);
        let hits = candidates
            .iter()
            .skip(offset)
            .take(page_size)
            .map(|candidate| {
                let document = candidate.entry.document();
                Hit {
                    id: document.id.clone(),
                    score: candidate.score as f32,
                    excerpt: term.as_ref().and_then(|term| {
                        term.excerpt(document, mappings, self.config.excerpt_chars)
                    }),
                    fields: document.fields.clone(),
                }
            })
            .collect();
        let execution_time = start.elapsed();

        Ok(ResultSet {
            hits,
            total,
            page: query.page,
            page_size,
            version: snapshot.version(),
            execution_time,
        })
    }

    /// Prefix suggestions from the current snapshot of the request's index.
    pub fn suggest(&self, request: &SuggestRequest) -> Result<Vec<String>, QueryError> {
        let deadline = Deadline::after(Instant::now(), self.config.timeout);
        let snapshot = self.resolve(&request.index_id)?;
        self.suggest_within(&snapshot, request, deadline)
    }

    pub fn suggest_on(
        &self,
        snapshot: &IndexSnapshot,
        request: &SuggestRequest,
    ) -> Result<Vec<String>, QueryError> {
        let deadline = Deadline::after(Instant::now(), self.config.timeout);
        self.suggest_within(snapshot, request, deadline)
    }

    pub fn suggest_before(
        &self,
        snapshot: &IndexSnapshot,
        request: &SuggestRequest,
        deadline: Instant,
    ) -> Result<Vec<String>, QueryError> {
        self.suggest_within(snapshot, request, Deadline::at(Instant::now(), deadline))
    }

    fn suggest_within(
        &self,
        snapshot: &IndexSnapshot,
        request: &SuggestRequest,
        deadline: Deadline,
    ) -> Result<Vec<String>, QueryError> {
        if snapshot.id() != &request.index_id {
            return Err(QueryError::IndexNotFound(request.index_id.clone()));
        }
        let start = Instant::now();
        let outcome = self.run_suggest(snapshot, request, deadline);

        match &outcome {
            Ok(values) => {
                let latency = start.elapsed();
                tracing::debug!(
                    index_id = %request.index_id,
                    field = %request.field,
                    returned = values.len(),
                    elapsed_ms = latency.as_secs_f64() * 1_000.0,
                    "suggestions served"
                );
                if let Some(recorder) = metrics_recorder() {
                    recorder.record_suggest(&request.index_id, latency, values.len());
                }
            }
            Err(QueryError::QueryTimeout { budget }) => {
                self.report_timeout(&request.index_id, *budget, "suggest");
            }
            Err(_) => {}
        }
        outcome
    }

    fn run_suggest(
        &self,
        snapshot: &IndexSnapshot,
        request: &SuggestRequest,
        deadline: Deadline,
    ) -> Result<Vec<String>, QueryError> {
        if request.limit == 0 || request.limit > self.config.max_suggestions {
            return Err(QueryError::invalid(
                "limit",
                format!("must be between 1 and {}", self.config.max_suggestions),
            ));
        }
        match snapshot.mappings().get(&request.field) {
            None => {
                return Err(QueryError::invalid(
                    request.field.as_str(),
                    "field is not declared in the index mappings",
                ))
            }
            Some(field_type) if !field_type.is_textual() => {
                return Err(QueryError::invalid(
                    request.field.as_str(),
                    format!(
                        "suggestions need a {} or {} field, not {field_type}",
                        FieldType::Text,
                        FieldType::Keyword
                    ),
                ))
            }
            Some(_) => {}
        }

        let prefix = canonical::normalize(&request.prefix);
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for (i, document) in snapshot.documents().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 {
                deadline.check()?;
            }
            let Some(value) = document.get(&request.field).and_then(|v| v.as_str()) else {
                continue;
            };
            if canonical::starts_with_normalized(value, &prefix) {
                *counts.entry(value).or_insert(0) += 1;
            }
        }
        deadline.check()?;

        let mut ranked: Vec<(&str, usize)> = counts.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        Ok(ranked
            .into_iter()
            .take(request.limit)
            .map(|(value, _)| value.to_string())
            .collect())
    }

    fn report_timeout(&self, index_id: &str, budget: Duration, operation: &str) {
        tracing::warn!(
            index_id,
            operation,
            budget_ms = budget.as_millis() as u64,
            "query timed out"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_timeout(index_id, budget);
        }
    }
}

/// Order candidates by the requested key; ties fall back to ascending id.
///
/// For field sorts, documents without the field go last whatever the order.
fn sort_candidates(candidates: &mut [Candidate<'_>], field: &SortField, order: SortOrder) {
    let directed = |ordering: Ordering| match order {
        SortOrder::Asc => ordering,
        SortOrder::Desc => ordering.reverse(),
    };
    match field {
        SortField::Score => candidates.sort_by(|a, b| {
            directed(a.score.total_cmp(&b.score)).then_with(|| a.id().cmp(b.id()))
        }),
        SortField::Field(name) => candidates.sort_by(|a, b| {
            let left = a.entry.document().get(name);
            let right = b.entry.document().get(name);
            let by_value = match (left, right) {
                (Some(l), Some(r)) => directed(l.compare(r).unwrap_or(Ordering::Equal)),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            by_value.then_with(|| a.id().cmp(b.id()))
        }),
    }
}
