use std::collections::BTreeMap;
use std::time::Duration;

use index::{DocumentId, FieldValue, IndexId};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map as JsonMap, Value as JsonValue};

/// Name accepted in place of a field to sort by relevance.
pub const SCORE_SORT_KEY: &str = "_score";

/// Direction of a sort.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// What the result sequence is ordered by.
///
/// Serialized as a plain string: [`SCORE_SORT_KEY`] for relevance, otherwise
/// the name of a mapped field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SortField {
    #[default]
    Score,
    Field(String),
}

impl Serialize for SortField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SortField::Score => serializer.serialize_str(SCORE_SORT_KEY),
            SortField::Field(name) => serializer.serialize_str(name),
        }
    }
}

impl<'de> Deserialize<'de> for SortField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(SortField::from(name))
    }
}

impl From<String> for SortField {
    fn from(name: String) -> Self {
        if name == SCORE_SORT_KEY {
            SortField::Score
        } else {
            SortField::Field(name)
        }
    }
}

/// Sort key plus direction.
///
/// When `order` is omitted, relevance sorts descending and field sorts
/// ascending.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct SortSpec {
    #[serde(default)]
    pub field: SortField,
    #[serde(default)]
    pub order: Option<SortOrder>,
}

impl SortSpec {
    /// Relevance, best first.
    pub fn score() -> Self {
        Self::default()
    }

    pub fn by_field(field: impl Into<String>, order: SortOrder) -> Self {
        Self {
            field: SortField::Field(field.into()),
            order: Some(order),
        }
    }

    pub fn effective_order(&self) -> SortOrder {
        match (self.order, &self.field) {
            (Some(order), _) => order,
            (None, SortField::Score) => SortOrder::Desc,
            (None, SortField::Field(_)) => SortOrder::Asc,
        }
    }
}

/// A predicate on one field.
///
/// Values stay loosely typed until the engine compiles them against the
/// field's declared type. In JSON a scalar means `Equals`, an array means
/// `OneOf`, and an object carries either `eq`, `in`, or range bounds
/// (`min`/`gte`, `max`/`lte`, inclusive).
#[derive(Debug, Clone, PartialEq)]
pub enum Constraint {
    Equals(JsonValue),
    Range {
        min: Option<JsonValue>,
        max: Option<JsonValue>,
    },
    OneOf(Vec<JsonValue>),
}

impl Constraint {
    pub fn equals(value: impl Into<JsonValue>) -> Self {
        Constraint::Equals(value.into())
    }

    pub fn range(min: Option<JsonValue>, max: Option<JsonValue>) -> Self {
        Constraint::Range { min, max }
    }

    pub fn one_of<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<JsonValue>,
    {
        Constraint::OneOf(values.into_iter().map(Into::into).collect())
    }

    /// Interpret a JSON filter value. The error is a human-readable reason;
    /// callers attach the field name.
    pub fn from_json(value: JsonValue) -> Result<Self, String> {
        match value {
            JsonValue::Null => Err("null is not a valid constraint".into()),
            JsonValue::Array(values) => Ok(Constraint::OneOf(values)),
            JsonValue::Object(map) => Self::from_object(map),
            scalar => Ok(Constraint::Equals(scalar)),
        }
    }

    fn from_object(mut map: JsonMap<String, JsonValue>) -> Result<Self, String> {
        if let Some(value) = map.remove("eq") {
            if !map.is_empty() {
                return Err("`eq` cannot be combined with other operators".into());
            }
            return Ok(Constraint::Equals(value));
        }
        if let Some(value) = map.remove("in") {
            if !map.is_empty() {
                return Err("`in` cannot be combined with other operators".into());
            }
            return match value {
                JsonValue::Array(values) => Ok(Constraint::OneOf(values)),
                other => Err(format!("`in` expects an array, got {other}")),
            };
        }

        let mut min = None;
        let mut max = None;
        for (key, value) in map {
            let slot = match key.as_str() {
                "min" | "gte" => &mut min,
                "max" | "lte" => &mut max,
                other => return Err(format!("unknown constraint operator `{other}`")),
            };
            if slot.is_some() {
                return Err(format!("bound `{key}` given more than once"));
            }
            if !value.is_null() {
                *slot = Some(value);
            }
        }
        Ok(Constraint::Range { min, max })
    }

    pub fn to_json(&self) -> JsonValue {
        match self {
            Constraint::Equals(value) => value.clone(),
            Constraint::OneOf(values) => JsonValue::Array(values.clone()),
            Constraint::Range { min, max } => {
                let mut map = JsonMap::new();
                if let Some(min) = min {
                    map.insert("min".into(), min.clone());
                }
                if let Some(max) = max {
                    map.insert("max".into(), max.clone());
                }
                JsonValue::Object(map)
            }
        }
    }
}

impl Serialize for Constraint {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Constraint {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = JsonValue::deserialize(deserializer)?;
        Constraint::from_json(value).map_err(D::Error::custom)
    }
}

/// A search request against one index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Query {
    pub index_id: IndexId,
    /// Free-text search term; `None` (or a term with no tokens) matches every
    /// document that passes the filters.
    #[serde(default)]
    pub term: Option<String>,
    /// Field name to constraint; all must hold.
    #[serde(default)]
    pub filters: BTreeMap<String, Constraint>,
    #[serde(default)]
    pub sort: SortSpec,
    /// 1-based page number.
    #[serde(default = "Query::default_page")]
    pub page: usize,
    /// Hits per page; falls back to the engine's configured default.
    #[serde(default)]
    pub page_size: Option<usize>,
}

impl Query {
    fn default_page() -> usize {
        1
    }

    pub fn new(index_id: impl Into<IndexId>) -> Self {
        Self {
            index_id: index_id.into(),
            term: None,
            filters: BTreeMap::new(),
            sort: SortSpec::default(),
            page: Self::default_page(),
            page_size: None,
        }
    }

    pub fn with_term(mut self, term: impl Into<String>) -> Self {
        self.term = Some(term.into());
        self
    }

    pub fn with_filter(mut self, field: impl Into<String>, constraint: Constraint) -> Self {
        self.filters.insert(field.into(), constraint);
        self
    }

    pub fn sorted_by(mut self, sort: SortSpec) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_page(mut self, page: usize, page_size: usize) -> Self {
        self.page = page;
        self.page_size = Some(page_size);
        self
    }
}

/// Short window of source text around the first matched token.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Excerpt {
    pub field: String,
    pub text: String,
}

/// One ranked result.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Hit {
    pub id: DocumentId,
    pub score: f32,
    pub excerpt: Option<Excerpt>,
    pub fields: BTreeMap<String, FieldValue>,
}

/// One page of an ordered result sequence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ResultSet {
    pub hits: Vec<Hit>,
    /// Number of matching documents before pagination.
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    /// Snapshot version the result was computed against.
    pub version: u64,
    #[serde(rename = "execution_time_ms", with = "crate::serde_millis")]
    pub execution_time: Duration,
}

impl ResultSet {
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|hit| hit.id.as_str()).collect()
    }

    /// Whether pages after this one hold further hits.
    pub fn has_more(&self) -> bool {
        self.page.saturating_mul(self.page_size) < self.total
    }
}

/// Prefix completion over the distinct values of one field.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SuggestRequest {
    pub index_id: IndexId,
    pub field: String,
    #[serde(default)]
    pub prefix: String,
    pub limit: usize,
}

impl SuggestRequest {
    pub fn new(
        index_id: impl Into<IndexId>,
        field: impl Into<String>,
        prefix: impl Into<String>,
        limit: usize,
    ) -> Self {
        Self {
            index_id: index_id.into(),
            field: field.into(),
            prefix: prefix.into(),
            limit,
        }
    }
}
