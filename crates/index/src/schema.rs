use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::IndexError;

/// Stable identifier of an index. Assigned once and never changed.
pub type IndexId = String;

/// Declared type of a mapped field.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    /// Free text; tokenized and searchable by the query term.
    Text,
    /// Finite `f64`.
    Number,
    /// Exact string value (tags, categories, identifiers).
    Keyword,
    /// Point in time, UTC.
    Date,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "text",
            FieldType::Number => "number",
            FieldType::Keyword => "keyword",
            FieldType::Date => "date",
        }
    }

    /// Whether range constraints make sense for this type.
    pub fn supports_range(&self) -> bool {
        matches!(self, FieldType::Number | FieldType::Date)
    }

    /// Whether values of this type are strings that can be prefix-suggested.
    pub fn is_textual(&self) -> bool {
        matches!(self, FieldType::Text | FieldType::Keyword)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Field name → declared type for one index.
///
/// Backed by a `BTreeMap` so iteration order (and therefore excerpt field
/// selection) is deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct FieldMappings(BTreeMap<String, FieldType>);

impl FieldMappings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_field(mut self, name: impl Into<String>, field_type: FieldType) -> Self {
        self.0.insert(name.into(), field_type);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, field_type: FieldType) {
        self.0.insert(name.into(), field_type);
    }

    pub fn get(&self, name: &str) -> Option<FieldType> {
        self.0.get(name).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, FieldType)> {
        self.0.iter().map(|(name, ty)| (name.as_str(), *ty))
    }

    /// Names of all `Text` fields, in name order.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        self.iter()
            .filter(|(_, ty)| *ty == FieldType::Text)
            .map(|(name, _)| name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, FieldType)> for FieldMappings {
    fn from_iter<I: IntoIterator<Item = (K, FieldType)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Descriptive record of an index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexMeta {
    pub id: IndexId,
    /// Human-facing name, unique within an [`IndexStore`](crate::IndexStore).
    pub name: String,
    pub mappings: FieldMappings,
    pub created_at: DateTime<Utc>,
}

impl IndexMeta {
    pub fn new(id: impl Into<IndexId>, name: impl Into<String>, mappings: FieldMappings) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            mappings,
            created_at: Utc::now(),
        }
    }

    pub fn validate(&self) -> Result<(), IndexError> {
        if self.id.trim().is_empty() {
            return Err(IndexError::InvalidMeta("index id must not be empty".into()));
        }
        if self.name.trim().is_empty() {
            return Err(IndexError::InvalidMeta(
                "index name must not be empty".into(),
            ));
        }
        if let Some((name, _)) = self.mappings.iter().find(|(name, _)| name.trim().is_empty()) {
            return Err(IndexError::InvalidMeta(format!(
                "field name {name:?} must not be blank"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mappings_keep_name_order_and_list_text_fields() {
        let mappings = FieldMappings::new()
            .with_field("title", FieldType::Text)
            .with_field("price", FieldType::Number)
            .with_field("body", FieldType::Text);
        let text: Vec<&str> = mappings.text_fields().collect();
        assert_eq!(text, vec!["body", "title"]);
        assert_eq!(mappings.get("price"), Some(FieldType::Number));
        assert_eq!(mappings.get("missing"), None);
    }

    #[test]
    fn field_type_serializes_lowercase() {
        let json = serde_json::to_string(&FieldType::Keyword).unwrap();
        assert_eq!(json, "\"keyword\"");
        let mappings: FieldMappings =
            serde_json::from_str(r#"{"title":"text","published":"date"}"#).unwrap();
        assert_eq!(mappings.get("published"), Some(FieldType::Date));
    }

    #[test]
    fn blank_name_rejected() {
        let meta = IndexMeta::new("idx-1", "  ", FieldMappings::new());
        assert!(matches!(meta.validate(), Err(IndexError::InvalidMeta(_))));
    }
}
