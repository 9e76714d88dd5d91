use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::schema::{FieldMappings, FieldType};
use crate::IndexError;

/// Identifier of a document, unique within its index.
pub type DocumentId = String;

/// A typed field value.
///
/// The variant must agree with the [`FieldType`] declared for the field in the
/// owning index; [`Document::validate`] enforces this at ingestion.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Keyword(String),
    Date(DateTime<Utc>),
}

impl FieldValue {
    pub fn field_type(&self) -> FieldType {
        match self {
            FieldValue::Text(_) => FieldType::Text,
            FieldValue::Number(_) => FieldType::Number,
            FieldValue::Keyword(_) => FieldType::Keyword,
            FieldValue::Date(_) => FieldType::Date,
        }
    }

    /// String payload of `Text` and `Keyword` values.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) | FieldValue::Keyword(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<DateTime<Utc>> {
        match self {
            FieldValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    /// Total order between two values of the same type; `None` across types.
    ///
    /// Strings compare by their normalized form first and raw bytes second, so
    /// the order is case-insensitive yet still total.
    pub fn compare(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::Number(a), FieldValue::Number(b)) => Some(a.total_cmp(b)),
            (FieldValue::Date(a), FieldValue::Date(b)) => Some(a.cmp(b)),
            (FieldValue::Text(a), FieldValue::Text(b))
            | (FieldValue::Keyword(a), FieldValue::Keyword(b)) => Some(
                canonical::normalize(a)
                    .cmp(&canonical::normalize(b))
                    .then_with(|| a.cmp(b)),
            ),
            _ => None,
        }
    }

    /// Plain JSON rendering: strings, numbers and RFC 3339 timestamps.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Text(s) | FieldValue::Keyword(s) => JsonValue::String(s.clone()),
            FieldValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            FieldValue::Date(d) => JsonValue::String(d.to_rfc3339()),
        }
    }

    /// Coerce a loosely-typed JSON value into the declared field type.
    ///
    /// Dates accept RFC 3339 strings or integer epoch milliseconds.
    pub fn from_json(
        field: &str,
        field_type: FieldType,
        value: &JsonValue,
    ) -> Result<Self, IndexError> {
        let invalid = |reason: String| IndexError::InvalidValue {
            field: field.to_string(),
            reason,
        };
        match field_type {
            FieldType::Text => value
                .as_str()
                .map(|s| FieldValue::Text(s.to_string()))
                .ok_or_else(|| invalid(format!("expected a string, got {value}"))),
            FieldType::Keyword => value
                .as_str()
                .map(|s| FieldValue::Keyword(s.to_string()))
                .ok_or_else(|| invalid(format!("expected a string, got {value}"))),
            FieldType::Number => match value.as_f64() {
                Some(n) if n.is_finite() => Ok(FieldValue::Number(n)),
                _ => Err(invalid(format!("expected a finite number, got {value}"))),
            },
            FieldType::Date => {
                if let Some(s) = value.as_str() {
                    DateTime::parse_from_rfc3339(s)
                        .map(|d| FieldValue::Date(d.with_timezone(&Utc)))
                        .map_err(|e| invalid(format!("invalid RFC 3339 date {s:?}: {e}")))
                } else if let Some(ms) = value.as_i64() {
                    Utc.timestamp_millis_opt(ms)
                        .single()
                        .map(FieldValue::Date)
                        .ok_or_else(|| invalid(format!("epoch millis {ms} out of range")))
                } else {
                    Err(invalid(format!(
                        "expected an RFC 3339 string or epoch millis, got {value}"
                    )))
                }
            }
        }
    }
}

/// One record within an index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Document {
    pub id: DocumentId,
    pub fields: BTreeMap<String, FieldValue>,
    pub inserted_at: DateTime<Utc>,
}

impl Document {
    pub fn new(id: impl Into<DocumentId>) -> Self {
        Self {
            id: id.into(),
            fields: BTreeMap::new(),
            inserted_at: Utc::now(),
        }
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Build a document from a JSON object, coercing each member with the
    /// index mappings. `null` members are treated as absent.
    pub fn from_json(
        id: impl Into<DocumentId>,
        mappings: &FieldMappings,
        object: &serde_json::Map<String, JsonValue>,
    ) -> Result<Self, IndexError> {
        let mut doc = Document::new(id);
        for (name, value) in object {
            if value.is_null() {
                continue;
            }
            let field_type = mappings
                .get(name)
                .ok_or_else(|| IndexError::UnmappedField(name.clone()))?;
            doc.fields
                .insert(name.clone(), FieldValue::from_json(name, field_type, value)?);
        }
        Ok(doc)
    }

    /// Check the document against the owning index's mappings.
    pub fn validate(&self, mappings: &FieldMappings) -> Result<(), IndexError> {
        if self.id.trim().is_empty() {
            return Err(IndexError::InvalidValue {
                field: "id".into(),
                reason: "document id must not be empty".into(),
            });
        }
        for (name, value) in &self.fields {
            let expected = mappings
                .get(name)
                .ok_or_else(|| IndexError::UnmappedField(name.clone()))?;
            let found = value.field_type();
            if expected != found {
                return Err(IndexError::FieldTypeMismatch {
                    field: name.clone(),
                    expected,
                    found,
                });
            }
            if let FieldValue::Number(n) = value {
                if !n.is_finite() {
                    return Err(IndexError::InvalidValue {
                        field: name.clone(),
                        reason: format!("number {n} is not finite"),
                    });
                }
            }
        }
        Ok(())
    }
}
