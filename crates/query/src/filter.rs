//! Filter compilation: loosely-typed constraints become typed predicates
//! checked against each document.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use index::{Document, FieldMappings, FieldType, FieldValue, IndexError};
use serde_json::Value as JsonValue;

use crate::error::QueryError;
use crate::types::Constraint;

/// A constraint value coerced to the field's type. Strings are stored in
/// normalized form.
#[derive(Debug, Clone, PartialEq)]
enum Operand {
    Str(String),
    Value(FieldValue),
}

impl Operand {
    fn coerce(field: &str, field_type: FieldType, raw: &JsonValue) -> Result<Self, QueryError> {
        let value = FieldValue::from_json(field, field_type, raw).map_err(|err| match err {
            IndexError::InvalidValue { field, reason } => QueryError::InvalidQuery { field, reason },
            other => QueryError::invalid(field, other.to_string()),
        })?;
        Ok(match value.as_str() {
            Some(s) => Operand::Str(canonical::normalize(s)),
            None => Operand::Value(value),
        })
    }

    fn equals(&self, value: &FieldValue) -> bool {
        match (self, value) {
            (Operand::Str(needle), FieldValue::Text(s) | FieldValue::Keyword(s)) => {
                canonical::normalize(s) == *needle
            }
            (Operand::Value(FieldValue::Number(a)), FieldValue::Number(b)) => a == b,
            (Operand::Value(FieldValue::Date(a)), FieldValue::Date(b)) => a == b,
            _ => false,
        }
    }

    /// Position of `value` relative to this bound.
    fn position_of(&self, value: &FieldValue) -> Option<Ordering> {
        match self {
            Operand::Value(bound) => value.compare(bound),
            Operand::Str(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Predicate {
    Equals(Operand),
    Range {
        min: Option<Operand>,
        max: Option<Operand>,
    },
    OneOf(Vec<Operand>),
}

/// One filter ready to run against documents of a single snapshot.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct CompiledFilter {
    field: String,
    predicate: Predicate,
}

impl CompiledFilter {
    /// A document lacking the field never matches.
    pub(crate) fn matches(&self, document: &Document) -> bool {
        let Some(value) = document.get(&self.field) else {
            return false;
        };
        match &self.predicate {
            Predicate::Equals(operand) => operand.equals(value),
            Predicate::OneOf(operands) => operands.iter().any(|op| op.equals(value)),
            Predicate::Range { min, max } => {
                let above_min = min.as_ref().is_none_or(|bound| {
                    matches!(
                        bound.position_of(value),
                        Some(Ordering::Greater | Ordering::Equal)
                    )
                });
                let below_max = max.as_ref().is_none_or(|bound| {
                    matches!(bound.position_of(value), Some(Ordering::Less | Ordering::Equal))
                });
                above_min && below_max
            }
        }
    }
}

fn compile_one(
    field: &str,
    field_type: FieldType,
    constraint: &Constraint,
) -> Result<Predicate, QueryError> {
    match constraint {
        Constraint::Equals(raw) => Ok(Predicate::Equals(Operand::coerce(field, field_type, raw)?)),
        Constraint::OneOf(raws) => {
            if raws.is_empty() {
                return Err(QueryError::invalid(field, "`in` needs at least one value"));
            }
            let operands = raws
                .iter()
                .map(|raw| Operand::coerce(field, field_type, raw))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(Predicate::OneOf(operands))
        }
        Constraint::Range { min, max } => {
            if !field_type.supports_range() {
                return Err(QueryError::invalid(
                    field,
                    format!("range constraints need a number or date field, not {field_type}"),
                ));
            }
            if min.is_none() && max.is_none() {
                return Err(QueryError::invalid(field, "range needs a min or a max bound"));
            }
            let min = min
                .as_ref()
                .map(|raw| Operand::coerce(field, field_type, raw))
                .transpose()?;
            let max = max
                .as_ref()
                .map(|raw| Operand::coerce(field, field_type, raw))
                .transpose()?;
            if let (Some(Operand::Value(lo)), Some(Operand::Value(hi))) = (&min, &max) {
                if lo.compare(hi) == Some(Ordering::Greater) {
                    return Err(QueryError::invalid(field, "range min is greater than max"));
                }
            }
            Ok(Predicate::Range { min, max })
        }
    }
}

/// Validate every filter against the index mappings and coerce its values.
pub(crate) fn compile_filters(
    filters: &BTreeMap<String, Constraint>,
    mappings: &FieldMappings,
) -> Result<Vec<CompiledFilter>, QueryError> {
    filters
        .iter()
        .map(|(field, constraint)| -> Result<CompiledFilter, QueryError> {
            let field_type = mappings.get(field).ok_or_else(|| {
                QueryError::invalid(field.as_str(), "field is not declared in the index mappings")
            })?;
            Ok(CompiledFilter {
                field: field.clone(),
                predicate: compile_one(field, field_type, constraint)?,
            })
        })
        .collect()
}
