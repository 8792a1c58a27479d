//! Field validator
//!
//! Pure rule evaluation: the result depends only on the schema, the value
//! and the current sibling values. Messages are keyed to display labels.

use crate::path::FieldPath;
use crate::schema::{FieldKind, FieldMap, FieldSchema, RecordSchema};
use crate::value::{FieldValue, YesNo};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Outcome of validating one field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "lowercase")]
pub enum ValidationResult {
    /// Value accepted
    Valid,
    /// Value rejected, with a user-facing reason
    Invalid(String),
}

impl ValidationResult {
    /// Whether the value was accepted
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Rejection reason, if any
    #[inline]
    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Valid => None,
            Self::Invalid(r) => Some(r),
        }
    }
}

/// Validate one value against its field schema
///
/// Hidden fields are always valid; their values are kept but not checked.
#[must_use]
pub fn validate(schema: &FieldSchema, value: &FieldValue, siblings: &FieldMap) -> ValidationResult {
    if !schema.is_visible(siblings) {
        return ValidationResult::Valid;
    }

    if value.is_empty() {
        return if schema.is_required(siblings) {
            ValidationResult::Invalid(schema.missing_message())
        } else {
            ValidationResult::Valid
        };
    }

    match &schema.kind {
        FieldKind::Text => ValidationResult::Valid,
        FieldKind::Numeric { min, max } => validate_numeric(schema, value, *min, *max),
        FieldKind::Choice(tags) => {
            let text = value.as_text();
            if tags.iter().any(|t| t.as_str() == &*text) {
                ValidationResult::Valid
            } else {
                ValidationResult::Invalid(format!("{}: opción no válida", schema.label))
            }
        }
        FieldKind::YesNo => {
            if matches!(value, FieldValue::Flag(_)) || YesNo::parse(&value.as_text()).is_some() {
                ValidationResult::Valid
            } else {
                ValidationResult::Invalid(format!("{}: seleccione sí o no", schema.label))
            }
        }
    }
}

fn validate_numeric(
    schema: &FieldSchema,
    value: &FieldValue,
    min: Option<f64>,
    max: Option<f64>,
) -> ValidationResult {
    #[allow(clippy::cast_precision_loss)]
    let number = match value {
        FieldValue::Integer(n) => Some(*n as f64),
        other => other
            .as_text()
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite()),
    };

    let Some(number) = number else {
        return ValidationResult::Invalid(format!("{} debe ser un número", schema.label));
    };

    let below = min.is_some_and(|lo| number < lo);
    let above = max.is_some_and(|hi| number > hi);
    if below || above {
        let lo = min.map_or_else(|| "-∞".to_string(), |v| v.to_string());
        let hi = max.map_or_else(|| "∞".to_string(), |v| v.to_string());
        return ValidationResult::Invalid(format!(
            "{} debe estar entre {lo} y {hi}",
            schema.label
        ));
    }

    ValidationResult::Valid
}

/// One failing field, addressed by key path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldIssue {
    /// Full key path of the field
    pub path: FieldPath,
    /// Display label
    pub label: String,
    /// User-facing reason
    pub reason: String,
}

impl fmt::Display for FieldIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.reason)
    }
}

/// Per-field validation state of one record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RecordReport {
    results: IndexMap<String, ValidationResult>,
}

impl RecordReport {
    /// Whether every field is valid
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.results.values().all(ValidationResult::is_valid)
    }

    /// Result for one key
    #[must_use]
    pub fn result(&self, key: &str) -> Option<&ValidationResult> {
        self.results.get(key)
    }

    /// Keys currently invalid, in schema order
    pub fn invalid_keys(&self) -> impl Iterator<Item = &str> {
        self.results
            .iter()
            .filter(|(_, r)| !r.is_valid())
            .map(|(k, _)| k.as_str())
    }

    /// Issues with paths rooted at `prefix`
    #[must_use]
    pub fn issues(&self, schema: &RecordSchema, prefix: &FieldPath) -> Vec<FieldIssue> {
        self.results
            .iter()
            .filter_map(|(key, result)| {
                let reason = result.reason()?;
                let label = schema.field(key).map_or_else(|| key.clone(), |f| f.label.clone());
                Some(FieldIssue {
                    path: prefix.clone().key(key),
                    label,
                    reason: reason.to_string(),
                })
            })
            .collect()
    }

    pub(crate) fn set(&mut self, key: &str, result: ValidationResult) {
        if let Some(slot) = self.results.get_mut(key) {
            *slot = result;
        } else {
            self.results.insert(key.to_string(), result);
        }
    }
}

/// Validate every field of one record against its siblings
#[must_use]
pub fn validate_record(schema: &RecordSchema, values: &FieldMap) -> RecordReport {
    let results = schema
        .fields()
        .iter()
        .map(|field| {
            let value = values.get(&field.key).cloned().unwrap_or_default();
            (field.key.clone(), validate(field, &value, values))
        })
        .collect();
    RecordReport { results }
}
