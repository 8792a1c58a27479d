//! Immutable copy of a section's state taken at submission time

use crate::bridge::SectionId;
use crate::error::{RowStatus, ValidationFailure};
use audit_records::Attachment;
use audit_schema::{validate_record, FieldMap, FieldPath, FieldValue, RecordSchema};
use audit_store::{FileRef, Row};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Duration;

/// What the user sees after a successful submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NextStep {
    /// Move on to another section
    Navigate {
        /// Target route
        route: String,
    },
    /// Show the closing acknowledgment
    ThankYou {
        /// How long it stays visible
        display_for: Duration,
    },
}

/// One row to validate and persist
#[derive(Debug, Clone)]
pub struct RowDraft {
    /// Every value, hidden ones included
    pub values: FieldMap,
    /// Attachment to upload before insertion
    pub attachment: Option<Attachment>,
}

/// Section state frozen for one submission attempt
#[derive(Debug, Clone)]
pub struct FormSnapshot {
    /// Section being submitted
    pub section: SectionId,
    /// Destination table
    pub table: String,
    /// Path prefix of list rows; `None` for flat sections
    pub list_key: Option<String>,
    /// Column receiving attachment references, for sections that carry them
    pub attachment_column: Option<String>,
    /// Column receiving the whole record object, for list sections
    pub record_column: Option<String>,
    /// Row schema
    pub schema: Arc<RecordSchema>,
    /// Rows in submission order
    pub rows: Vec<RowDraft>,
    /// Where the user goes on success
    pub next: NextStep,
}

impl FormSnapshot {
    /// Snapshot of a single-row section
    #[must_use]
    pub fn flat(
        section: SectionId,
        table: impl Into<String>,
        schema: Arc<RecordSchema>,
        values: FieldMap,
        next: NextStep,
    ) -> Self {
        Self {
            section,
            table: table.into(),
            list_key: None,
            attachment_column: None,
            record_column: None,
            schema,
            rows: vec![RowDraft {
                values,
                attachment: None,
            }],
            next,
        }
    }

    /// Snapshot of a repeatable-record section
    #[must_use]
    pub fn list(
        section: SectionId,
        table: impl Into<String>,
        list_key: impl Into<String>,
        schema: Arc<RecordSchema>,
        rows: Vec<RowDraft>,
        next: NextStep,
    ) -> Self {
        Self {
            section,
            table: table.into(),
            list_key: Some(list_key.into()),
            attachment_column: None,
            record_column: None,
            schema,
            rows,
            next,
        }
    }

    /// Store attachment references in `column`
    #[must_use]
    pub fn with_attachment_column(mut self, column: impl Into<String>) -> Self {
        self.attachment_column = Some(column.into());
        self
    }

    /// Also store each record, nested, in `column`
    #[must_use]
    pub fn with_record_column(mut self, column: impl Into<String>) -> Self {
        self.record_column = Some(column.into());
        self
    }

    /// Path prefix of one row
    #[must_use]
    pub fn row_path(&self, index: usize) -> FieldPath {
        match &self.list_key {
            Some(key) => FieldPath::root(key).index(index),
            None => FieldPath::default(),
        }
    }

    /// Validate every field of every row
    ///
    /// # Errors
    /// `ValidationFailure` listing each failing field by full key path
    pub fn validate(&self) -> Result<(), ValidationFailure> {
        let mut issues = Vec::new();
        let mut rows = Vec::with_capacity(self.rows.len());

        for (index, row) in self.rows.iter().enumerate() {
            let report = validate_record(&self.schema, &row.values);
            if report.is_valid() {
                rows.push(RowStatus::Valid);
            } else {
                rows.push(RowStatus::Invalid {
                    fields: report.invalid_keys().map(str::to_string).collect(),
                });
                issues.extend(report.issues(&self.schema, &self.row_path(index)));
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationFailure { issues, rows })
        }
    }

    /// Values as handed to the report aggregate, before column mapping
    #[must_use]
    pub fn values_json(&self) -> Value {
        let nested: Vec<Value> = self
            .rows
            .iter()
            .map(|row| Value::Object(record_json(row)))
            .collect();

        match &self.list_key {
            Some(key) => {
                let mut map = Map::new();
                map.insert(key.clone(), Value::Array(nested));
                Value::Object(map)
            }
            None => nested.into_iter().next().unwrap_or(Value::Null),
        }
    }

    /// Store row for one draft
    ///
    /// Every schema field is written as held, hidden ones included; unset
    /// fields are written empty.
    #[must_use]
    pub fn store_row(&self, row: &RowDraft, file: Option<&FileRef>) -> Row {
        let mut out = nest(self.schema.fields().iter().map(|field| {
            let value = row
                .values
                .get(&field.key)
                .map_or_else(|| FieldValue::empty().to_json(), FieldValue::to_json);
            (field.key.as_str(), value)
        }));
        if let Some(column) = &self.attachment_column {
            let reference = file.map(|f| f.0.clone()).unwrap_or_default();
            out.insert(column.clone(), Value::String(reference));
        }
        if let Some(column) = &self.record_column {
            out.insert(column.clone(), Value::Object(record_json(row)));
        }
        out
    }
}

/// Pre-mapping values of one row, nested
fn record_json(row: &RowDraft) -> Map<String, Value> {
    nest(row.values.iter().map(|(k, v)| (k.as_str(), v.to_json())))
}

/// Expand dotted keys into nested objects
fn nest<'a>(entries: impl IntoIterator<Item = (&'a str, Value)>) -> Map<String, Value> {
    let mut root = Map::new();
    for (key, value) in entries {
        let parts: Vec<&str> = key.split('.').collect();
        insert_path(&mut root, &parts, value);
    }
    root
}

fn insert_path(map: &mut Map<String, Value>, parts: &[&str], value: Value) {
    match parts {
        [] => {}
        [leaf] => {
            map.insert((*leaf).to_string(), value);
        }
        [head, rest @ ..] => {
            let slot = map
                .entry((*head).to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(child) = slot {
                insert_path(child, rest, value);
            }
        }
    }
}
