//! Live-validated value bag for one record or flat section
//!
//! Setting a value re-validates that field and every field whose
//! requirement or visibility depends on it, so error state never lags the
//! controlling sibling. Hidden fields keep their values.

use crate::schema::{FieldMap, RecordSchema, SchemaError};
use crate::validator::{validate, validate_record, RecordReport, ValidationResult};
use crate::value::FieldValue;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Values plus their current validation state
#[derive(Debug, Clone)]
pub struct FieldSet {
    schema: Arc<RecordSchema>,
    values: FieldMap,
    report: RecordReport,
    touched: BTreeSet<String>,
}

impl FieldSet {
    /// Fresh set holding the schema defaults
    #[must_use]
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        let values = schema.defaults();
        let report = validate_record(&schema, &values);
        Self {
            schema,
            values,
            report,
            touched: BTreeSet::new(),
        }
    }

    /// Schema backing this set
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Set one value and re-validate the field and its dependents
    ///
    /// Returns the keys whose validation state was recomputed.
    ///
    /// # Errors
    /// - `SchemaError::UnknownField` if `key` is not declared
    pub fn set(&mut self, key: &str, value: FieldValue) -> Result<Vec<String>, SchemaError> {
        if self.schema.field(key).is_none() {
            return Err(SchemaError::UnknownField(key.to_string()));
        }

        self.values.insert(key.to_string(), value);
        self.touched.insert(key.to_string());

        let mut recomputed = vec![key.to_string()];
        recomputed.extend(self.schema.dependents(key).map(|f| f.key.clone()));
        for k in &recomputed {
            self.revalidate(k);
        }

        tracing::trace!(field = key, recomputed = recomputed.len(), "field updated");
        Ok(recomputed)
    }

    fn revalidate(&mut self, key: &str) {
        let Some(field) = self.schema.field(key) else {
            return;
        };
        let value = self.values.get(key).cloned().unwrap_or_default();
        let result = validate(field, &value, &self.values);
        self.report.set(key, result);
    }

    /// Current value of one field
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.values.get(key)
    }

    /// All values, including hidden ones
    #[inline]
    #[must_use]
    pub fn values(&self) -> &FieldMap {
        &self.values
    }

    /// Values with hidden fields blanked, as written to the store
    #[must_use]
    pub fn visible_values(&self) -> FieldMap {
        self.schema
            .fields()
            .iter()
            .map(|f| {
                let value = if f.is_visible(&self.values) {
                    self.values.get(&f.key).cloned().unwrap_or_default()
                } else {
                    FieldValue::empty()
                };
                (f.key.clone(), value)
            })
            .collect()
    }

    /// Keys currently shown, in schema order
    #[must_use]
    pub fn visible_keys(&self) -> Vec<&str> {
        self.schema
            .fields()
            .iter()
            .filter(|f| f.is_visible(&self.values))
            .map(|f| f.key.as_str())
            .collect()
    }

    /// Validation state of every field
    #[inline]
    #[must_use]
    pub fn report(&self) -> &RecordReport {
        &self.report
    }

    /// Whether every field is currently valid
    #[inline]
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.report.is_valid()
    }

    /// Inline message for a field, shown once the user has touched it
    #[must_use]
    pub fn message(&self, key: &str) -> Option<&str> {
        if !self.touched.contains(key) {
            return None;
        }
        self.report.result(key).and_then(ValidationResult::reason)
    }

    /// Mark every field as touched so all inline messages show
    pub fn reveal_all(&mut self) {
        self.touched
            .extend(self.schema.fields().iter().map(|f| f.key.clone()));
    }

    /// Back to schema defaults, nothing touched
    pub fn reset(&mut self) {
        self.values = self.schema.defaults();
        self.report = validate_record(&self.schema, &self.values);
        self.touched.clear();
    }
}
