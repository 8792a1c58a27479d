//! One entry of a record list

use crate::attachment::Attachment;
use audit_schema::{FieldSet, FieldValue, RecordReport, RecordSchema, SchemaError};
use std::sync::Arc;

/// Field values plus an optional attachment
#[derive(Debug, Clone)]
pub struct Record {
    fields: FieldSet,
    attachment: Option<Attachment>,
}

impl Record {
    /// Record holding the schema defaults
    #[must_use]
    pub fn new(schema: Arc<RecordSchema>) -> Self {
        Self {
            fields: FieldSet::new(schema),
            attachment: None,
        }
    }

    /// Live-validated values
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Value of one field
    #[inline]
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Current attachment
    #[inline]
    #[must_use]
    pub fn attachment(&self) -> Option<&Attachment> {
        self.attachment.as_ref()
    }

    /// Validation state of this record only
    #[inline]
    #[must_use]
    pub fn report(&self) -> &RecordReport {
        self.fields.report()
    }

    pub(crate) fn set(&mut self, key: &str, value: FieldValue) -> Result<(), SchemaError> {
        self.fields.set(key, value).map(|_| ())
    }

    pub(crate) fn replace_attachment(&mut self, attachment: Option<Attachment>) -> Option<Attachment> {
        std::mem::replace(&mut self.attachment, attachment)
    }

    pub(crate) fn reveal_errors(&mut self) {
        self.fields.reveal_all();
    }
}
