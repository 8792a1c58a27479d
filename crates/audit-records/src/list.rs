//! Ordered list of independently validated records

use crate::attachment::{Attachment, AttachmentPolicy};
use crate::error::RecordError;
use crate::record::Record;
use audit_schema::{FieldValue, RecordReport, RecordSchema};
use std::sync::Arc;

/// Repeatable record list
///
/// Insertion order is display and submission order. Indices are
/// positional; after `remove` the caller recomputes any key paths that
/// referenced shifted records.
#[derive(Debug, Clone)]
pub struct RecordList {
    schema: Arc<RecordSchema>,
    records: Vec<Record>,
    min_len: usize,
    policy: AttachmentPolicy,
}

impl RecordList {
    /// List starting with one default record (or `min_len`, if larger)
    #[must_use]
    pub fn new(schema: Arc<RecordSchema>, min_len: usize, policy: AttachmentPolicy) -> Self {
        let mut list = Self {
            schema,
            records: Vec::new(),
            min_len,
            policy,
        };
        list.reset();
        list
    }

    /// Record schema
    #[inline]
    #[must_use]
    pub fn schema(&self) -> &Arc<RecordSchema> {
        &self.schema
    }

    /// Minimum length enforced by `remove`
    #[inline]
    #[must_use]
    pub fn min_len(&self) -> usize {
        self.min_len
    }

    /// Attachment policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> &AttachmentPolicy {
        &self.policy
    }

    /// Number of records
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether the list holds no records
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// One record
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Records in order
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Per-record validation state, in order
    #[must_use]
    pub fn reports(&self) -> Vec<&RecordReport> {
        self.records.iter().map(Record::report).collect()
    }

    /// Add a default record at the end; returns its index
    pub fn append(&mut self) -> usize {
        self.records.push(Record::new(Arc::clone(&self.schema)));
        let index = self.records.len() - 1;
        tracing::debug!(schema = self.schema.name(), index, "record appended");
        index
    }

    /// Remove the record at `index`, shifting later records down
    ///
    /// # Errors
    /// - `RecordError::IndexOutOfRange`
    /// - `RecordError::BelowMinimum` if the list is already at its minimum
    pub fn remove(&mut self, index: usize) -> Result<Record, RecordError> {
        self.check_index(index)?;
        if self.records.len() <= self.min_len {
            return Err(RecordError::BelowMinimum { min: self.min_len });
        }
        tracing::debug!(schema = self.schema.name(), index, "record removed");
        Ok(self.records.remove(index))
    }

    /// Set one field of one record; only that record is re-validated
    ///
    /// # Errors
    /// - `RecordError::IndexOutOfRange`
    /// - `RecordError::Schema` for an undeclared key
    pub fn update_field(
        &mut self,
        index: usize,
        key: &str,
        value: FieldValue,
    ) -> Result<&RecordReport, RecordError> {
        self.check_index(index)?;
        let record = &mut self.records[index];
        record.set(key, value)?;
        Ok(record.report())
    }

    /// Attach a file, replacing any previous attachment of that record
    ///
    /// Returns the replaced attachment. A rejected file leaves the slot
    /// unchanged.
    ///
    /// # Errors
    /// - `RecordError::IndexOutOfRange`
    /// - `RecordError::Attachment` if the policy refuses the file
    pub fn attach_file(
        &mut self,
        index: usize,
        attachment: Attachment,
    ) -> Result<Option<Attachment>, RecordError> {
        self.check_index(index)?;
        if let Err(rejected) = self.policy.check(&attachment) {
            tracing::warn!(index, file = %attachment.file_name, %rejected, "attachment rejected");
            return Err(rejected.into());
        }
        Ok(self.records[index].replace_attachment(Some(attachment)))
    }

    /// Remove a record's attachment
    ///
    /// # Errors
    /// - `RecordError::IndexOutOfRange`
    pub fn detach_file(&mut self, index: usize) -> Result<Option<Attachment>, RecordError> {
        self.check_index(index)?;
        Ok(self.records[index].replace_attachment(None))
    }

    /// Show every inline message in every record
    pub fn reveal_errors(&mut self) {
        for record in &mut self.records {
            record.reveal_errors();
        }
    }

    /// Back to `max(min_len, 1)` default records
    pub fn reset(&mut self) {
        self.records.clear();
        for _ in 0..self.min_len.max(1) {
            self.records.push(Record::new(Arc::clone(&self.schema)));
        }
    }

    fn check_index(&self, index: usize) -> Result<(), RecordError> {
        if index < self.records.len() {
            Ok(())
        } else {
            Err(RecordError::IndexOutOfRange {
                index,
                len: self.records.len(),
            })
        }
    }
}

impl<'a> IntoIterator for &'a RecordList {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
