//! In-memory stores

use crate::error::StoreError;
use crate::query::{Query, Row};
use crate::{FileRef, FileStore, FileUpload, RecordStore};
use async_trait::async_trait;
use dashmap::DashMap;
use uuid::Uuid;

/// Table store kept in process memory
///
/// Tables are created on first insert or seed; selecting from a table that
/// was never created is `StoreError::UnknownTable`.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: DashMap<String, Vec<Row>>,
}

impl MemoryRecordStore {
    /// Empty store
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append rows without going through `insert`
    pub fn seed(&self, table: &str, rows: impl IntoIterator<Item = Row>) {
        self.tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Snapshot of one table's rows
    #[must_use]
    pub fn rows(&self, table: &str) -> Vec<Row> {
        self.tables
            .get(table)
            .map(|t| t.value().clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        let table = self
            .tables
            .get(&query.table)
            .ok_or_else(|| StoreError::UnknownTable(query.table.clone()))?;

        Ok(table
            .iter()
            .filter(|row| query.matches(row))
            .map(|row| query.project(row))
            .collect())
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<usize, StoreError> {
        let count = rows.len();
        self.tables.entry(table.to_string()).or_default().extend(rows);
        tracing::debug!(table, count, "rows inserted");
        Ok(count)
    }
}

/// An uploaded object
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    /// Declared media type
    pub content_type: String,
    /// Raw content
    pub bytes: Vec<u8>,
}

/// File store kept in process memory
#[derive(Debug)]
pub struct MemoryFileStore {
    bucket: String,
    objects: DashMap<FileRef, StoredObject>,
}

impl MemoryFileStore {
    /// Store whose references are prefixed with `bucket`
    pub fn new(bucket: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            objects: DashMap::new(),
        }
    }

    /// Look up an uploaded object
    #[must_use]
    pub fn get(&self, reference: &FileRef) -> Option<StoredObject> {
        self.objects.get(reference).map(|o| o.value().clone())
    }

    /// Number of stored objects
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether nothing has been uploaded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl Default for MemoryFileStore {
    fn default() -> Self {
        Self::new("attachments")
    }
}

#[async_trait]
impl FileStore for MemoryFileStore {
    async fn upload(&self, upload: FileUpload) -> Result<FileRef, StoreError> {
        let reference = FileRef(format!(
            "{}/{}-{}",
            self.bucket,
            Uuid::new_v4(),
            upload.file_name
        ));
        self.objects.insert(
            reference.clone(),
            StoredObject {
                content_type: upload.content_type,
                bytes: upload.bytes,
            },
        );
        Ok(reference)
    }
}
