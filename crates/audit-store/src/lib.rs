//! Audit Store - remote collaborators of the form engine
//!
//! Interfaces only at the shape the forms consume:
//! - `RecordStore`: filtered column projection and bulk row insertion
//! - `FileStore`: opaque binary upload returning a reference string
//!
//! `MemoryRecordStore` and `MemoryFileStore` back tests and local runs.

#![warn(unreachable_pub)]

pub mod error;
pub mod memory;
pub mod query;

pub use error::StoreError;
pub use memory::{MemoryFileStore, MemoryRecordStore, StoredObject};
pub use query::{Filter, Query, Row};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Queryable table store
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Rows matching every filter, projected onto the query's columns,
    /// in store order
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError>;

    /// Insert all rows as one logical operation; returns the number written
    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<usize, StoreError>;
}

/// Binary content handed to a `FileStore`
#[derive(Clone, PartialEq, Eq)]
pub struct FileUpload {
    /// Original file name
    pub file_name: String,
    /// Declared media type
    pub content_type: String,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl fmt::Debug for FileUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileUpload")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Opaque reference returned by a `FileStore`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileRef(pub String);

impl fmt::Display for FileRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Attachment storage
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store the content and return a reference to embed in a row
    async fn upload(&self, upload: FileUpload) -> Result<FileRef, StoreError>;
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
