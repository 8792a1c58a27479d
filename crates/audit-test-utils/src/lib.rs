//! Testing utilities for the audit workspace
//!
//! Shared fixtures, failure-injecting stores and tracing setup.

#![allow(missing_docs)]

use async_trait::async_trait;
use audit_store::{
    FileRef, FileStore, FileUpload, MemoryFileStore, MemoryRecordStore, Query, RecordStore, Row,
    StoreError,
};
use serde_json::json;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tracing_subscriber::EnvFilter;

pub const LOCATIONS_TABLE: &str = "direcciones";

/// Install a test subscriber honouring `RUST_LOG`; repeated calls are fine
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn location(department: &str, city: &str, subsector: &str, entity: &str) -> Row {
    json!({
        "departamento": department,
        "ciudad": city,
        "subsector": subsector,
        "nombreEntidad": entity,
    })
    .as_object()
    .cloned()
    .unwrap_or_default()
}

/// Location rows, unsorted and with duplicate departments and cities
pub fn location_rows() -> Vec<Row> {
    vec![
        location("Antioquia", "Medellín", "Salud", "Hospital General de Medellín"),
        location("Cundinamarca", "Soacha", "Educación", "Colegio Soacha Central"),
        location("Antioquia", "Envigado", "Educación", "Institución Educativa Envigado"),
        location("Antioquia", "Medellín", "Educación", "Universidad de Antioquia"),
        location("Cundinamarca", "Bogotá", "Salud", "Hospital San Ignacio"),
        location("Antioquia", "Medellín", "Salud", "Clínica Las Américas"),
        location("Boyacá", "Tunja", "Administración", "Gobernación de Boyacá"),
        location("Antioquia", "Bello", "Salud", "Hospital Marco Fidel Suárez"),
    ]
}

/// Memory store seeded with `location_rows` under `direcciones`
pub fn seeded_location_store() -> MemoryRecordStore {
    let store = MemoryRecordStore::new();
    store.seed(LOCATIONS_TABLE, location_rows());
    store
}

/// Minimal PDF-looking content
pub fn pdf_bytes() -> Vec<u8> {
    b"%PDF-1.7\n1 0 obj << >> endobj\n%%EOF".to_vec()
}

/// Record store whose reads and writes can be switched to fail
#[derive(Debug, Default)]
pub struct FlakyRecordStore {
    pub inner: MemoryRecordStore,
    fail_select: AtomicBool,
    fail_insert: AtomicBool,
    select_calls: AtomicUsize,
    insert_calls: AtomicUsize,
}

impl FlakyRecordStore {
    pub fn new(inner: MemoryRecordStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    pub fn fail_selects(&self, fail: bool) {
        self.fail_select.store(fail, Ordering::SeqCst);
    }

    pub fn fail_inserts(&self, fail: bool) {
        self.fail_insert.store(fail, Ordering::SeqCst);
    }

    pub fn select_calls(&self) -> usize {
        self.select_calls.load(Ordering::SeqCst)
    }

    pub fn insert_calls(&self) -> usize {
        self.insert_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for FlakyRecordStore {
    async fn select(&self, query: &Query) -> Result<Vec<Row>, StoreError> {
        self.select_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_select.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected select failure".into()));
        }
        self.inner.select(query).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> Result<usize, StoreError> {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected insert failure".into()));
        }
        self.inner.insert(table, rows).await
    }
}

/// File store whose uploads can be switched to fail
#[derive(Debug, Default)]
pub struct FlakyFileStore {
    pub inner: MemoryFileStore,
    fail: AtomicBool,
    uploads: AtomicUsize,
}

impl FlakyFileStore {
    pub fn fail_uploads(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn upload_calls(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl FileStore for FlakyFileStore {
    async fn upload(&self, upload: FileUpload) -> Result<FileRef, StoreError> {
        self.uploads.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected upload failure".into()));
        }
        self.inner.upload(upload).await
    }
}
