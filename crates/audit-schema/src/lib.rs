//! Audit Schema - field model and validation
//!
//! The leaf of the form engine:
//! - `FieldValue` leaves and `FieldPath` key paths for error addressing
//! - Closed field kinds with conditional requirement and visibility
//! - The pure field validator
//! - `FieldSet`, a value bag whose validation state updates live
//!
//! # Example
//!
//! ```rust
//! use audit_schema::{FieldSchema, FieldSet, FieldValue, RecordSchema};
//! use std::sync::Arc;
//!
//! let schema = RecordSchema::new(
//!     "contact",
//!     vec![
//!         FieldSchema::yes_no("hasPhone", "¿Tiene teléfono?", "no"),
//!         FieldSchema::text("phone", "Teléfono").conditional("hasPhone", "yes"),
//!     ],
//! )
//! .unwrap();
//!
//! let mut set = FieldSet::new(Arc::new(schema));
//! set.set("hasPhone", FieldValue::text("yes")).unwrap();
//! assert!(!set.is_valid());
//! ```

#![warn(unreachable_pub)]

pub mod field_set;
pub mod path;
pub mod schema;
pub mod validator;
pub mod value;

pub use field_set::FieldSet;
pub use path::{FieldPath, PathError, Segment};
pub use schema::{
    Condition, FieldKind, FieldMap, FieldSchema, RecordSchema, Requirement, SchemaError,
};
pub use validator::{validate, validate_record, FieldIssue, RecordReport, ValidationResult};
pub use value::{FieldValue, YesNo};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
