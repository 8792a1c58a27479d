//! Audit Core - energy audit report sections
//!
//! Ties the form engine together:
//! - `AuditConfig` loaded from TOML
//! - `SubmissionCoordinator`: validate, upload attachments, bulk insert,
//!   hand off to the report aggregate
//! - `SectionForm`: the per-section phase machine around a `SectionModel`
//! - The building characterization (A) and saving opportunities (E) sections
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_core::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(store: Arc<dyn RecordStore>, files: Arc<dyn FileStore>) -> Result<(), FormError> {
//! let config = AuditConfig::new();
//! let report = Arc::new(AuditReport::new());
//! let coordinator = SubmissionCoordinator::new(store, files, report.clone(), config.clone());
//!
//! let mut form = SectionForm::new(OpportunitiesSection::new(&config)?);
//! form.model_mut()?.update_field(0, "measureType", FieldValue::tag("Medidas pasivas"))?;
//! let confirmation = form.submit(&coordinator).await?;
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

pub mod bridge;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod phase;
pub mod sections;
pub mod snapshot;

pub use bridge::{AuditReport, SectionBridge, SectionId};
pub use config::{AuditConfig, ConfigError, TableNames};
pub use coordinator::{Confirmation, SubmissionCoordinator};
pub use error::{FormError, RowStatus, SubmissionError, ValidationFailure};
pub use phase::{allowed_transitions, validate_transition, PhaseError, SectionPhase};
pub use sections::{BuildingSection, OpportunitiesSection, SectionForm, SectionModel};
pub use snapshot::{FormSnapshot, NextStep, RowDraft};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for building and submitting report sections
    pub use crate::{
        AuditConfig, AuditReport, BuildingSection, Confirmation, FormError, NextStep,
        OpportunitiesSection, SectionForm, SectionId, SectionModel, SectionPhase,
        SubmissionCoordinator, SubmissionError,
    };
    pub use audit_records::Attachment;
    pub use audit_schema::{FieldValue, YesNo};
    pub use audit_store::{FileStore, RecordStore};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
