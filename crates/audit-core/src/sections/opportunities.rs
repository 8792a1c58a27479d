//! Section E: implemented energy saving opportunities

use super::catalog::{MEASURE_TYPES, OTHER_MEASURE, UNIT_OPTIONS};
use super::SectionModel;
use crate::bridge::SectionId;
use crate::config::AuditConfig;
use crate::error::FormError;
use crate::snapshot::{FormSnapshot, NextStep, RowDraft};
use audit_records::{Attachment, RecordList};
use audit_schema::{FieldPath, FieldSchema, FieldValue, RecordReport, RecordSchema, SchemaError};
use std::sync::Arc;
use std::time::Duration;

/// Key of the record list in the report and in field paths
pub const LIST_KEY: &str = "opportunities";

/// Section E record schema
///
/// Every field may be left blank; filled values must still parse, stay in
/// range and match their option set. The two conditional fields are required
/// while shown.
///
/// # Errors
/// - `SchemaError` if the declaration is inconsistent
pub fn opportunity_schema() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "opportunity",
        vec![
            FieldSchema::choice("measureType", "Tipo de medida", MEASURE_TYPES),
            FieldSchema::text("otherSpecification", "Si otra, especificar")
                .conditional("measureType", OTHER_MEASURE),
            FieldSchema::text("measureDescription", "Descripción de la medida identificada"),
            FieldSchema::numeric("estimatedSavings.value", "Valor"),
            FieldSchema::choice("estimatedSavings.unit", "Indicar unidad", UNIT_OPTIONS),
            FieldSchema::numeric("estimatedSavings.percentage", "Porcentaje (%) de ahorro")
                .with_range(0.0, 100.0),
            FieldSchema::numeric(
                "costAndFinancing.implementationCost",
                "Costo estimado de la implementación de la medida (COP$)",
            ),
            FieldSchema::yes_no(
                "costAndFinancing.hasFinancingMechanism",
                "¿Cuenta con mecanismo de financiamiento?",
                "no",
            )
            .required(),
            FieldSchema::text(
                "costAndFinancing.financingMechanism",
                "Especificar el mecanismo de financiamiento",
            )
            .conditional("costAndFinancing.hasFinancingMechanism", "yes"),
        ],
    )
}

/// Section E state: the opportunity list
#[derive(Debug, Clone)]
pub struct OpportunitiesSection {
    list: RecordList,
    table: String,
    attachment_column: String,
    record_column: String,
    thank_you: Duration,
}

impl OpportunitiesSection {
    /// Section with one empty opportunity (or `min_records`)
    ///
    /// # Errors
    /// - `FormError::Schema` for a broken declaration
    pub fn new(config: &AuditConfig) -> Result<Self, FormError> {
        Ok(Self {
            list: RecordList::new(
                Arc::new(opportunity_schema()?),
                config.min_records,
                config.attachments.clone(),
            ),
            table: config.tables.opportunities.clone(),
            attachment_column: config.tables.attachment_column.clone(),
            record_column: config.tables.record_column.clone(),
            thank_you: config.thank_you_duration(),
        })
    }

    /// Underlying record list
    #[inline]
    #[must_use]
    pub fn list(&self) -> &RecordList {
        &self.list
    }

    /// Add an empty opportunity; returns its index
    pub fn append(&mut self) -> usize {
        self.list.append()
    }

    /// Remove an opportunity
    ///
    /// # Errors
    /// - `FormError::Records` out of range or at the minimum
    pub fn remove(&mut self, index: usize) -> Result<(), FormError> {
        self.list.remove(index)?;
        Ok(())
    }

    /// Set one field of one opportunity
    ///
    /// # Errors
    /// - `FormError::Records` for a bad index or unknown key
    pub fn update_field(
        &mut self,
        index: usize,
        key: &str,
        value: FieldValue,
    ) -> Result<&RecordReport, FormError> {
        Ok(self.list.update_field(index, key, value)?)
    }

    /// Attach the supporting document of one opportunity
    ///
    /// # Errors
    /// - `FormError::Records` for a bad index or a refused file
    pub fn attach_file(
        &mut self,
        index: usize,
        attachment: Attachment,
    ) -> Result<Option<Attachment>, FormError> {
        Ok(self.list.attach_file(index, attachment)?)
    }

    /// Drop the supporting document of one opportunity
    ///
    /// # Errors
    /// - `FormError::Records` for a bad index
    pub fn detach_file(&mut self, index: usize) -> Result<Option<Attachment>, FormError> {
        Ok(self.list.detach_file(index)?)
    }

    /// Full path of one field of one opportunity
    #[must_use]
    pub fn path(index: usize, key: &str) -> FieldPath {
        FieldPath::root(LIST_KEY).index(index).key(key)
    }
}

impl SectionModel for OpportunitiesSection {
    fn id(&self) -> SectionId {
        SectionId::SavingOpportunities
    }

    fn snapshot(&self) -> FormSnapshot {
        let rows = self
            .list
            .iter()
            .map(|record| RowDraft {
                values: record.fields().values().clone(),
                attachment: record.attachment().cloned(),
            })
            .collect();

        FormSnapshot::list(
            self.id(),
            self.table.as_str(),
            LIST_KEY,
            Arc::clone(self.list.schema()),
            rows,
            NextStep::ThankYou {
                display_for: self.thank_you,
            },
        )
        .with_attachment_column(self.attachment_column.as_str())
        .with_record_column(self.record_column.as_str())
    }

    fn reveal_errors(&mut self) {
        self.list.reveal_errors();
    }

    fn reset(&mut self) {
        self.list.reset();
    }
}
