//! Section A: building characterization
//!
//! One flat row. The first four fields are a location cascade over the
//! lookup table; every other field is edited directly.

use super::catalog::{SECTION_B_ROUTE, TENURE_OPTIONS};
use super::SectionModel;
use crate::bridge::SectionId;
use crate::config::AuditConfig;
use crate::error::FormError;
use crate::snapshot::{FormSnapshot, NextStep};
use audit_cascade::{
    fetch_with_timeout, ApplyOutcome, CascadeChain, FetchError, FetchTicket, LevelSpec,
    OptionsProvider,
};
use audit_schema::{
    FieldIssue, FieldPath, FieldSchema, FieldSet, FieldValue, RecordSchema, SchemaError,
};
use std::sync::Arc;
use std::time::Duration;

/// Cascade levels: field key and lookup column, root first
pub const LOCATION_LEVELS: [(&str, &str); 4] = [
    ("department", "departamento"),
    ("city", "ciudad"),
    ("subsector", "subsector"),
    ("entityName", "nombreEntidad"),
];

/// Section A field schema
///
/// # Errors
/// - `SchemaError` if the declaration is inconsistent
pub fn building_schema() -> Result<RecordSchema, SchemaError> {
    RecordSchema::new(
        "building",
        vec![
            FieldSchema::text("department", "Departamento").required(),
            FieldSchema::text("city", "Ciudad")
                .required()
                .with_message("Ciudad es requerida"),
            FieldSchema::text("subsector", "Subsector").required(),
            FieldSchema::text("entityName", "Nombre de la entidad").required(),
            FieldSchema::text("address", "Dirección")
                .required()
                .with_message("Dirección es requerida"),
            FieldSchema::text("startTime", "Hora de inicio de la ocupación/operación")
                .required()
                .with_message("Hora de inicio es requerida"),
            FieldSchema::text("endTime", "Hora de fin de la ocupación/operación")
                .required()
                .with_message("Hora de fin es requerida"),
            FieldSchema::text("occupationDays", "Días de ocupación/operación")
                .required()
                .with_message("Días de ocupación son requeridos"),
            FieldSchema::numeric("workers", "Trabajadores")
                .required()
                .with_message("Número de trabajadores es requerido"),
            FieldSchema::numeric("patients", "Pacientes"),
            FieldSchema::numeric("visitors", "Visitantes"),
            FieldSchema::numeric("students", "Estudiantes"),
            FieldSchema::text("activities", "Descripción de las actividades"),
            FieldSchema::numeric("constructionYear", "Año de construcción"),
            FieldSchema::numeric("totalArea", "Área total (m²)"),
            FieldSchema::numeric("usableArea", "Área útil ocupada (m²)"),
            FieldSchema::choice("buildingTenure", "Tipo de tenencia", TENURE_OPTIONS)
                .required()
                .with_default(FieldValue::tag("Propia")),
            FieldSchema::yes_no(
                "isResponsible",
                "¿La entidad es responsable de la edificación?",
                "no",
            )
            .required(),
            FieldSchema::text("responsibleEntity", "Entidad responsable")
                .visible_when("isResponsible", "no"),
        ],
    )
}

/// Section A state: cascade plus directly edited fields
pub struct BuildingSection {
    fields: FieldSet,
    chain: CascadeChain,
    provider: Arc<dyn OptionsProvider>,
    fetch_timeout: Duration,
    table: String,
}

impl std::fmt::Debug for BuildingSection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BuildingSection")
            .field("fields", &self.fields)
            .field("chain", &self.chain)
            .field("table", &self.table)
            .finish_non_exhaustive()
    }
}

impl BuildingSection {
    /// Section over `provider`; call [`BuildingSection::initialize`] before use
    ///
    /// # Errors
    /// - `FormError::Schema` / `FormError::Chain` for a broken declaration
    pub fn new(provider: Arc<dyn OptionsProvider>, config: &AuditConfig) -> Result<Self, FormError> {
        let chain = CascadeChain::new(
            LOCATION_LEVELS
                .iter()
                .map(|(key, column)| LevelSpec::new(*key, *column))
                .collect(),
        )?;
        Ok(Self {
            fields: FieldSet::new(Arc::new(building_schema()?)),
            chain,
            provider,
            fetch_timeout: config.fetch_timeout(),
            table: config.tables.building.clone(),
        })
    }

    /// Load the root options
    ///
    /// # Errors
    /// - `FormError::Chain` if already initialized
    /// - `FormError::Fetch` if the options could not be loaded; retry with
    ///   [`BuildingSection::retry`]
    pub async fn initialize(&mut self) -> Result<(), FormError> {
        let outcome = self
            .chain
            .initialize(self.provider.as_ref(), self.fetch_timeout)
            .await?;
        outcome_result(outcome)
    }

    /// Commit a cascade selection and load the next level's options
    ///
    /// `None` or an empty string clears the level and every level below it.
    ///
    /// # Errors
    /// - `FormError::Chain` for an unknown key or a value not on offer
    /// - `FormError::Fetch` if the next options could not be loaded
    pub async fn select(&mut self, key: &str, value: Option<&str>) -> Result<(), FormError> {
        let Some(ticket) = self.commit_selection(key, value)? else {
            return Ok(());
        };
        let result =
            fetch_with_timeout(self.provider.as_ref(), ticket.request(), self.fetch_timeout).await;
        self.complete_fetch(ticket, result).map(|_| ())
    }

    /// Synchronous half of [`BuildingSection::select`]
    ///
    /// The returned ticket must be completed with
    /// [`BuildingSection::complete_fetch`]; superseded tickets are dropped
    /// there.
    ///
    /// # Errors
    /// - `FormError::Chain` for an unknown key or a value not on offer
    pub fn commit_selection(
        &mut self,
        key: &str,
        value: Option<&str>,
    ) -> Result<Option<FetchTicket>, FormError> {
        let level = self.chain.index_of(key)?;
        let ticket = self.chain.commit(level, value.map(str::to_string))?;
        self.sync_chain_fields()?;
        Ok(ticket)
    }

    /// Apply a fetch result obtained for `ticket`
    ///
    /// # Errors
    /// - `FormError::Fetch` if `result` is a failure for the latest ticket
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<String>, FetchError>,
    ) -> Result<ApplyOutcome, FormError> {
        match self.chain.apply(ticket, result) {
            ApplyOutcome::Failed { error, .. } => Err(error.into()),
            outcome => Ok(outcome),
        }
    }

    /// Reload the options of one cascade level
    ///
    /// # Errors
    /// - `FormError::Chain` if the level cannot be fetched yet
    /// - `FormError::Fetch` if the options could not be loaded
    pub async fn retry(&mut self, key: &str) -> Result<(), FormError> {
        let level = self.chain.index_of(key)?;
        let outcome = self
            .chain
            .refetch(self.provider.as_ref(), level, self.fetch_timeout)
            .await?;
        outcome_result(outcome)
    }

    /// Set a non-cascade field
    ///
    /// # Errors
    /// - `FormError::CascadeField` for a cascade key
    /// - `FormError::Schema` for an unknown key
    pub fn set_field(&mut self, key: &str, value: FieldValue) -> Result<(), FormError> {
        if self.chain.index_of(key).is_ok() {
            return Err(FormError::CascadeField(key.to_string()));
        }
        self.fields.set(key, value)?;
        Ok(())
    }

    /// Current value of a field
    #[must_use]
    pub fn value(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    /// Options currently offered for a cascade level
    ///
    /// # Errors
    /// - `FormError::Chain` for an unknown key
    pub fn options(&self, key: &str) -> Result<&[String], FormError> {
        let level = self.chain.index_of(key)?;
        Ok(self
            .chain
            .level(level)
            .map_or(&[][..], |l| l.options()))
    }

    /// Current validation state of one field
    ///
    /// # Errors
    /// - `FormError::FieldInvalid` with the reason
    /// - `FormError::Schema` for an unknown key
    pub fn check_field(&self, key: &str) -> Result<(), FormError> {
        let result = self
            .fields
            .report()
            .result(key)
            .ok_or_else(|| SchemaError::UnknownField(key.to_string()))?;
        match result.reason() {
            None => Ok(()),
            Some(reason) => Err(FormError::FieldInvalid(FieldIssue {
                path: FieldPath::root(key),
                label: self
                    .fields
                    .schema()
                    .field(key)
                    .map_or_else(|| key.to_string(), |f| f.label.clone()),
                reason: reason.to_string(),
            })),
        }
    }

    /// Live-validated values
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    /// Cascade state
    #[inline]
    #[must_use]
    pub fn chain(&self) -> &CascadeChain {
        &self.chain
    }

    fn sync_chain_fields(&mut self) -> Result<(), SchemaError> {
        let committed: Vec<(String, FieldValue)> = self
            .chain
            .levels()
            .iter()
            .map(|l| {
                let value = FieldValue::text(l.committed().unwrap_or_default());
                (l.key().to_string(), value)
            })
            .collect();
        for (key, value) in committed {
            if self.fields.get(&key) != Some(&value) {
                self.fields.set(&key, value)?;
            }
        }
        Ok(())
    }
}

fn outcome_result(outcome: ApplyOutcome) -> Result<(), FormError> {
    match outcome {
        ApplyOutcome::Failed { error, .. } => Err(error.into()),
        ApplyOutcome::Applied { .. } | ApplyOutcome::Stale { .. } => Ok(()),
    }
}

impl SectionModel for BuildingSection {
    fn id(&self) -> SectionId {
        SectionId::BuildingCharacterization
    }

    fn snapshot(&self) -> FormSnapshot {
        FormSnapshot::flat(
            self.id(),
            self.table.as_str(),
            Arc::clone(self.fields.schema()),
            self.fields.values().clone(),
            NextStep::Navigate {
                route: SECTION_B_ROUTE.to_string(),
            },
        )
    }

    fn reveal_errors(&mut self) {
        self.fields.reveal_all();
    }

    fn reset(&mut self) {
        self.fields.reset();
        self.chain.reset();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use audit_schema::YesNo;
    use pretty_assertions::assert_eq;

    #[test]
    fn schema_defaults() {
        let schema = building_schema().unwrap();
        let defaults = schema.defaults();
        assert_eq!(defaults.get("buildingTenure"), Some(&FieldValue::tag("Propia")));
        assert_eq!(
            defaults.get("isResponsible"),
            Some(&FieldValue::Flag(YesNo::No))
        );
    }

    #[test]
    fn required_messages() {
        let schema = building_schema().unwrap();
        let report = audit_schema::validate_record(&schema, &schema.defaults());
        assert_eq!(
            report.result("department").and_then(|r| r.reason()),
            Some("Departamento es requerido")
        );
        assert_eq!(
            report.result("city").and_then(|r| r.reason()),
            Some("Ciudad es requerida")
        );
        assert!(report.result("patients").unwrap().is_valid());
        assert!(report.result("responsibleEntity").unwrap().is_valid());
    }

    #[test]
    fn responsible_entity_hidden_when_responsible() {
        let schema = building_schema().unwrap();
        let mut values = schema.defaults();
        assert!(schema.field("responsibleEntity").unwrap().is_visible(&values));
        values.insert("isResponsible".into(), FieldValue::Flag(YesNo::Yes));
        assert!(!schema.field("responsibleEntity").unwrap().is_visible(&values));
    }
}
