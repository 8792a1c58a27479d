//! Section A: location cascade wiring and submission

use audit_cascade::{ApplyOutcome, ChainError, OptionsProvider, StoreOptionsProvider};
use audit_core::prelude::*;
use audit_store::MemoryFileStore;
use audit_test_utils::{seeded_location_store, FlakyRecordStore, LOCATIONS_TABLE};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::sync::Arc;

struct Fixture {
    lookups: Arc<FlakyRecordStore>,
    provider: Arc<StoreOptionsProvider>,
    config: AuditConfig,
}

impl Fixture {
    fn new() -> Self {
        let lookups = Arc::new(FlakyRecordStore::new(seeded_location_store()));
        let provider = Arc::new(StoreOptionsProvider::new(lookups.clone(), LOCATIONS_TABLE));
        Self {
            lookups,
            provider,
            config: AuditConfig::new(),
        }
    }

    async fn section(&self) -> BuildingSection {
        let mut section = BuildingSection::new(self.provider.clone(), &self.config).unwrap();
        section.initialize().await.unwrap();
        section
    }
}

fn opts(section: &BuildingSection, key: &str) -> Vec<String> {
    section.options(key).unwrap().to_vec()
}

async fn pick_location(section: &mut BuildingSection) {
    section.select("department", Some("Antioquia")).await.unwrap();
    section.select("city", Some("Medellín")).await.unwrap();
    section.select("subsector", Some("Salud")).await.unwrap();
    section
        .select("entityName", Some("Hospital General de Medellín"))
        .await
        .unwrap();
}

fn fill_building(section: &mut BuildingSection) {
    for (key, value) in [
        ("address", "Calle 64 # 51D-154"),
        ("startTime", "06:00"),
        ("endTime", "22:00"),
        ("occupationDays", "Lunes a domingo"),
        ("workers", "420"),
        ("patients", "900"),
        ("totalArea", "18500.5"),
    ] {
        section.set_field(key, FieldValue::text(value)).unwrap();
    }
}

#[tokio::test]
async fn cascade_narrows_each_level() {
    let fixture = Fixture::new();
    let mut section = fixture.section().await;

    assert_eq!(opts(&section, "department"), vec!["Antioquia", "Boyacá", "Cundinamarca"]);
    assert!(opts(&section, "city").is_empty());

    section.select("department", Some("Antioquia")).await.unwrap();
    assert_eq!(opts(&section, "city"), vec!["Bello", "Envigado", "Medellín"]);

    section.select("city", Some("Medellín")).await.unwrap();
    assert_eq!(opts(&section, "subsector"), vec!["Educación", "Salud"]);

    section.select("subsector", Some("Salud")).await.unwrap();
    assert_eq!(
        opts(&section, "entityName"),
        vec!["Clínica Las Américas", "Hospital General de Medellín"]
    );
    assert_eq!(section.value("subsector"), Some(&FieldValue::text("Salud")));
}

#[tokio::test]
async fn changing_department_clears_downstream_fields() {
    let fixture = Fixture::new();
    let mut section = fixture.section().await;
    pick_location(&mut section).await;

    section.select("department", Some("Cundinamarca")).await.unwrap();

    assert_eq!(opts(&section, "city"), vec!["Bogotá", "Soacha"]);
    assert!(opts(&section, "subsector").is_empty());
    assert!(opts(&section, "entityName").is_empty());
    for key in ["city", "subsector", "entityName"] {
        assert_eq!(section.value(key), Some(&FieldValue::empty()), "{key}");
    }
    assert_eq!(section.fields().message("city"), Some("Ciudad es requerida"));
}

#[tokio::test]
async fn cascade_keys_are_not_directly_editable() {
    let fixture = Fixture::new();
    let mut section = fixture.section().await;

    let err = section
        .set_field("city", FieldValue::text("Medellín"))
        .unwrap_err();
    assert!(matches!(err, FormError::CascadeField(ref k) if k == "city"));

    let err = section.select("department", Some("Amazonas")).await.unwrap_err();
    assert!(matches!(err, FormError::Chain(ChainError::NotAnOption { level: 0, .. })));
    assert!(err.is_user_fixable());
}

#[tokio::test]
async fn fetch_failure_keeps_selection_and_retries() {
    let fixture = Fixture::new();
    let mut section = fixture.section().await;

    fixture.lookups.fail_selects(true);
    let err = section.select("department", Some("Boyacá")).await.unwrap_err();
    assert!(matches!(err, FormError::Fetch(_)));
    assert!(err.is_retryable());
    assert_eq!(section.value("department"), Some(&FieldValue::text("Boyacá")));
    assert!(opts(&section, "city").is_empty());

    fixture.lookups.fail_selects(false);
    section.retry("city").await.unwrap();
    assert_eq!(opts(&section, "city"), vec!["Tunja"]);
}

#[tokio::test]
async fn late_response_for_replaced_department_is_dropped() {
    let fixture = Fixture::new();
    let mut section = fixture.section().await;

    let first = section
        .commit_selection("department", Some("Antioquia"))
        .unwrap()
        .unwrap();
    let second = section
        .commit_selection("department", Some("Cundinamarca"))
        .unwrap()
        .unwrap();

    let fresh = fixture.provider.fetch_options(second.request()).await;
    let late = fixture.provider.fetch_options(first.request()).await;

    assert!(matches!(
        section.complete_fetch(second, fresh).unwrap(),
        ApplyOutcome::Applied { level: 1, count: 2 }
    ));
    assert!(matches!(
        section.complete_fetch(first, late).unwrap(),
        ApplyOutcome::Stale { level: 1, .. }
    ));
    assert_eq!(opts(&section, "city"), vec!["Bogotá", "Soacha"]);
}

#[tokio::test]
async fn field_checks_report_reasons() {
    let fixture = Fixture::new();
    let mut section = fixture.section().await;

    section
        .set_field("workers", FieldValue::text("muchos"))
        .unwrap();
    match section.check_field("workers") {
        Err(FormError::FieldInvalid(issue)) => {
            assert_eq!(issue.path.to_string(), "workers");
            assert_eq!(issue.reason, "Trabajadores debe ser un número");
        }
        other => panic!("expected FieldInvalid, got {other:?}"),
    }
    assert!(section.check_field("patients").is_ok());
}

#[tokio::test]
async fn submit_writes_one_row_and_navigates() {
    let fixture = Fixture::new();
    let rows = Arc::new(FlakyRecordStore::new(audit_store::MemoryRecordStore::new()));
    let report = Arc::new(AuditReport::new());
    let coordinator = SubmissionCoordinator::new(
        rows.clone(),
        Arc::new(MemoryFileStore::default()),
        report.clone(),
        fixture.config.clone(),
    );

    let mut form = SectionForm::new(fixture.section().await);
    {
        let section = form.model_mut().unwrap();
        pick_location(section).await;
        fill_building(section);
        section
            .set_field("responsibleEntity", FieldValue::text("ESE Metrosalud"))
            .unwrap();
        section
            .set_field("isResponsible", FieldValue::Flag(YesNo::Yes))
            .unwrap();
    }

    let confirmation = form.submit(&coordinator).await.unwrap();
    assert_eq!(
        confirmation.next,
        NextStep::Navigate {
            route: "/section-b".into()
        }
    );
    assert_eq!(confirmation.rows_written, 1);

    let stored = rows.inner.rows("firstSection");
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["entityName"], json!("Hospital General de Medellín"));
    assert_eq!(stored[0]["buildingTenure"], json!("Propia"));
    assert_eq!(stored[0]["isResponsible"], json!("yes"));
    assert_eq!(stored[0]["responsibleEntity"], json!("ESE Metrosalud"));

    let merged = report.section(SectionId::BuildingCharacterization).unwrap();
    assert_eq!(merged["department"], json!("Antioquia"));
    assert_eq!(merged["responsibleEntity"], json!("ESE Metrosalud"));

    assert_eq!(form.phase(), SectionPhase::Succeeded);
    let section = form.model();
    assert_eq!(section.value("department"), Some(&FieldValue::empty()));
    assert_eq!(opts(section, "department").len(), 3);
}

#[tokio::test]
async fn incomplete_section_lists_every_missing_field() {
    let fixture = Fixture::new();
    let rows = Arc::new(FlakyRecordStore::new(audit_store::MemoryRecordStore::new()));
    let coordinator = SubmissionCoordinator::new(
        rows.clone(),
        Arc::new(MemoryFileStore::default()),
        Arc::new(AuditReport::new()),
        fixture.config.clone(),
    );

    let mut form = SectionForm::new(fixture.section().await);
    form.model_mut()
        .unwrap()
        .select("department", Some("Boyacá"))
        .await
        .unwrap();

    let err = form.submit(&coordinator).await.unwrap_err();
    let paths: Vec<String> = err
        .validation()
        .unwrap()
        .issues
        .iter()
        .map(|i| i.path.to_string())
        .collect();
    assert_eq!(
        paths,
        vec![
            "city",
            "subsector",
            "entityName",
            "address",
            "startTime",
            "endTime",
            "occupationDays",
            "workers",
        ]
    );
    assert_eq!(rows.insert_calls(), 0);
    assert_eq!(
        form.model().fields().message("address"),
        Some("Dirección es requerida")
    );
}
