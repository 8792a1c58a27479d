use audit_records::{Attachment, AttachmentPolicy, AttachmentRejected, RecordError, RecordList};
use audit_schema::{FieldSchema, FieldValue, RecordSchema, YesNo};
use audit_test_utils::pdf_bytes;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::sync::Arc;

fn opportunity_schema() -> Arc<RecordSchema> {
    Arc::new(
        RecordSchema::new(
            "opportunity",
            vec![
                FieldSchema::choice(
                    "measureType",
                    "Tipo de medida",
                    ["Buenas prácticas operativas", "Medidas pasivas", "Otra"],
                ),
                FieldSchema::text("otherSpecification", "Si otra, especificar")
                    .conditional("measureType", "Otra"),
                FieldSchema::numeric("estimatedSavings.value", "Valor"),
                FieldSchema::yes_no(
                    "costAndFinancing.hasFinancingMechanism",
                    "¿Cuenta con mecanismo de financiamiento?",
                    "no",
                ),
                FieldSchema::text(
                    "costAndFinancing.financingMechanism",
                    "Especificar el mecanismo de financiamiento",
                )
                .conditional("costAndFinancing.hasFinancingMechanism", "yes"),
            ],
        )
        .unwrap(),
    )
}

fn list() -> RecordList {
    RecordList::new(opportunity_schema(), 1, AttachmentPolicy::pdf_only())
}

fn pdf(name: &str) -> Attachment {
    Attachment::new(name, "application/pdf", pdf_bytes())
}

#[test]
fn starts_with_one_default_record() {
    let list = list();
    assert_eq!(list.len(), 1);
    let record = list.get(0).unwrap();
    assert_eq!(
        record.value("costAndFinancing.hasFinancingMechanism"),
        Some(&FieldValue::Flag(YesNo::No))
    );
    assert!(record.report().is_valid());
}

#[test]
fn append_returns_new_index() {
    let mut list = list();
    assert_eq!(list.append(), 1);
    assert_eq!(list.append(), 2);
    assert_eq!(list.len(), 3);
}

#[test]
fn cannot_remove_below_minimum() {
    let mut list = list();
    assert_eq!(list.remove(0).unwrap_err(), RecordError::BelowMinimum { min: 1 });
    assert_eq!(
        list.remove(5).unwrap_err(),
        RecordError::IndexOutOfRange { index: 5, len: 1 }
    );
}

#[test]
fn zero_minimum_allows_empty_list() {
    let mut list = RecordList::new(opportunity_schema(), 0, AttachmentPolicy::pdf_only());
    assert_eq!(list.len(), 1);
    list.remove(0).unwrap();
    assert!(list.is_empty());
    list.reset();
    assert_eq!(list.len(), 1);
}

#[test]
fn validation_is_scoped_to_the_edited_record() {
    let mut list = list();
    list.append();

    let report = list
        .update_field(1, "estimatedSavings.value", FieldValue::text("mucho"))
        .unwrap()
        .clone();
    assert!(!report.is_valid());
    assert_eq!(
        report.invalid_keys().collect::<Vec<_>>(),
        vec!["estimatedSavings.value"]
    );
    assert!(list.get(0).unwrap().report().is_valid());
    assert_eq!(
        list.reports().iter().map(|r| r.is_valid()).collect::<Vec<_>>(),
        vec![true, false]
    );
}

#[test]
fn unknown_field_is_rejected() {
    let mut list = list();
    assert!(matches!(
        list.update_field(0, "file", FieldValue::empty()),
        Err(RecordError::Schema(_))
    ));
}

#[test]
fn financing_mechanism_required_only_when_yes() {
    let mut list = list();
    let report = list
        .update_field(
            0,
            "costAndFinancing.hasFinancingMechanism",
            FieldValue::Flag(YesNo::Yes),
        )
        .unwrap();
    assert_eq!(
        report.invalid_keys().collect::<Vec<_>>(),
        vec!["costAndFinancing.financingMechanism"]
    );

    let report = list
        .update_field(
            0,
            "costAndFinancing.financingMechanism",
            FieldValue::text("Recursos propios"),
        )
        .unwrap();
    assert!(report.is_valid());
}

#[test]
fn attachment_replaces_previous() {
    let mut list = list();
    assert_eq!(list.attach_file(0, pdf("a.pdf")).unwrap(), None);
    let replaced = list.attach_file(0, pdf("b.pdf")).unwrap().unwrap();
    assert_eq!(replaced.file_name, "a.pdf");
    assert_eq!(list.get(0).unwrap().attachment().unwrap().file_name, "b.pdf");

    let detached = list.detach_file(0).unwrap().unwrap();
    assert_eq!(detached.file_name, "b.pdf");
    assert!(list.get(0).unwrap().attachment().is_none());
}

#[test]
fn rejected_attachment_leaves_slot_unchanged() {
    let mut list = list();
    list.attach_file(0, pdf("informe.pdf")).unwrap();

    let err = list
        .attach_file(0, Attachment::new("foto.jpg", "image/jpeg", vec![0xFF, 0xD8]))
        .unwrap_err();
    assert!(matches!(
        err,
        RecordError::Attachment(AttachmentRejected::UnsupportedType { .. })
    ));
    assert_eq!(
        list.get(0).unwrap().attachment().unwrap().file_name,
        "informe.pdf"
    );
}

#[test]
fn switching_away_from_otra_drops_requirement() {
    let mut list = list();
    list.update_field(0, "measureType", FieldValue::tag("Otra")).unwrap();
    assert!(!list.get(0).unwrap().report().is_valid());

    list.update_field(0, "otherSpecification", FieldValue::text("Cambio de luminarias"))
        .unwrap();
    list.update_field(0, "otherSpecification", FieldValue::empty())
        .unwrap();
    let report = list
        .update_field(0, "measureType", FieldValue::tag("Buenas prácticas operativas"))
        .unwrap();
    assert!(report.is_valid());
}

proptest! {
    /// remove(i) then append() keeps survivors' values, contiguously indexed
    #[test]
    fn prop_remove_then_append_keeps_survivors(
        values in prop::collection::vec("[0-9]{1,4}", 2..8),
        victim in any::<prop::sample::Index>(),
    ) {
        let mut list = list();
        for _ in 1..values.len() {
            list.append();
        }
        for (i, v) in values.iter().enumerate() {
            list.update_field(i, "estimatedSavings.value", FieldValue::text(v.clone())).unwrap();
        }

        let victim = victim.index(values.len());
        list.remove(victim).unwrap();
        let appended = list.append();

        let mut expected: Vec<FieldValue> = values
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != victim)
            .map(|(_, v)| FieldValue::text(v.clone()))
            .collect();
        expected.push(FieldValue::empty());

        prop_assert_eq!(appended, values.len() - 1);
        let actual: Vec<FieldValue> = list
            .iter()
            .map(|r| r.value("estimatedSavings.value").cloned().unwrap())
            .collect();
        prop_assert_eq!(actual, expected);
    }

    /// A→B→A on a controlling field restores the dependent value untouched
    #[test]
    fn prop_toggle_is_non_destructive(
        text in "[A-Za-z]{1,16}",
        away in prop_oneof![Just("Medidas pasivas"), Just("Buenas prácticas operativas")],
    ) {
        let mut list = list();
        list.append();
        list.update_field(1, "measureType", FieldValue::tag("Otra")).unwrap();
        list.update_field(1, "otherSpecification", FieldValue::text(text.clone())).unwrap();

        list.update_field(1, "measureType", FieldValue::tag(away)).unwrap();
        prop_assert!(!list.get(1).unwrap().fields().visible_keys().contains(&"otherSpecification"));
        list.update_field(1, "measureType", FieldValue::tag("Otra")).unwrap();

        prop_assert_eq!(
            list.get(1).unwrap().value("otherSpecification"),
            Some(&FieldValue::text(text))
        );
    }
}
