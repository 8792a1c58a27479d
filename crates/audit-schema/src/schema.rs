//! Field and record schemas
//!
//! Field sets are fixed at authoring time. Each field is a closed
//! `FieldKind` plus an explicit requirement and an optional visibility
//! condition, both of which may only reference sibling keys of the same
//! record.

use crate::value::{FieldValue, YesNo};
use indexmap::IndexMap;
use std::collections::HashSet;

/// Field values of one record or flat section, keyed by (dotted) field key
pub type FieldMap = IndexMap<String, FieldValue>;

/// Primitive kind of a field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// String that must parse as a number, optionally range-checked
    Numeric {
        /// Inclusive lower bound
        min: Option<f64>,
        /// Inclusive upper bound
        max: Option<f64>,
    },
    /// Closed set of legal tags
    Choice(Vec<String>),
    /// Yes/no radio group
    YesNo,
}

/// "Sibling `sibling` currently holds `equals`"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Condition {
    /// Controlling sibling key
    pub sibling: String,
    /// Value that makes the condition hold
    pub equals: String,
}

impl Condition {
    /// Create a condition
    #[inline]
    pub fn new(sibling: impl Into<String>, equals: impl Into<String>) -> Self {
        Self {
            sibling: sibling.into(),
            equals: equals.into(),
        }
    }

    /// Evaluate against the current sibling values
    #[must_use]
    pub fn holds(&self, values: &FieldMap) -> bool {
        values
            .get(&self.sibling)
            .is_some_and(|v| v.as_text() == self.equals.as_str())
    }
}

/// Whether a field must be filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Requirement {
    /// Empty is always valid
    Optional,
    /// Empty is never valid
    Required,
    /// Required only while the condition holds
    RequiredWhen(Condition),
}

/// Declaration of one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSchema {
    /// Programmatic key (may be dotted for nested objects)
    pub key: String,
    /// Display label used in user-facing messages
    pub label: String,
    /// Primitive kind
    pub kind: FieldKind,
    /// Requirement rule
    pub requirement: Requirement,
    /// Field is only shown while this holds
    pub visible_when: Option<Condition>,
    /// Value given to fresh records and after a reset
    pub default: FieldValue,
    /// Overrides the generated "required" message
    pub required_message: Option<String>,
}

impl FieldSchema {
    fn base(key: &str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            kind,
            requirement: Requirement::Optional,
            visible_when: None,
            default: FieldValue::empty(),
            required_message: None,
        }
    }

    /// Optional free-text field
    #[must_use]
    pub fn text(key: &str, label: &str) -> Self {
        Self::base(key, label, FieldKind::Text)
    }

    /// Optional numeric-string field
    #[must_use]
    pub fn numeric(key: &str, label: &str) -> Self {
        Self::base(key, label, FieldKind::Numeric { min: None, max: None })
    }

    /// Optional enum field over `tags`
    #[must_use]
    pub fn choice<I, S>(key: &str, label: &str, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::base(
            key,
            label,
            FieldKind::Choice(tags.into_iter().map(Into::into).collect()),
        )
    }

    /// Yes/no field with a default answer (`"yes"` or `"no"`)
    #[must_use]
    pub fn yes_no(key: &str, label: &str, default: &str) -> Self {
        let mut schema = Self::base(key, label, FieldKind::YesNo);
        schema.default = YesNo::parse(default).map_or_else(FieldValue::empty, FieldValue::Flag);
        schema
    }

    /// Mark as always required
    #[must_use]
    pub fn required(mut self) -> Self {
        self.requirement = Requirement::Required;
        self
    }

    /// Required only while `sibling == equals`
    #[must_use]
    pub fn required_when(mut self, sibling: &str, equals: &str) -> Self {
        self.requirement = Requirement::RequiredWhen(Condition::new(sibling, equals));
        self
    }

    /// Shown only while `sibling == equals`
    #[must_use]
    pub fn visible_when(mut self, sibling: &str, equals: &str) -> Self {
        self.visible_when = Some(Condition::new(sibling, equals));
        self
    }

    /// Shown and required only while `sibling == equals`
    #[must_use]
    pub fn conditional(self, sibling: &str, equals: &str) -> Self {
        self.visible_when(sibling, equals)
            .required_when(sibling, equals)
    }

    /// Inclusive numeric range; no effect on non-numeric kinds
    #[must_use]
    pub fn with_range(mut self, lo: f64, hi: f64) -> Self {
        if let FieldKind::Numeric { min, max } = &mut self.kind {
            *min = Some(lo);
            *max = Some(hi);
        }
        self
    }

    /// Default value
    #[must_use]
    pub fn with_default(mut self, value: impl Into<FieldValue>) -> Self {
        self.default = value.into();
        self
    }

    /// Custom message shown when a required value is missing
    #[must_use]
    pub fn with_message(mut self, message: &str) -> Self {
        self.required_message = Some(message.to_string());
        self
    }

    /// Whether the field is currently shown
    #[must_use]
    pub fn is_visible(&self, siblings: &FieldMap) -> bool {
        self.visible_when.as_ref().map_or(true, |c| c.holds(siblings))
    }

    /// Whether an empty value is currently invalid
    #[must_use]
    pub fn is_required(&self, siblings: &FieldMap) -> bool {
        if !self.is_visible(siblings) {
            return false;
        }
        match &self.requirement {
            Requirement::Optional => false,
            Requirement::Required => true,
            Requirement::RequiredWhen(c) => c.holds(siblings),
        }
    }

    /// Sibling keys whose changes can flip this field's state
    pub fn controllers(&self) -> impl Iterator<Item = &str> {
        let requirement = match &self.requirement {
            Requirement::RequiredWhen(c) => Some(c.sibling.as_str()),
            _ => None,
        };
        let visibility = self.visible_when.as_ref().map(|c| c.sibling.as_str());
        requirement.into_iter().chain(visibility)
    }

    /// Message for a missing required value
    #[must_use]
    pub fn missing_message(&self) -> String {
        self.required_message
            .clone()
            .unwrap_or_else(|| format!("{} es requerido", self.label))
    }
}

/// Schema construction errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SchemaError {
    /// Two fields share a key
    #[error("duplicate field key: {0}")]
    DuplicateKey(String),

    /// Condition references a key that is not a sibling
    #[error("field '{field}' depends on unknown sibling '{sibling}'")]
    UnknownSibling {
        /// Dependent field
        field: String,
        /// Missing controller
        sibling: String,
    },

    /// Lookup of a key the schema does not declare
    #[error("unknown field: {0}")]
    UnknownField(String),
}

/// Ordered field declarations for one record shape (or one flat section)
#[derive(Debug, Clone, PartialEq)]
pub struct RecordSchema {
    name: String,
    fields: Vec<FieldSchema>,
}

impl RecordSchema {
    /// Build a schema, checking key uniqueness and condition references
    ///
    /// # Errors
    /// - `SchemaError::DuplicateKey` if two fields share a key
    /// - `SchemaError::UnknownSibling` if a condition references a missing key
    pub fn new(name: impl Into<String>, fields: Vec<FieldSchema>) -> Result<Self, SchemaError> {
        let mut keys = HashSet::new();
        for field in &fields {
            if !keys.insert(field.key.as_str()) {
                return Err(SchemaError::DuplicateKey(field.key.clone()));
            }
        }
        for field in &fields {
            if let Some(sibling) = field.controllers().find(|s| !keys.contains(s)) {
                return Err(SchemaError::UnknownSibling {
                    field: field.key.clone(),
                    sibling: sibling.to_string(),
                });
            }
        }

        Ok(Self {
            name: name.into(),
            fields,
        })
    }

    /// Schema name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldSchema] {
        &self.fields
    }

    /// Look up a field
    #[must_use]
    pub fn field(&self, key: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.key == key)
    }

    /// Fields whose requirement or visibility depends on `key`
    pub fn dependents<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a FieldSchema> + 'a {
        self.fields
            .iter()
            .filter(move |f| f.controllers().any(|c| c == key))
    }

    /// Default values for a fresh record
    #[must_use]
    pub fn defaults(&self) -> FieldMap {
        self.fields
            .iter()
            .map(|f| (f.key.clone(), f.default.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn financing() -> RecordSchema {
        RecordSchema::new(
            "financing",
            vec![
                FieldSchema::yes_no("hasMechanism", "¿Cuenta con mecanismo?", "no"),
                FieldSchema::text("mechanism", "Mecanismo").conditional("hasMechanism", "yes"),
                FieldSchema::numeric("cost", "Costo"),
            ],
        )
        .unwrap()
    }

    #[test]
    fn rejects_duplicate_keys() {
        let err = RecordSchema::new(
            "dup",
            vec![FieldSchema::text("a", "A"), FieldSchema::text("a", "A2")],
        )
        .unwrap_err();
        assert_eq!(err, SchemaError::DuplicateKey("a".into()));
    }

    #[test]
    fn rejects_dangling_condition() {
        let err = RecordSchema::new(
            "dangling",
            vec![FieldSchema::text("b", "B").required_when("missing", "x")],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::UnknownSibling { .. }));
    }

    #[test]
    fn conditional_field_follows_controller() {
        let schema = financing();
        let field = schema.field("mechanism").unwrap();

        let mut values = schema.defaults();
        assert!(!field.is_visible(&values));
        assert!(!field.is_required(&values));

        values.insert("hasMechanism".into(), FieldValue::Flag(YesNo::Yes));
        assert!(field.is_visible(&values));
        assert!(field.is_required(&values));
    }

    #[test]
    fn dependents_of_controller() {
        let schema = financing();
        let deps: Vec<_> = schema.dependents("hasMechanism").map(|f| f.key.as_str()).collect();
        assert_eq!(deps, vec!["mechanism"]);
        assert_eq!(schema.dependents("cost").count(), 0);
    }

    #[test]
    fn defaults_in_declaration_order() {
        let defaults = financing().defaults();
        let keys: Vec<_> = defaults.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["hasMechanism", "mechanism", "cost"]);
        assert_eq!(defaults["hasMechanism"], FieldValue::Flag(YesNo::No));
    }
}
