//! Hand-off of submitted sections to the report aggregate

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Report section identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SectionId {
    /// Section A: building characterization
    #[serde(rename = "sectionA")]
    BuildingCharacterization,
    /// Section E: energy saving opportunities
    #[serde(rename = "sectionE")]
    SavingOpportunities,
}

impl SectionId {
    /// Key under which the section's values are merged
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BuildingCharacterization => "sectionA",
            Self::SavingOpportunities => "sectionE",
        }
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Receiver of submitted section values
pub trait SectionBridge: Send + Sync {
    /// Record the validated values of one section
    ///
    /// Called once per successful submission, after the rows were written.
    fn merge_section(&self, section: SectionId, values: Value);
}

/// In-process report aggregate; later merges of a section replace earlier ones
#[derive(Debug, Default)]
pub struct AuditReport {
    sections: RwLock<BTreeMap<SectionId, Value>>,
}

impl AuditReport {
    /// Empty report
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Values merged for one section
    #[must_use]
    pub fn section(&self, id: SectionId) -> Option<Value> {
        self.sections.read().get(&id).cloned()
    }

    /// Sections merged so far
    #[must_use]
    pub fn completed(&self) -> Vec<SectionId> {
        self.sections.read().keys().copied().collect()
    }

    /// Whole report as one JSON object keyed by section
    #[must_use]
    pub fn to_json(&self) -> Value {
        let sections = self.sections.read();
        Value::Object(
            sections
                .iter()
                .map(|(id, values)| (id.as_str().to_string(), values.clone()))
                .collect::<Map<String, Value>>(),
        )
    }
}

impl SectionBridge for AuditReport {
    fn merge_section(&self, section: SectionId, values: Value) {
        let replaced = self.sections.write().insert(section, values).is_some();
        tracing::info!(%section, replaced, "section merged into report");
    }
}
