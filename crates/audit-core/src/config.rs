//! Report configuration
//!
//! Defaults match the deployed report; every key may be overridden from
//! TOML:
//!
//! ```toml
//! fetch_timeout_ms = 5000
//! min_records = 0
//!
//! [attachments]
//! accepted_media_types = ["application/pdf"]
//! max_bytes = 5242880
//!
//! [tables]
//! opportunities = "sectionE_v2"
//! ```

use audit_records::AttachmentPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Store table and column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableNames {
    /// Location lookup table feeding the cascade
    pub locations: String,
    /// Building characterization rows
    pub building: String,
    /// Saving opportunity rows
    pub opportunities: String,
    /// Column receiving the attachment reference
    pub attachment_column: String,
    /// Column of the saving opportunity table holding the whole record
    pub record_column: String,
}

impl Default for TableNames {
    fn default() -> Self {
        Self {
            locations: "direcciones".to_string(),
            building: "firstSection".to_string(),
            opportunities: "sectionE".to_string(),
            attachment_column: "file".to_string(),
            record_column: "opportunities".to_string(),
        }
    }
}

/// Report configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Cascade fetch timeout in milliseconds
    pub fetch_timeout_ms: u64,
    /// Attachment upload timeout in milliseconds
    pub upload_timeout_ms: u64,
    /// Minimum number of records in list sections (0 allows empty lists)
    pub min_records: usize,
    /// Seconds the final acknowledgment stays visible
    pub thank_you_secs: u64,
    /// Attachment acceptance rules
    pub attachments: AttachmentPolicy,
    /// Store names
    pub tables: TableNames,
}

impl AuditConfig {
    /// Default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and check a TOML document
    ///
    /// # Errors
    /// - `ConfigError::Parse` for malformed TOML
    /// - `ConfigError::Invalid` if a value breaks an invariant
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    /// Check invariants
    ///
    /// # Errors
    /// - `ConfigError::Invalid` naming the offending key
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.fetch_timeout_ms == 0 {
            return Err(ConfigError::Invalid("fetch_timeout_ms must be > 0".into()));
        }
        if self.upload_timeout_ms == 0 {
            return Err(ConfigError::Invalid("upload_timeout_ms must be > 0".into()));
        }
        if self.attachments.accepted_media_types.is_empty() {
            return Err(ConfigError::Invalid(
                "attachments.accepted_media_types must not be empty".into(),
            ));
        }
        if self.attachments.max_bytes == 0 {
            return Err(ConfigError::Invalid("attachments.max_bytes must be > 0".into()));
        }
        Ok(())
    }

    /// With a cascade fetch timeout
    #[must_use]
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout_ms = duration_ms(timeout);
        self
    }

    /// With an upload timeout
    #[must_use]
    pub fn with_upload_timeout(mut self, timeout: Duration) -> Self {
        self.upload_timeout_ms = duration_ms(timeout);
        self
    }

    /// With a minimum record count
    #[must_use]
    pub fn with_min_records(mut self, min: usize) -> Self {
        self.min_records = min;
        self
    }

    /// With an attachment policy
    #[must_use]
    pub fn with_attachment_policy(mut self, policy: AttachmentPolicy) -> Self {
        self.attachments = policy;
        self
    }

    /// Cascade fetch timeout
    #[inline]
    #[must_use]
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    /// Upload timeout
    #[inline]
    #[must_use]
    pub fn upload_timeout(&self) -> Duration {
        Duration::from_millis(self.upload_timeout_ms)
    }

    /// How long the acknowledgment stays visible
    #[inline]
    #[must_use]
    pub fn thank_you_duration(&self) -> Duration {
        Duration::from_secs(self.thank_you_secs)
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_ms: 10_000,
            upload_timeout_ms: 30_000,
            min_records: 1,
            thank_you_secs: 3,
            attachments: AttachmentPolicy::pdf_only(),
            tables: TableNames::default(),
        }
    }
}

fn duration_ms(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// TOML could not be parsed
    #[error("invalid configuration file: {0}")]
    Parse(#[from] toml::de::Error),

    /// A value breaks an invariant
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn defaults_match_deployment() {
        let config = AuditConfig::new();
        assert_eq!(config.tables.locations, "direcciones");
        assert_eq!(config.tables.building, "firstSection");
        assert_eq!(config.tables.opportunities, "sectionE");
        assert_eq!(config.tables.record_column, "opportunities");
        assert_eq!(config.min_records, 1);
        assert_eq!(config.thank_you_duration(), Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_toml_overrides() {
        let config = AuditConfig::from_toml_str(
            r#"
            fetch_timeout_ms = 2500
            min_records = 0

            [attachments]
            max_bytes = 1024

            [tables]
            opportunities = "sectionE_v2"
            "#,
        )
        .unwrap();

        assert_eq!(config.fetch_timeout(), Duration::from_millis(2500));
        assert_eq!(config.min_records, 0);
        assert_eq!(config.attachments.max_bytes, 1024);
        assert_eq!(config.attachments.accepted_media_types, vec!["application/pdf"]);
        assert_eq!(config.tables.opportunities, "sectionE_v2");
        assert_eq!(config.tables.building, "firstSection");
    }

    #[test]
    fn rejects_invalid_values() {
        assert!(matches!(
            AuditConfig::from_toml_str("fetch_timeout_ms = 0"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AuditConfig::from_toml_str("[attachments]\naccepted_media_types = []"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            AuditConfig::from_toml_str("fetch_timeout_ms = \"soon\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn builders() {
        let config = AuditConfig::new()
            .with_fetch_timeout(Duration::from_millis(50))
            .with_min_records(0);
        assert_eq!(config.fetch_timeout_ms, 50);
        assert_eq!(config.min_records, 0);
    }
}
