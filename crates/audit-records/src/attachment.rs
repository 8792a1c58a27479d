//! Record attachments and the acceptance policy

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque binary file attached to one record
#[derive(Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name
    pub file_name: String,
    /// Declared media type
    pub media_type: String,
    /// Raw content
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Create an attachment
    pub fn new(file_name: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            bytes,
        }
    }

    /// Content length in bytes
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the content is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl fmt::Debug for Attachment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Attachment")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Why an attachment was refused
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AttachmentRejected {
    /// Media type not on the accepted list
    #[error("tipo de archivo no permitido: {media_type} (se acepta: {})", accepted.join(", "))]
    UnsupportedType {
        /// Declared media type
        media_type: String,
        /// Accepted media types
        accepted: Vec<String>,
    },

    /// Content above the size limit
    #[error("el archivo supera el tamaño máximo ({size} > {max} bytes)")]
    TooLarge {
        /// Content length
        size: usize,
        /// Limit
        max: usize,
    },

    /// Zero-length content
    #[error("el archivo está vacío")]
    Empty,
}

/// Attachment acceptance rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttachmentPolicy {
    /// Accepted media types, compared case-insensitively
    pub accepted_media_types: Vec<String>,
    /// Largest accepted content length
    pub max_bytes: usize,
}

impl AttachmentPolicy {
    /// PDF only, 10 MiB
    #[must_use]
    pub fn pdf_only() -> Self {
        Self {
            accepted_media_types: vec!["application/pdf".to_string()],
            max_bytes: 10 * 1024 * 1024,
        }
    }

    /// Check an attachment against the policy
    ///
    /// # Errors
    /// - `AttachmentRejected::UnsupportedType`, `TooLarge` or `Empty`
    pub fn check(&self, attachment: &Attachment) -> Result<(), AttachmentRejected> {
        let declared = attachment.media_type.trim();
        if !self
            .accepted_media_types
            .iter()
            .any(|t| t.eq_ignore_ascii_case(declared))
        {
            return Err(AttachmentRejected::UnsupportedType {
                media_type: attachment.media_type.clone(),
                accepted: self.accepted_media_types.clone(),
            });
        }
        if attachment.is_empty() {
            return Err(AttachmentRejected::Empty);
        }
        if attachment.len() > self.max_bytes {
            return Err(AttachmentRejected::TooLarge {
                size: attachment.len(),
                max: self.max_bytes,
            });
        }
        Ok(())
    }
}

impl Default for AttachmentPolicy {
    fn default() -> Self {
        Self::pdf_only()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pdf_accepted_case_insensitively() {
        let policy = AttachmentPolicy::pdf_only();
        let file = Attachment::new("a.pdf", "Application/PDF", b"%PDF".to_vec());
        assert!(policy.check(&file).is_ok());
    }

    #[test]
    fn other_types_rejected() {
        let policy = AttachmentPolicy::pdf_only();
        let file = Attachment::new("a.png", "image/png", vec![1, 2, 3]);
        let err = policy.check(&file).unwrap_err();
        assert!(matches!(err, AttachmentRejected::UnsupportedType { .. }));
        assert!(err.to_string().contains("image/png"));
    }

    #[test]
    fn size_limits() {
        let policy = AttachmentPolicy {
            max_bytes: 4,
            ..AttachmentPolicy::pdf_only()
        };
        let empty = Attachment::new("a.pdf", "application/pdf", vec![]);
        assert_eq!(policy.check(&empty), Err(AttachmentRejected::Empty));

        let big = Attachment::new("a.pdf", "application/pdf", vec![0; 5]);
        assert_eq!(
            policy.check(&big),
            Err(AttachmentRejected::TooLarge { size: 5, max: 4 })
        );
    }
}
