//! Runtime configuration for batch ingestion.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Boundary constraints and upload layout for one ingestion endpoint.
///
/// Cheap validation (MIME allow-list, maximum size) runs against this config
/// before any hashing, so invalid files are rejected without wasted work.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum accepted file size in bytes.
    pub max_file_bytes: usize,
    /// MIME types accepted for upload; compared case-insensitively against
    /// the declared content type.
    pub allowed_mime: Vec<String>,
    /// Object-store key prefix for uploaded files.
    pub upload_prefix: String,
}

impl BatchConfig {
    /// Validates internal consistency; intended for startup-time checks.
    pub fn validate(&self) -> Result<(), BatchConfigError> {
        if self.max_file_bytes == 0 {
            return Err(BatchConfigError::ZeroMaxFileBytes);
        }
        if self.allowed_mime.is_empty() {
            return Err(BatchConfigError::EmptyMimeAllowList);
        }
        for mime in &self.allowed_mime {
            if !mime.starts_with("image/") {
                return Err(BatchConfigError::NonImageMime(mime.clone()));
            }
        }
        Ok(())
    }

    /// True when `content_type` is on the allow-list.
    pub fn accepts_mime(&self, content_type: &str) -> bool {
        self.allowed_mime
            .iter()
            .any(|m| m.eq_ignore_ascii_case(content_type.trim()))
    }
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            max_file_bytes: 10 * 1024 * 1024,
            allowed_mime: vec![
                "image/jpeg".into(),
                "image/png".into(),
                "image/webp".into(),
                "image/gif".into(),
            ],
            upload_prefix: "reference-images".into(),
        }
    }
}

/// Startup-time configuration errors for [`BatchConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum BatchConfigError {
    #[error("max_file_bytes must be greater than zero")]
    ZeroMaxFileBytes,
    #[error("allowed_mime must not be empty")]
    EmptyMimeAllowList,
    #[error("allowed_mime entry {0:?} is not an image type")]
    NonImageMime(String),
}
