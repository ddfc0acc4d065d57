//! Files stored at the media host.

use serde::{Deserialize, Serialize};

use crate::{validate, Result};

/// A file that already lives at the media host.
///
/// Project-HUB never stores file bytes itself; documents only keep the
/// host's URL and identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Public URL served by the media host.
    pub url: String,

    /// Host-side identifier, used to manage the file at the host.
    pub public_id: String,

    /// Original file name as uploaded.
    pub file_name: String,

    /// MIME type reported at upload.
    pub content_type: String,

    /// Size in bytes.
    pub size: u64,
}

impl Attachment {
    /// Checks that the attachment points at an HTTP(S) or in-memory URL and
    /// carries a file name.
    pub fn validate(&self, field: &str) -> Result<()> {
        if !self.url.starts_with("memory://") {
            validate::url(field, &self.url)?;
        }
        validate::text(field, &self.file_name, 1, 255)?;
        Ok(())
    }
}

/// Validates a list of attachments and its length.
pub(crate) fn validate_all(field: &str, attachments: &[Attachment], max: usize) -> Result<()> {
    validate::max_items(field, attachments.len(), max)?;
    attachments.iter().try_for_each(|a| a.validate(field))
}
