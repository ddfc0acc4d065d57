//! The media host seam and batch upload.

use async_trait::async_trait;
use bytes::Bytes;
use futures::future::try_join_all;

use hub_core::Attachment;

use crate::{Result, UploadPolicy};

/// A file received from a client, ready to relay.
#[derive(Clone, PartialEq, Eq)]
pub struct UploadFile {
    /// Client-supplied file name.
    pub file_name: String,
    /// MIME type.
    pub content_type: String,
    /// File contents.
    pub bytes: Bytes,
}

impl std::fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadFile")
            .field("file_name", &self.file_name)
            .field("content_type", &self.content_type)
            .field("size", &self.bytes.len())
            .finish()
    }
}

impl UploadFile {
    /// Creates an upload.
    pub fn new(
        file_name: impl Into<String>,
        content_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }

    /// Size in bytes.
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// An external service that stores files and hands back public URLs.
#[async_trait]
pub trait MediaHost: Send + Sync + 'static {
    /// Stores one file under `folder`.
    async fn upload(&self, folder: &str, file: &UploadFile) -> Result<Attachment>;

    /// Short host name for health reports and logs.
    fn name(&self) -> &'static str;
}

/// Checks `files` against `policy`, then uploads them all concurrently.
///
/// The batch fails as a whole if any upload fails. Attachments come back
/// in input order.
pub async fn upload_all(
    host: &dyn MediaHost,
    policy: &UploadPolicy,
    folder: &str,
    files: &[UploadFile],
) -> Result<Vec<Attachment>> {
    policy.check(files)?;
    log::debug!("Uploading {} file(s) to {} via {}", files.len(), folder, host.name());
    let attachments = try_join_all(files.iter().map(|file| host.upload(folder, file))).await?;
    log::info!("Uploaded {} file(s) to {}", attachments.len(), folder);
    Ok(attachments)
}
