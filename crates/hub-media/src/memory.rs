//! In-memory media host.

use std::sync::Mutex;

use async_trait::async_trait;

use hub_core::Attachment;

use crate::{MediaError, MediaHost, Result, UploadFile};

/// A [`MediaHost`] that keeps uploads in memory and returns `memory://`
/// URLs. Used by tests and ephemeral servers.
#[derive(Debug, Default)]
pub struct MemoryMediaHost {
    uploads: Mutex<Vec<(String, UploadFile)>>,
    fail_on: Option<String>,
}

impl MemoryMediaHost {
    /// Creates an empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// A host that answers 500 for any file named `file_name`.
    pub fn failing_on(file_name: impl Into<String>) -> Self {
        Self {
            uploads: Mutex::default(),
            fail_on: Some(file_name.into()),
        }
    }

    /// Every stored `(folder, file)` pair, in arrival order.
    pub fn uploads(&self) -> Vec<(String, UploadFile)> {
        self.uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

#[async_trait]
impl MediaHost for MemoryMediaHost {
    async fn upload(&self, folder: &str, file: &UploadFile) -> Result<Attachment> {
        if self.fail_on.as_deref() == Some(file.file_name.as_str()) {
            return Err(MediaError::Host {
                status: 500,
                message: format!("refusing {}", file.file_name),
            });
        }
        let mut uploads = self
            .uploads
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        let public_id = format!("{folder}/{}", uploads.len() + 1);
        uploads.push((folder.to_string(), file.clone()));
        Ok(Attachment {
            url: format!("memory://{public_id}/{}", file.file_name),
            public_id,
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            size: file.size(),
        })
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
