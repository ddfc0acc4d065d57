//! Upload limits checked before relaying.

use crate::{MediaError, Result, UploadFile};

/// Default maximum number of files per upload request.
pub const DEFAULT_MAX_FILES: usize = 10;

/// Default per-file size limit (10 MiB).
pub const DEFAULT_MAX_FILE_BYTES: u64 = 10 * 1024 * 1024;

const DEFAULT_ALLOWED_TYPES: &[&str] = &[
    "image/*",
    "application/pdf",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    "application/vnd.openxmlformats-officedocument.presentationml.presentation",
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    "application/zip",
    "text/plain",
];

/// Limits applied to every upload batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadPolicy {
    /// Most files accepted in one batch.
    pub max_files: usize,
    /// Largest accepted file, in bytes.
    pub max_file_bytes: u64,
    /// Accepted MIME types; `type/*` matches a whole top-level type.
    pub allowed_types: Vec<String>,
}

impl Default for UploadPolicy {
    fn default() -> Self {
        Self {
            max_files: DEFAULT_MAX_FILES,
            max_file_bytes: DEFAULT_MAX_FILE_BYTES,
            allowed_types: DEFAULT_ALLOWED_TYPES.iter().map(|t| t.to_string()).collect(),
        }
    }
}

impl UploadPolicy {
    /// Whether `content_type` is on the allow list. Parameters such as
    /// `; charset=utf-8` are ignored.
    pub fn allows_type(&self, content_type: &str) -> bool {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        self.allowed_types.iter().any(|allowed| {
            let allowed = allowed.to_ascii_lowercase();
            match allowed.strip_suffix("/*") {
                Some(top) => essence
                    .split_once('/')
                    .is_some_and(|(t, sub)| t == top && !sub.is_empty()),
                None => allowed == essence,
            }
        })
    }

    /// Checks a batch, naming the first offending file.
    pub fn check(&self, files: &[UploadFile]) -> Result<()> {
        if files.is_empty() {
            return Err(MediaError::rejected("", "no files to upload"));
        }
        if files.len() > self.max_files {
            return Err(MediaError::rejected(
                "",
                format!("too many files: {} (max {})", files.len(), self.max_files),
            ));
        }
        for file in files {
            let size = file.size();
            if size == 0 {
                return Err(MediaError::rejected(&file.file_name, "file is empty"));
            }
            if size > self.max_file_bytes {
                return Err(MediaError::rejected(
                    &file.file_name,
                    format!("file is {size} bytes (max {})", self.max_file_bytes),
                ));
            }
            if !self.allows_type(&file.content_type) {
                return Err(MediaError::rejected(
                    &file.file_name,
                    format!("type {} is not allowed", file.content_type),
                ));
            }
        }
        Ok(())
    }
}

/// Best-effort MIME type from a file extension, for parts sent without a
/// content type.
pub fn guess_content_type(file_name: &str) -> &'static str {
    let ext = file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "zip" => "application/zip",
        "txt" | "md" => "text/plain",
        _ => "application/octet-stream",
    }
}
