//! Relay to a Cloudinary-style unsigned upload endpoint.
//!
//! Each file is POSTed as `multipart/form-data` to
//! `{base_url}/{cloud_name}/auto/upload` with the fields `file`,
//! `upload_preset` and `folder`. Transient failures are retried with
//! exponential backoff.

use std::time::Duration;

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;

use hub_core::Attachment;

use crate::{MediaError, MediaHost, Result, UploadFile};

/// Default upload API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.cloudinary.com/v1_1";

/// Connection settings for [`HttpMediaHost`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpMediaConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Account ("cloud") name.
    pub cloud_name: String,
    /// Unsigned upload preset.
    pub upload_preset: String,
    /// Attempts per file, including the first.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub min_delay: Duration,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl HttpMediaConfig {
    /// Settings for `cloud_name` and `upload_preset` with default retry and
    /// timeout values.
    pub fn new(cloud_name: impl Into<String>, upload_preset: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            cloud_name: cloud_name.into(),
            upload_preset: upload_preset.into(),
            max_attempts: 3,
            min_delay: Duration::from_millis(200),
            timeout: Duration::from_secs(60),
        }
    }

    /// The upload endpoint.
    pub fn endpoint(&self) -> String {
        format!(
            "{}/{}/auto/upload",
            self.base_url.trim_end_matches('/'),
            self.cloud_name
        )
    }
}

/// Success body returned by the host.
#[derive(Debug, Deserialize)]
struct HostResponse {
    secure_url: String,
    public_id: String,
    #[serde(default)]
    bytes: Option<u64>,
}

/// Error body returned by the host.
#[derive(Debug, Deserialize)]
struct HostErrorBody {
    error: HostErrorDetail,
}

#[derive(Debug, Deserialize)]
struct HostErrorDetail {
    message: String,
}

/// [`MediaHost`] backed by an HTTP upload API.
#[derive(Debug, Clone)]
pub struct HttpMediaHost {
    client: reqwest::Client,
    config: HttpMediaConfig,
    endpoint: String,
}

impl HttpMediaHost {
    /// Creates a host client.
    pub fn new(config: HttpMediaConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| MediaError::Transport(e.to_string()))?;
        let endpoint = config.endpoint();
        Ok(Self {
            client,
            config,
            endpoint,
        })
    }

    /// Connection settings.
    pub fn config(&self) -> &HttpMediaConfig {
        &self.config
    }

    async fn attempt(&self, folder: &str, file: &UploadFile) -> Result<HostResponse> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.file_name.clone())
            .mime_str(&file.content_type)
            .map_err(|e| MediaError::rejected(&file.file_name, format!("bad content type: {e}")))?;
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.config.upload_preset.clone())
            .text("folder", folder.to_string());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await
            .map_err(|e| MediaError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<HostErrorBody>(&body)
                .map(|b| b.error.message)
                .unwrap_or(body);
            return Err(MediaError::Host {
                status: status.as_u16(),
                message,
            });
        }

        response
            .json::<HostResponse>()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))
    }
}

#[async_trait]
impl MediaHost for HttpMediaHost {
    async fn upload(&self, folder: &str, file: &UploadFile) -> Result<Attachment> {
        // backon counts retries, not attempts.
        let backoff = ExponentialBuilder::new()
            .with_min_delay(self.config.min_delay)
            .with_max_times(self.config.max_attempts.saturating_sub(1));

        let uploaded = (|| self.attempt(folder, file))
            .retry(backoff)
            .sleep(tokio::time::sleep)
            .when(MediaError::is_retryable)
            .notify(|err: &MediaError, dur: Duration| {
                log::warn!(
                    "Upload of {} failed ({err}); retrying in {}ms",
                    file.file_name,
                    dur.as_millis()
                );
            })
            .await?;

        Ok(Attachment {
            url: uploaded.secure_url,
            public_id: uploaded.public_id,
            file_name: file.file_name.clone(),
            content_type: file.content_type.clone(),
            size: uploaded.bytes.unwrap_or_else(|| file.size()),
        })
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
