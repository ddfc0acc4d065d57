//! File uploads to the media host.

use axum::Json;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use http::StatusCode;
use serde::Serialize;

use hub_auth::CurrentUser;
use hub_core::{Attachment, access};
use hub_media::{UploadFile, guess_content_type, upload_all};

use super::ApiResult;
use crate::{ApiError, AppState};

/// Uploaded files, in request order.
#[derive(Debug, Serialize)]
pub struct Uploaded {
    /// One attachment per file part.
    pub files: Vec<Attachment>,
}

fn multipart_error(err: MultipartError) -> ApiError {
    ApiError::payload(err.status(), err.body_text())
}

/// `POST /api/uploads`
///
/// Every multipart part with a file name is uploaded; other parts are
/// ignored. The returned attachments go into proposal, project or profile
/// updates.
pub async fn upload(
    State(state): State<AppState>,
    CurrentUser(auth): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<(StatusCode, Json<Uploaded>)> {
    access::require(auth.role.can_upload(), "this account cannot upload files")?;
    let mut multipart =
        multipart.map_err(|rejection| ApiError::payload(rejection.status(), rejection.body_text()))?;

    let mut files = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let Some(file_name) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field
            .content_type()
            .map(str::to_string)
            .filter(|ct| ct != "application/octet-stream")
            .unwrap_or_else(|| guess_content_type(&file_name).to_string());
        let bytes = field.bytes().await.map_err(multipart_error)?;
        files.push(UploadFile::new(file_name, content_type, bytes));
    }

    let folder = format!("{}/{}", state.media_folder, auth.user_id);
    let attachments = upload_all(state.media.as_ref(), &state.upload_policy, &folder, &files).await?;
    tracing::info!(user = %auth.user_id, count = attachments.len(), "files uploaded");
    Ok((StatusCode::CREATED, Json(Uploaded { files: attachments })))
}
