//! File upload, review and download endpoints.

use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use super::{at_revision, error, success, ApiResult, DeleteResult};
use crate::errors::{AppError, AppErrorWithRevision};
use crate::models::{CurrentUser, EntityKind, UploadedFile};
use crate::AppState;

/// Where to fetch an upload's contents.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadLink {
    pub id: String,
    pub file_name: String,
    pub content_type: String,
    pub url: String,
    pub download_count: u32,
}

struct FilePart {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// POST /api/uploads - Multipart upload with a `file` part and optional `category`.
pub async fn upload_file(
    State(state): State<AppState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> ApiResult<UploadedFile> {
    let revision_id = state.portal.read().await.revision();
    if !user.role.can_upload() {
        return error(AppError::forbidden(EntityKind::Upload, "upload"), revision_id);
    }

    let mut file: Option<FilePart> = None;
    let mut category: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| at_revision(revision_id)(e.into()))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                let file_name = field.file_name().unwrap_or("").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| at_revision(revision_id)(e.into()))?;
                file = Some(FilePart {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            "category" => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| at_revision(revision_id)(e.into()))?;
                category = Some(text);
            }
            other => tracing::debug!(field = other, "ignoring multipart field"),
        }
    }

    let Some(file) = file else {
        return error(AppError::field("file", "file is required"), revision_id);
    };

    let mut portal = state.portal.write().await;
    let upload = portal
        .add_upload(
            &user,
            state.storage.as_ref(),
            &file.file_name,
            &file.content_type,
            &file.bytes,
            category,
        )
        .map_err(at_revision(portal.revision()))?;
    success(upload, portal.revision())
}

/// DELETE /api/uploads/{id} - Delete an upload and its stored contents.
pub async fn delete_upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<DeleteResult> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();
    let deleted = portal
        .delete_upload(&user, &id, state.storage.as_ref())
        .map_err(at_revision(revision_id))?;
    success(DeleteResult { deleted }, portal.revision())
}

/// POST /api/uploads/{id}/approve
pub async fn approve_upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<UploadedFile> {
    review(state, user, id, true).await
}

/// POST /api/uploads/{id}/reject
pub async fn reject_upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<UploadedFile> {
    review(state, user, id, false).await
}

async fn review(
    state: AppState,
    user: CurrentUser,
    id: String,
    approve: bool,
) -> ApiResult<UploadedFile> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();
    let upload = portal
        .review_upload(&user, &id, approve)
        .map_err(at_revision(revision_id))?;
    success(upload, portal.revision())
}

/// POST /api/uploads/{id}/download - Count a download and return the file URL.
pub async fn download_upload(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<String>,
) -> ApiResult<DownloadLink> {
    let mut portal = state.portal.write().await;
    let revision_id = portal.revision();
    let upload = portal
        .record_download(&user, &id)
        .map_err(at_revision(revision_id))?;

    success(
        DownloadLink {
            id: upload.id,
            file_name: upload.file_name,
            content_type: upload.content_type,
            url: upload.url,
            download_count: upload.download_count,
        },
        portal.revision(),
    )
}

/// GET /files/{key}/{name} - Contents of a stored upload the user can see.
pub async fn serve_file(
    State(state): State<AppState>,
    user: CurrentUser,
    Path((key, name)): Path<(String, String)>,
) -> Result<Response, AppErrorWithRevision> {
    let url = format!("/files/{}/{}", key, name);
    let (upload, revision_id) = {
        let portal = state.portal.read().await;
        let viewer = portal.viewer(&user);
        let upload = portal
            .store::<UploadedFile>()
            .list()
            .iter()
            .find(|f| f.url == url && crate::visibility::is_visible(*f, &viewer))
            .cloned();
        (upload, portal.revision())
    };

    let Some(upload) = upload else {
        return Err(AppErrorWithRevision {
            error: AppError::NotFound(format!("File {} not found", url)),
            revision_id,
        });
    };
    let bytes = state
        .storage
        .retrieve(&upload.url)
        .map_err(at_revision(revision_id))?;

    Ok((
        [
            (header::CONTENT_TYPE, upload.content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", upload.file_name),
            ),
        ],
        bytes,
    )
        .into_response())
}
