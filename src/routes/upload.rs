use axum::extract::{Multipart, State};
use axum::Json;
use std::path::PathBuf;

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::api::{StoredFileInfo, UploadResponse, UploadedFiles};
use crate::services::layout::StorageLayout;
use crate::services::validation::{self, UploadRole};
use crate::services::icon;

/// POST /upload — accept a bundle and an optional icon via multipart.
///
/// Each accepted file is written under a freshly generated unique name; the
/// caller-supplied filename contributes only its lower-cased extension. An
/// icon is normalized to the canonical 512x512 PNG immediately; normalization
/// failure degrades to "no icon" rather than failing the request.
pub async fn upload_files(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<UploadResponse>> {
    let mut html_file: Option<StoredFileInfo> = None;
    let mut icon_source: Option<(PathBuf, StoredFileInfo)> = None;
    let mut file_count = 0usize;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("Malformed multipart request: {e}")))?
    {
        let role = match field.name() {
            Some("htmlFile") => UploadRole::Bundle,
            Some("appIcon") => UploadRole::Icon,
            Some(other) => {
                return Err(ApiError::BadRequest(format!(
                    "Unexpected multipart field: {other}"
                )))
            }
            None => continue,
        };

        file_count += 1;
        validation::check_file_count(file_count)?;

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let declared_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        validation::validate_submission(role, &declared_type, &original_name)?;

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::BadRequest(format!("Failed to read upload: {e}")))?;
        validation::check_size(data.len() as u64, state.config.max_file_size_bytes)?;

        let stored_name = StorageLayout::stored_name(&original_name);
        let path = state.layout.upload_path(role, &stored_name);
        tokio::fs::write(&path, &data).await?;

        tracing::info!(
            role = ?role,
            stored = %stored_name,
            size = data.len(),
            "Upload stored"
        );

        let info = StoredFileInfo {
            filename: stored_name,
            originalname: original_name,
            size: data.len() as u64,
            mimetype: declared_type,
        };
        match role {
            UploadRole::Bundle => html_file = Some(info),
            UploadRole::Icon => icon_source = Some((path, info)),
        }
    }

    let html_file = html_file.ok_or(ApiError::MissingField("htmlFile"))?;

    let icon_file = match icon_source {
        Some((path, info)) => normalize_icon(path, info).await?,
        None => None,
    };

    metrics::counter!("uploads_total").increment(1);

    Ok(Json(UploadResponse {
        success: true,
        message: "Files uploaded successfully".to_string(),
        files: UploadedFiles {
            html_file,
            icon_file,
        },
    }))
}

/// Run icon normalization on the blocking pool, mapping failure to `None`.
async fn normalize_icon(
    path: PathBuf,
    info: StoredFileInfo,
) -> ApiResult<Option<StoredFileInfo>> {
    let result = tokio::task::spawn_blocking(move || icon::normalize(&path))
        .await
        .map_err(|e| ApiError::Internal(format!("icon normalization task failed: {e}")))?;

    match result {
        Ok(dest) => {
            let size = tokio::fs::metadata(&dest).await?.len();
            let filename = dest
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .ok_or_else(|| ApiError::Internal("normalized icon has no filename".into()))?;
            Ok(Some(StoredFileInfo {
                filename,
                originalname: info.originalname,
                size,
                mimetype: "image/png".to_string(),
            }))
        }
        Err(e) => {
            metrics::counter!("icon_normalize_failures_total").increment(1);
            tracing::warn!(error = %e, "Icon normalization failed, continuing without icon");
            Ok(None)
        }
    }
}
