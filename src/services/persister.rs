use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::error::{ApiError, ApiResult};
use crate::models::api::ConvertRequest;
use crate::models::job::{Job, Manifest};
use crate::services::layout::StorageLayout;
use crate::services::validation::{is_safe_path_component, UploadRole};

/// Stored name given to the icon copied into a job directory.
const JOB_ICON_NAME: &str = "icon.png";

/// Create a new job from a convert request: derive the artifact filename,
/// write the artifact and its manifest into a fresh per-job directory, and
/// consume the referenced uploads.
///
/// Validation happens before any directory is created, so a rejected request
/// leaves no trace on disk.
pub async fn create_job(layout: &StorageLayout, request: ConvertRequest) -> ApiResult<Job> {
    let app_name = required_field(request.app_name.as_deref(), "appName")?;
    let package_name = required_field(request.package_name.as_deref(), "packageName")?;
    let version = request
        .version
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("1.0.0")
        .to_string();
    let features = request.features.clone().unwrap_or_default();
    let permissions = request.permissions.unwrap_or_default();

    // Upload references may only name a single path component.
    for reference in [&request.html_filename, &request.icon_filename]
        .into_iter()
        .flatten()
    {
        if !is_safe_path_component(reference) {
            return Err(ApiError::BadRequest(format!(
                "Invalid upload reference: {reference}"
            )));
        }
    }

    let job_id = Uuid::new_v4();
    let created_at = Utc::now();
    let filename = derive_artifact_filename(app_name, &version);
    let job_dir = layout.job_dir(job_id);

    // Consume the uploaded bundle, tolerating a stale reference: the artifact
    // is fabricated either way, matching the conversion's placeholder nature.
    let bundle_size = match &request.html_filename {
        Some(name) => {
            let path = layout.upload_path(UploadRole::Bundle, name);
            match tokio::fs::metadata(&path).await {
                Ok(meta) => {
                    let size = meta.len();
                    tokio::fs::remove_file(&path).await?;
                    Some(size)
                }
                Err(_) => {
                    tracing::warn!(job_id = %job_id, bundle = %name, "Referenced bundle upload not found");
                    None
                }
            }
        }
        None => None,
    };

    let artifact = json!({
        "app": "XY2APK Generated APK",
        "note": "This is a simulated APK file. In production, this would be a real Android APK.",
        "appName": app_name,
        "packageName": package_name,
        "version": version,
        "bundleBytes": bundle_size,
        "buildId": job_id,
        "timestamp": created_at,
    });
    let artifact_bytes =
        serde_json::to_vec_pretty(&artifact).map_err(|e| ApiError::Internal(e.to_string()))?;

    tokio::fs::create_dir_all(&job_dir).await?;

    let result = write_job_files(layout, &job_dir, &filename, &artifact_bytes, &request).await;
    if result.is_err() {
        // Half-written job directories would show up in listings.
        let _ = tokio::fs::remove_dir_all(&job_dir).await;
    }
    result?;

    let job = Job {
        id: job_id,
        app_name: app_name.to_string(),
        package_name: package_name.to_string(),
        version,
        features,
        permissions,
        filename: filename.clone(),
        size: artifact_bytes.len() as u64,
        created_at,
    };

    let manifest = Manifest::for_job(&job);
    let manifest_bytes =
        serde_json::to_vec_pretty(&manifest).map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Err(e) = tokio::fs::write(job_dir.join("manifest.json"), manifest_bytes).await {
        let _ = tokio::fs::remove_dir_all(&job_dir).await;
        return Err(e.into());
    }

    tracing::info!(
        job_id = %job.id,
        app_name = %job.app_name,
        package_name = %job.package_name,
        filename = %job.filename,
        "Job created"
    );

    Ok(job)
}

async fn write_job_files(
    layout: &StorageLayout,
    job_dir: &std::path::Path,
    filename: &str,
    artifact_bytes: &[u8],
    request: &ConvertRequest,
) -> ApiResult<()> {
    tokio::fs::write(job_dir.join(filename), artifact_bytes).await?;

    // Move the normalized icon into the job directory when one was produced.
    if let Some(icon_name) = &request.icon_filename {
        let source = layout.upload_path(UploadRole::Icon, icon_name);
        if tokio::fs::metadata(&source).await.is_ok() {
            tokio::fs::copy(&source, job_dir.join(JOB_ICON_NAME)).await?;
            tokio::fs::remove_file(&source).await?;
        } else {
            tracing::warn!(icon = %icon_name, "Referenced icon upload not found");
        }
    }

    Ok(())
}

fn required_field<'a>(value: Option<&'a str>, name: &'static str) -> ApiResult<&'a str> {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ApiError::MissingField(name)),
    }
}

/// Derive the artifact filename from the application name and version.
///
/// Whitespace runs collapse to single underscores; path separators are
/// dropped so the result is always a single path component.
pub fn derive_artifact_filename(app_name: &str, version: &str) -> String {
    let mut base = String::with_capacity(app_name.len());
    let mut in_whitespace = false;
    for c in app_name.chars() {
        if c.is_whitespace() {
            if !in_whitespace {
                base.push('_');
            }
            in_whitespace = true;
        } else if c != '/' && c != '\\' && c != '\0' {
            base.push(c);
            in_whitespace = false;
        }
    }
    format!("{base}_{version}.apk")
}
