use axum::extract::{Query, State};
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::api::DownloadParams;
use crate::services::validation::is_safe_path_component;

/// Content type reported for generated artifacts.
const APK_CONTENT_TYPE: &str = "application/vnd.android.package-archive";

/// GET /download?id=&filename= — stream a job's artifact back to the caller.
///
/// The id and filename are used strictly as single path components under the
/// output root; anything that could escape the per-job directory is treated
/// as absent and answered with 404. Unknown references are never synthesized.
pub async fn download(
    State(state): State<AppState>,
    Query(params): Query<DownloadParams>,
) -> ApiResult<Response> {
    if !is_safe_path_component(&params.id) || !is_safe_path_component(&params.filename) {
        return Err(ApiError::NotFound("APK file not found".to_string()));
    }

    let path = state
        .layout
        .apks_dir()
        .join(&params.id)
        .join(&params.filename);

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::NotFound("APK file not found".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    metrics::counter!("downloads_total").increment(1);
    tracing::info!(id = %params.id, filename = %params.filename, size = bytes.len(), "Artifact downloaded");

    let disposition = attachment_disposition(&params.filename);
    Ok((
        StatusCode::OK,
        [
            (
                header::CONTENT_TYPE,
                HeaderValue::from_static(APK_CONTENT_TYPE),
            ),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

/// Build an attachment disposition header, dropping characters that are not
/// representable in a quoted header value.
fn attachment_disposition(filename: &str) -> HeaderValue {
    let safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && *c != '"' || *c == ' ')
        .collect();
    let name = if safe.is_empty() { "app.apk" } else { &safe };
    HeaderValue::from_str(&format!("attachment; filename=\"{name}\""))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment; filename=\"app.apk\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_quotes_plain_filenames() {
        let value = attachment_disposition("My_App_1.0.0.apk");
        assert_eq!(value, "attachment; filename=\"My_App_1.0.0.apk\"");
    }

    #[test]
    fn disposition_strips_hostile_characters() {
        let value = attachment_disposition("a\"b\r\n.apk");
        assert_eq!(value, "attachment; filename=\"ab.apk\"");

        let value = attachment_disposition("\u{1F600}\u{1F600}");
        assert_eq!(value, "attachment; filename=\"app.apk\"");
    }
}
