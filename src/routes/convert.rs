use axum::extract::State;
use axum::Json;
use garde::Validate;

use crate::app_state::AppState;
use crate::error::{ApiError, ApiResult};
use crate::models::api::{ApkInfo, ConvertRequest, ConvertResponse};
use crate::services::persister;

/// POST /convert — create a job from a previously uploaded bundle.
pub async fn convert(
    State(state): State<AppState>,
    Json(request): Json<ConvertRequest>,
) -> ApiResult<Json<ConvertResponse>> {
    request
        .validate()
        .map_err(|report| ApiError::BadRequest(report.to_string()))?;

    let job = persister::create_job(&state.layout, request).await?;

    metrics::counter!("conversions_total").increment(1);

    Ok(Json(ConvertResponse {
        success: true,
        message: "APK created successfully".to_string(),
        apk_info: ApkInfo::from_job(&job),
    }))
}
