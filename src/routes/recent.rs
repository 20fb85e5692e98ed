use axum::extract::State;
use axum::Json;

use crate::app_state::AppState;
use crate::error::ApiResult;
use crate::models::api::RecentApksResponse;
use crate::services::listing;

/// GET /recent-apks — the five most recently created jobs.
pub async fn recent_apks(State(state): State<AppState>) -> ApiResult<Json<RecentApksResponse>> {
    let apks = listing::recent_jobs(&state.layout).await?;

    Ok(Json(RecentApksResponse {
        success: true,
        count: apks.len(),
        apks,
    }))
}
