//! Supervisor DELETE endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::schedule::Model as Schedule;
use util::state::AppState;

use crate::auth::AuthUser;
use crate::response::ApiResponse;

/// DELETE /supervisors/schedules/{id}
///
/// Remove one of the caller's schedules. Schedules owned by another
/// supervisor are indistinguishable from missing ones.
///
/// ### Responses
/// - `200 OK` → `"Schedule deleted successfully"`
/// - `404 Not Found` → `"Schedule not found"`
pub async fn delete_schedule(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match Schedule::delete_owned(app_state.db(), id, claims.sub).await {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Schedule deleted successfully")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Schedule not found")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
        ),
    }
}
