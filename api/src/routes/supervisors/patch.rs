//! Supervisor PATCH endpoints.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use db::models::notification;
use util::state::AppState;

use crate::auth::AuthUser;
use crate::response::ApiResponse;

/// PATCH /supervisors/notifications/{id}/read
///
/// Mark one of the caller's notifications as read. Notifications owned
/// by anyone else are indistinguishable from missing ones.
///
/// ### Responses
/// - `200 OK` → `"Notification marked as read"`
/// - `404 Not Found` → `"Notification not found"`
pub async fn mark_notification_read(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    match notification::Model::mark_read(
        app_state.db(),
        id,
        claims.sub,
        notification::UserKind::Supervisor,
    )
    .await
    {
        Ok(true) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Notification marked as read")),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Notification not found")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
        ),
    }
}
