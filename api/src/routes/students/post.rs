//! Student write endpoints: task submission and the final project hand-in.
//!
//! Both handlers delegate every status mutation to the lifecycle engines;
//! this layer only validates the request body and maps engine errors onto
//! HTTP statuses.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::format_validation_errors;
use db::lifecycle;
use db::models::project::ProjectStatus;
use serde::{Deserialize, Serialize};
use util::state::AppState;
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{SubmissionResponse, lifecycle_error_response};

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitTaskRequest {
    #[validate(length(min = 1, message = "Link is required"))]
    pub link: String,

    #[validate(length(min = 1, message = "Short description is required"))]
    pub short_description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SubmitProjectRequest {
    #[validate(length(min = 1, message = "Final project link is required"))]
    pub final_project_link: String,
}

#[derive(Debug, Serialize)]
pub struct SubmittedProjectResponse {
    pub id: i64,
    pub title: String,
    pub status: ProjectStatus,
    pub final_project_link: Option<String>,
    pub progress: i32,
    pub updated_at: String,
}

/// POST /students/tasks/{task_id}/submit
///
/// Submit work against one of the caller's pending tasks. The task moves
/// to Under Review and, on the student's first activity, the project
/// moves out of Not Started.
///
/// ### Request Body
/// ```json
/// {
///   "link": "https://github.com/u20000001/literature-review",
///   "short_description": "First full draft of the review"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 1,
///     "task_id": 4,
///     "student_id": 1,
///     "supervisor_id": 1,
///     "link": "https://github.com/u20000001/literature-review",
///     "short_description": "First full draft of the review",
///     "status": "pending",
///     "feedback": "",
///     "created_at": "2026-05-20T09:12:00Z",
///     "updated_at": "2026-05-20T09:12:00Z"
///   },
///   "message": "Task submitted successfully"
/// }
/// ```
///
/// - `400 Bad Request` (validation failure)
/// - `404 Not Found` → `"Pending task not found for this student"`
pub async fn submit_task(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(task_id): Path<i64>,
    Json(req): Json<SubmitTaskRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    match lifecycle::task::submit_task(
        app_state.db(),
        claims.sub,
        task_id,
        &req.link,
        &req.short_description,
    )
    .await
    {
        Ok(submission) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                SubmissionResponse::from(submission),
                "Task submitted successfully",
            )),
        )
            .into_response(),
        Err(e) => {
            let (status, message) = lifecycle_error_response(e);
            (status, Json(ApiResponse::<()>::error(message))).into_response()
        }
    }
}

/// POST /students/submit-project
///
/// Hand the final project in. Only allowed once every one of the five
/// assigned tasks is completed; the project closes as Completed with the
/// submitted link and shows up in the gallery.
///
/// ### Responses
///
/// - `200 OK` → closed project summary, message `"Project submitted successfully"`
/// - `403 Forbidden` → the five-task gate is not satisfied, or the project
///   was already submitted
/// - `404 Not Found` → `"Project not found for this student"`
pub async fn submit_project(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<SubmitProjectRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    match lifecycle::project::submit_project(app_state.db(), claims.sub, &req.final_project_link)
        .await
    {
        Ok(project) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SubmittedProjectResponse {
                    id: project.id,
                    title: project.title,
                    status: project.status,
                    final_project_link: project.final_project_link,
                    progress: project.progress,
                    updated_at: project.updated_at.to_rfc3339(),
                },
                "Project submitted successfully",
            )),
        )
            .into_response(),
        Err(e) => {
            let (status, message) = lifecycle_error_response(e);
            (status, Json(ApiResponse::<()>::error(message))).into_response()
        }
    }
}
