//! Supervisor PUT endpoints: direct task edits and schedule updates.
//!
//! The task edit is the manual override path; status changes made here skip
//! the submit/review transition rules but still go through the lifecycle
//! engine so the history stays complete.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::format_validation_errors;
use db::lifecycle;
use db::models::schedule::Model as Schedule;
use db::models::task::TaskStatus;
use serde::Deserialize;
use util::state::AppState;
use util::time_format::{Period, to_24_hour};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{ScheduleResponse, lifecycle_error_response, parse_date};
use crate::routes::supervisors::common::{
    HEX_COLOR_REGEX, SupervisedTaskItem, TIME_12_HOUR_REGEX,
};

#[derive(Debug, Deserialize, Validate)]
pub struct EditTaskRequest {
    #[validate(length(min = 1, message = "Task name cannot be empty"))]
    pub task_name: Option<String>,

    #[validate(length(min = 1, message = "Description cannot be empty"))]
    pub description: Option<String>,

    pub due_date: Option<String>,

    pub status: Option<TaskStatus>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateScheduleRequest {
    #[validate(length(min = 1, message = "Title cannot be empty"))]
    pub title: Option<String>,

    pub start_date: Option<String>,

    #[validate(regex(
        path = &*TIME_12_HOUR_REGEX,
        message = "Start time must be in 12-hour format (01-12):MM"
    ))]
    pub start_time: Option<String>,

    pub start_period: Option<Period>,

    pub end_date: Option<String>,

    #[validate(regex(
        path = &*TIME_12_HOUR_REGEX,
        message = "End time must be in 12-hour format (01-12):MM"
    ))]
    pub end_time: Option<String>,

    pub end_period: Option<Period>,

    pub description: Option<String>,

    #[validate(regex(
        path = &*HEX_COLOR_REGEX,
        message = "Color must be a valid hex color code (e.g., #3b82f6)"
    ))]
    pub color: Option<String>,
}

/// PUT /supervisors/tasks/{task_id}
///
/// Edit a task the caller assigned. Any subset of fields may be supplied;
/// a status value is applied as-is, outside the submit/review transition
/// rules, but still lands a history row and refreshes project progress.
///
/// ### Request Body
/// ```json
/// {
///   "task_name": "Literature review (revised)",
///   "due_date": "2026-07-01",
///   "status": "Completed"
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK` → the updated task, message `"Task updated successfully"`
/// - `400 Bad Request` → validation failure or unparseable due date
/// - `404 Not Found` → `"Task not found for this supervisor"`
pub async fn edit_task(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(task_id): Path<i64>,
    Json(req): Json<EditTaskRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    let due_date = match &req.due_date {
        Some(raw) => match parse_date(raw) {
            Some(parsed) => Some(parsed),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error("Invalid due date")),
                )
                    .into_response();
            }
        },
        None => None,
    };

    match lifecycle::task::edit_task(
        app_state.db(),
        claims.sub,
        task_id,
        req.task_name.as_deref(),
        req.description.as_deref(),
        due_date,
        req.status,
    )
    .await
    {
        Ok(task) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SupervisedTaskItem::from(task),
                "Task updated successfully",
            )),
        )
            .into_response(),
        Err(e) => {
            let (status, message) = lifecycle_error_response(e);
            (status, Json(ApiResponse::<()>::error(message))).into_response()
        }
    }
}

/// PUT /supervisors/schedules/{id}
///
/// Partially update one of the caller's schedules. Any supplied time must
/// come with its AM/PM period; after merging the changes with the stored
/// row the event must still start before it ends.
///
/// ### Responses
///
/// - `200 OK` → the updated schedule with derived 12-hour display fields
/// - `400 Bad Request` → validation failure, missing period, bad date, or start not before end
/// - `404 Not Found` → `"Schedule not found"`
pub async fn update_schedule(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateScheduleRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    let db = app_state.db();
    let current = match Schedule::get_owned(db, id, claims.sub).await {
        Ok(Some(schedule)) => schedule,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Schedule not found")),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    let start_time = match convert_time(&req.start_time, req.start_period, "Start") {
        Ok(time) => time,
        Err(response) => return response,
    };
    let end_time = match convert_time(&req.end_time, req.end_period, "End") {
        Ok(time) => time,
        Err(response) => return response,
    };

    let start_date = match &req.start_date {
        Some(raw) => match parse_date(raw) {
            Some(parsed) => Some(parsed),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error("Invalid start date")),
                )
                    .into_response();
            }
        },
        None => None,
    };
    let end_date = match &req.end_date {
        Some(raw) => match parse_date(raw) {
            Some(parsed) => Some(parsed),
            None => {
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ApiResponse::<()>::error("Invalid end date")),
                )
                    .into_response();
            }
        },
        None => None,
    };

    // Validate the merged event, not just the changed fields.
    let merged_start_date = start_date.unwrap_or(current.start_date);
    let merged_end_date = end_date.unwrap_or(current.end_date);
    let merged_start_time = start_time.as_deref().unwrap_or(&current.start_time);
    let merged_end_time = end_time.as_deref().unwrap_or(&current.end_time);
    if (merged_start_date, merged_start_time) >= (merged_end_date, merged_end_time) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "Start time must be before end time",
            )),
        )
            .into_response();
    }

    let updated = match current
        .edit(
            db,
            req.title.as_deref(),
            start_date,
            start_time.as_deref(),
            end_date,
            end_time.as_deref(),
            req.description.as_deref(),
            req.color.as_deref(),
        )
        .await
    {
        Ok(schedule) => schedule,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    match ScheduleResponse::try_from(updated) {
        Ok(response) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                response,
                "Schedule updated successfully",
            )),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("{}", e))),
        )
            .into_response(),
    }
}

/// Converts an optional 12-hour time to 24-hour form, insisting on a period
/// whenever a time is present.
fn convert_time(
    time: &Option<String>,
    period: Option<Period>,
    label: &str,
) -> Result<Option<String>, Response> {
    let Some(raw) = time else {
        return Ok(None);
    };
    let Some(period) = period else {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!(
                "{} time requires a period (AM or PM)",
                label
            ))),
        )
            .into_response());
    };
    match to_24_hour(raw, period) {
        Ok(converted) => Ok(Some(converted)),
        Err(e) => Err((
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(format!("{}", e))),
        )
            .into_response()),
    }
}
