//! Supervisor write endpoints: bulk task assignment, submission review and
//! schedule creation.
//!
//! Task and review mutations are delegated to the lifecycle engines.
//! Schedule times arrive in 12-hour form with an AM/PM period and are
//! converted to 24-hour strings before anything is written.

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use common::format_validation_errors;
use db::lifecycle::{self, task::ReviewDecision};
use db::models::{notification, schedule::Model as Schedule, student::Model as Student};
use serde::Deserialize;
use tracing::warn;
use util::state::AppState;
use util::time_format::{Period, to_24_hour};
use validator::Validate;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{ScheduleResponse, lifecycle_error_response, parse_date};
use crate::routes::supervisors::common::{
    HEX_COLOR_REGEX, SupervisedTaskItem, TIME_12_HOUR_REGEX,
};

const DEFAULT_SCHEDULE_COLOR: &str = "#3b82f6";

#[derive(Debug, Deserialize, Validate)]
pub struct ReviewTaskRequest {
    pub status: ReviewDecision,

    #[validate(length(min = 1, message = "Feedback is required"))]
    pub feedback: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AssignTaskRequest {
    #[validate(length(min = 1, message = "Task name is required"))]
    pub task_name: String,

    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,

    #[validate(length(min = 1, message = "Due date is required"))]
    pub due_date: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateScheduleRequest {
    #[validate(length(min = 1, message = "Title is required"))]
    pub title: String,

    #[validate(length(min = 1, message = "Start date is required"))]
    pub start_date: String,

    #[validate(regex(
        path = &*TIME_12_HOUR_REGEX,
        message = "Start time must be in 12-hour format (01-12):MM"
    ))]
    pub start_time: String,

    pub start_period: Option<Period>,

    #[validate(length(min = 1, message = "End date is required"))]
    pub end_date: String,

    #[validate(regex(
        path = &*TIME_12_HOUR_REGEX,
        message = "End time must be in 12-hour format (01-12):MM"
    ))]
    pub end_time: String,

    pub end_period: Option<Period>,

    pub description: Option<String>,

    #[validate(regex(
        path = &*HEX_COLOR_REGEX,
        message = "Color must be a valid hex color code (e.g., #3b82f6)"
    ))]
    pub color: Option<String>,
}

/// POST /supervisors/students/{student_id}/tasks/{task_id}/review
///
/// Decide on the pending submission of a task. Approval completes the
/// task and refreshes the student's project progress; rejection reopens
/// the task for resubmission. Either way the student is notified and the
/// decision lands in the task history.
///
/// ### Request Body
/// ```json
/// {
///   "status": "approved",
///   "feedback": "Solid work, the methodology section reads well."
/// }
/// ```
///
/// ### Responses
///
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "id": 4,
///     "title": "Literature review",
///     "description": "...",
///     "status": "Completed",
///     "due_date": "2026-06-01T00:00:00Z",
///     "student_id": 1,
///     "created_at": "2026-05-01T08:00:00Z",
///     "updated_at": "2026-05-21T10:05:00Z"
///   },
///   "message": "Task reviewed successfully"
/// }
/// ```
///
/// - `400 Bad Request` (validation failure or illegal status transition)
/// - `404 Not Found` → `"Pending submission not found for this task"`
pub async fn review_task(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path((student_id, task_id)): Path<(i64, i64)>,
    Json(req): Json<ReviewTaskRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    match lifecycle::task::review_task(
        app_state.db(),
        claims.sub,
        student_id,
        task_id,
        req.status,
        &req.feedback,
    )
    .await
    {
        Ok(task) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                SupervisedTaskItem::from(task),
                "Task reviewed successfully",
            )),
        )
            .into_response(),
        Err(e) => {
            let (status, message) = lifecycle_error_response(e);
            (status, Json(ApiResponse::<()>::error(message))).into_response()
        }
    }
}

/// POST /supervisors/assign-task
///
/// Assign the same task to every student supervised by the caller. Each
/// student gets their own Pending task, an initial history row and a
/// notification.
///
/// ### Request Body
/// ```json
/// {
///   "task_name": "Prototype demo",
///   "description": "Prepare a ten minute demo of the current prototype",
///   "due_date": "2026-06-15"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created` → the created tasks, message `"Task assigned to all students successfully"`
/// - `400 Bad Request` → validation failure or unparseable due date
/// - `404 Not Found` → `"No students found for this supervisor"`
pub async fn assign_task(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<AssignTaskRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    let Some(due_date) = parse_date(&req.due_date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Invalid due date")),
        )
            .into_response();
    };

    match lifecycle::task::assign_task_to_students(
        app_state.db(),
        claims.sub,
        &req.task_name,
        &req.description,
        due_date,
    )
    .await
    {
        Ok(tasks) => {
            let items: Vec<SupervisedTaskItem> =
                tasks.into_iter().map(SupervisedTaskItem::from).collect();
            (
                StatusCode::CREATED,
                Json(ApiResponse::success(
                    items,
                    "Task assigned to all students successfully",
                )),
            )
                .into_response()
        }
        Err(e) => {
            let (status, message) = lifecycle_error_response(e);
            (status, Json(ApiResponse::<()>::error(message))).into_response()
        }
    }
}

/// POST /supervisors/schedules
///
/// Create a schedule event. Times arrive in 12-hour form and are stored
/// in 24-hour form; the event must start before it ends. The caller's
/// students are notified best-effort after the write.
///
/// ### Request Body
/// ```json
/// {
///   "title": "Project Review Meeting",
///   "start_date": "2026-06-15",
///   "start_time": "09:00",
///   "start_period": "AM",
///   "end_date": "2026-06-15",
///   "end_time": "11:00",
///   "end_period": "AM",
///   "description": "Monthly project review meeting with students",
///   "color": "#3b82f6"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created` → the stored schedule with derived 12-hour display fields
/// - `400 Bad Request` → validation failure, missing period, bad date, or start not before end
pub async fn create_schedule(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateScheduleRequest>,
) -> Response {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(error_message)),
        )
            .into_response();
    }

    let Some(start_period) = req.start_period else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "Start time requires a period (AM or PM)",
            )),
        )
            .into_response();
    };
    let Some(end_period) = req.end_period else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "End time requires a period (AM or PM)",
            )),
        )
            .into_response();
    };

    let Some(start_date) = parse_date(&req.start_date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Invalid start date")),
        )
            .into_response();
    };
    let Some(end_date) = parse_date(&req.end_date) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error("Invalid end date")),
        )
            .into_response();
    };

    let start_time = match to_24_hour(&req.start_time, start_period) {
        Ok(time) => time,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(format!("{}", e))),
            )
                .into_response();
        }
    };
    let end_time = match to_24_hour(&req.end_time, end_period) {
        Ok(time) => time,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(format!("{}", e))),
            )
                .into_response();
        }
    };

    // Times are zero padded, so string order is clock order.
    if (start_date, start_time.as_str()) >= (end_date, end_time.as_str()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<()>::error(
                "Start time must be before end time",
            )),
        )
            .into_response();
    }

    let db = app_state.db();
    let color = req.color.as_deref().unwrap_or(DEFAULT_SCHEDULE_COLOR);

    let schedule = match Schedule::create(
        db,
        claims.sub,
        &req.title,
        start_date,
        &start_time,
        end_date,
        &end_time,
        req.description.as_deref(),
        color,
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

    notify_students_of_schedule(db, claims.sub, &schedule).await;

    match ScheduleResponse::try_from(schedule) {
        Ok(response) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                response,
                "Schedule created successfully",
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

/// Notifies every student of the supervisor about a new schedule entry.
/// Failures are logged and never surface to the caller.
async fn notify_students_of_schedule(
    db: &sea_orm::DatabaseConnection,
    supervisor_id: i64,
    schedule: &db::models::schedule::Model,
) {
    let students = match Student::get_by_supervisor(db, supervisor_id).await {
        Ok(students) => students,
        Err(e) => {
            warn!("Failed to load students for schedule notification: {}", e);
            return;
        }
    };

    let message = format!(
        "\"{}\" starts {}",
        schedule.title,
        schedule.start_date.format("%Y-%m-%d")
    );
    for student in students {
        if let Err(e) = notification::Model::create(
            db,
            student.id,
            notification::UserKind::Student,
            notification::NotificationKind::ScheduleCreated,
            "New Schedule",
            &message,
            Some(schedule.id),
            Some("schedule"),
        )
        .await
        {
            warn!("Failed to create schedule notification: {}", e);
        }
    }
}
