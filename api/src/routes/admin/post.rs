//! Admin provisioning endpoints.
//!
//! A student and their project are created together, so the project
//! lifecycle starts with a `Not Started` history row the moment the
//! account exists. Welcome notifications are best-effort after the writes.

use axum::{Json, extract::State, http::StatusCode, response::{IntoResponse, Response}};
use common::format_validation_errors;
use db::lifecycle;
use db::models::project::ProjectStatus;
use db::models::{
    notification, student::Model as Student, supervisor::Model as Supervisor,
};
use serde::{Deserialize, Serialize};
use tracing::warn;
use util::state::AppState;
use validator::Validate;

use crate::response::ApiResponse;
use crate::routes::common::lifecycle_error_response;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateStudentRequest {
    #[validate(length(min = 1, message = "Matric number is required"))]
    pub matric_number: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub supervisor_id: i64,

    #[validate(length(min = 1, message = "Project title is required"))]
    pub project_title: String,

    #[validate(length(min = 1, message = "Project description is required"))]
    pub project_description: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSupervisorRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "First name is required"))]
    pub first_name: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct CreatedStudentResponse {
    pub id: i64,
    pub matric_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub supervisor_id: Option<i64>,
    pub project_id: i64,
    pub project_title: String,
    pub project_status: ProjectStatus,
}

#[derive(Debug, Serialize)]
pub struct CreatedSupervisorResponse {
    pub id: i64,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

/// POST /admin/students
///
/// Provision a student under an existing supervisor, together with their
/// one-to-one project. The project starts at `Not Started` with its
/// opening history row; the student and the supervisor are both notified.
///
/// ### Request Body
/// ```json
/// {
///   "matric_number": "u20000001",
///   "first_name": "Thabo",
///   "last_name": "Nkosi",
///   "email": "thabo.nkosi@uni.ac.za",
///   "supervisor_id": 1,
///   "project_title": "Smart irrigation controller",
///   "project_description": "Low-power controller for drip irrigation"
/// }
/// ```
///
/// ### Responses
///
/// - `201 Created` → the student with their project summary
/// - `400 Bad Request` → validation failure or duplicate matric number
/// - `404 Not Found` → `"Supervisor not found"`
pub async fn create_student(
    State(app_state): State<AppState>,
    Json(req): Json<CreateStudentRequest>,
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

    let supervisor = match Supervisor::get_by_id(db, req.supervisor_id).await {
        Ok(Some(supervisor)) => supervisor,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Supervisor not found")),
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

    match Student::get_by_matric_number(db, &req.matric_number).await {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    "A student with this matric number already exists",
                )),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    }

    let student = match Student::create(
        db,
        &req.matric_number,
        &req.first_name,
        &req.last_name,
        &req.email,
        Some(supervisor.id),
    )
    .await
    {
        Ok(student) => student,
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    };

    let project = match lifecycle::project::create_for_student(
        db,
        student.id,
        supervisor.id,
        &req.project_title,
        &req.project_description,
    )
    .await
    {
        Ok(project) => project,
        Err(e) => {
            let (status, message) = lifecycle_error_response(e);
            return (status, Json(ApiResponse::<()>::error(message))).into_response();
        }
    };

    if let Err(e) = notification::Model::create(
        db,
        student.id,
        notification::UserKind::Student,
        notification::NotificationKind::StudentCreated,
        "Welcome",
        &format!(
            "Your project \"{}\" is set up under {}",
            project.title,
            supervisor.full_name()
        ),
        Some(project.id),
        Some("project"),
    )
    .await
    {
        warn!("Failed to send welcome notification: {}", e);
    }
    if let Err(e) = notification::Model::create(
        db,
        supervisor.id,
        notification::UserKind::Supervisor,
        notification::NotificationKind::SupervisorAssigned,
        "New Student Assigned",
        &format!("{} has been assigned to you", student.full_name()),
        Some(student.id),
        Some("student"),
    )
    .await
    {
        warn!("Failed to send assignment notification: {}", e);
    }

    (
        StatusCode::CREATED,
        Json(ApiResponse::success(
            CreatedStudentResponse {
                id: student.id,
                matric_number: student.matric_number,
                first_name: student.first_name,
                last_name: student.last_name,
                email: student.email,
                supervisor_id: student.supervisor_id,
                project_id: project.id,
                project_title: project.title,
                project_status: project.status,
            },
            "Student created successfully",
        )),
    )
        .into_response()
}

/// POST /admin/supervisors
///
/// Provision a supervisor account.
///
/// ### Responses
///
/// - `201 Created` → the new supervisor, message `"Supervisor created successfully"`
/// - `400 Bad Request` → validation failure or duplicate email
pub async fn create_supervisor(
    State(app_state): State<AppState>,
    Json(req): Json<CreateSupervisorRequest>,
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

    match Supervisor::get_by_email(db, &req.email).await {
        Ok(Some(_)) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<()>::error(
                    "A supervisor with this email already exists",
                )),
            )
                .into_response();
        }
        Ok(None) => {}
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
            )
                .into_response();
        }
    }

    match Supervisor::create(db, &req.email, &req.first_name, &req.last_name).await {
        Ok(supervisor) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                CreatedSupervisorResponse {
                    id: supervisor.id,
                    email: supervisor.email,
                    first_name: supervisor.first_name,
                    last_name: supervisor.last_name,
                },
                "Supervisor created successfully",
            )),
        )
            .into_response(),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
        )
            .into_response(),
    }
}
