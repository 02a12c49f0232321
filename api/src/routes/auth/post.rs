//! Authentication handlers for all three roles.
//!
//! Each role logs in against its own table and its own refresh token store,
//! so a student token can never be refreshed into a supervisor session.
//! Responses follow the standard `ApiResponse` format.

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use common::format_validation_errors;
use db::models::{
    admin::Model as Admin, refresh_token, student::Model as Student,
    supervisor::Model as Supervisor,
};
use serde::{Deserialize, Serialize};
use util::{config, state::AppState};
use validator::Validate;

use crate::auth::{Role, generate_jwt};
use crate::response::ApiResponse;

#[derive(Debug, Deserialize, Validate)]
pub struct StudentLoginRequest {
    #[validate(length(min = 1, message = "Matric number is required"))]
    pub matric_number: String,

    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct SupervisorLoginRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    pub email: String,

    #[validate(length(min = 2, message = "Last name must be at least 2 characters"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct AdminLoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Last name is required"))]
    pub last_name: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshTokenRequest {
    #[validate(length(min = 1, message = "Refresh token is required"))]
    pub token: String,
}

#[derive(Debug, Serialize, Default)]
pub struct StudentLoginResponse {
    pub id: i64,
    pub matric_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, Default)]
pub struct SupervisorLoginResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, Default)]
pub struct AdminLoginResponse {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
    pub expires_at: String,
}

#[derive(Debug, Serialize, Default)]
pub struct TokenResponse {
    pub token: String,
    pub expires_at: String,
}

/// POST /auth/student/login
///
/// Log a student in by matric number. The last name is required by the
/// request contract but identity is resolved on the matric number alone.
///
/// ### Request Body
/// ```json
/// {
///   "matric_number": "u20000001",
///   "last_name": "Nkosi"
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
///     "id": 1,
///     "matric_number": "u20000001",
///     "first_name": "Thabo",
///     "last_name": "Nkosi",
///     "email": "thabo@uni.ac.za",
///     "token": "jwt_token_here",
///     "refresh_token": "opaque_refresh_token_here",
///     "expires_at": "2026-05-23T11:00:00Z"
///   },
///   "message": "Login successful"
/// }
/// ```
///
/// - `400 Bad Request` (validation failure)
/// ```json
/// {
///   "success": false,
///   "message": "Last name must be at least 2 characters"
/// }
/// ```
///
/// - `404 Not Found` (unknown matric number)
/// ```json
/// {
///   "success": false,
///   "message": "User with Matric Number u99999999 not found"
/// }
/// ```
pub async fn student_login(
    State(app_state): State<AppState>,
    Json(req): Json<StudentLoginRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<StudentLoginResponse>::error(error_message)),
        );
    }

    let db = app_state.db();

    match Student::get_by_matric_number(db, &req.matric_number).await {
        Ok(Some(student)) => {
            let (token, expires_at) = generate_jwt(student.id, Role::Student);
            match refresh_token::student::Model::create(
                db,
                student.id,
                config::refresh_token_expiry_days(),
            )
            .await
            {
                Ok(refresh) => (
                    StatusCode::OK,
                    Json(ApiResponse::success(
                        StudentLoginResponse {
                            id: student.id,
                            matric_number: student.matric_number,
                            first_name: student.first_name,
                            last_name: student.last_name,
                            email: student.email,
                            token,
                            refresh_token: refresh.token,
                            expires_at,
                        },
                        "Login successful",
                    )),
                ),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<StudentLoginResponse>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                ),
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<StudentLoginResponse>::error(format!(
                "User with Matric Number {} not found",
                req.matric_number
            ))),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<StudentLoginResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /auth/supervisor/login
///
/// Log a supervisor in by email. Identity is resolved on the email alone.
///
/// ### Responses
/// - `200 OK` → supervisor profile plus `token`, `refresh_token` and `expires_at`
/// - `400 Bad Request` → validation failure
/// - `404 Not Found` → `"User with Email Address {email} not found"`
pub async fn supervisor_login(
    State(app_state): State<AppState>,
    Json(req): Json<SupervisorLoginRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<SupervisorLoginResponse>::error(error_message)),
        );
    }

    let db = app_state.db();

    match Supervisor::get_by_email(db, &req.email).await {
        Ok(Some(supervisor)) => {
            let (token, expires_at) = generate_jwt(supervisor.id, Role::Supervisor);
            match refresh_token::supervisor::Model::create(
                db,
                supervisor.id,
                config::refresh_token_expiry_days(),
            )
            .await
            {
                Ok(refresh) => (
                    StatusCode::OK,
                    Json(ApiResponse::success(
                        SupervisorLoginResponse {
                            id: supervisor.id,
                            first_name: supervisor.first_name,
                            last_name: supervisor.last_name,
                            email: supervisor.email,
                            token,
                            refresh_token: refresh.token,
                            expires_at,
                        },
                        "Login successful",
                    )),
                ),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<SupervisorLoginResponse>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                ),
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<SupervisorLoginResponse>::error(format!(
                "User with Email Address {} not found",
                req.email
            ))),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<SupervisorLoginResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /auth/admin/login
///
/// Log an admin in by email. Identity is resolved on the email alone.
///
/// ### Responses
/// - `200 OK` → admin profile plus `token`, `refresh_token` and `expires_at`
/// - `400 Bad Request` → validation failure
/// - `404 Not Found` → `"User with Email Address {email} not found"`
pub async fn admin_login(
    State(app_state): State<AppState>,
    Json(req): Json<AdminLoginRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<AdminLoginResponse>::error(error_message)),
        );
    }

    let db = app_state.db();

    match Admin::get_by_email(db, &req.email).await {
        Ok(Some(admin)) => {
            let (token, expires_at) = generate_jwt(admin.id, Role::Admin);
            match refresh_token::admin::Model::create(
                db,
                admin.id,
                config::refresh_token_expiry_days(),
            )
            .await
            {
                Ok(refresh) => (
                    StatusCode::OK,
                    Json(ApiResponse::success(
                        AdminLoginResponse {
                            id: admin.id,
                            first_name: admin.first_name,
                            last_name: admin.last_name,
                            email: admin.email,
                            token,
                            refresh_token: refresh.token,
                            expires_at,
                        },
                        "Login successful",
                    )),
                ),
                Err(e) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ApiResponse::<AdminLoginResponse>::error(format!(
                        "Database error: {}",
                        e
                    ))),
                ),
            }
        }
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<AdminLoginResponse>::error(format!(
                "User with Email Address {} not found",
                req.email
            ))),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<AdminLoginResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /auth/student/refresh
///
/// Exchange a valid student refresh token for a fresh access token.
/// Revoked, expired or unknown tokens are all rejected the same way.
///
/// ### Responses
/// - `200 OK` → `{ "token": "...", "expires_at": "..." }`, message `"Token refreshed successfully"`
/// - `401 Unauthorized` → `"Invalid refresh token"`
pub async fn student_refresh(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<TokenResponse>::error(error_message)),
        );
    }

    let db = app_state.db();

    match refresh_token::student::Model::find_valid(db, &req.token).await {
        Ok(Some(record)) => {
            let (token, expires_at) = generate_jwt(record.user_id, Role::Student);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    TokenResponse { token, expires_at },
                    "Token refreshed successfully",
                )),
            )
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<TokenResponse>::error("Invalid refresh token")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<TokenResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /auth/supervisor/refresh
///
/// Supervisor counterpart of [`student_refresh`].
pub async fn supervisor_refresh(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<TokenResponse>::error(error_message)),
        );
    }

    let db = app_state.db();

    match refresh_token::supervisor::Model::find_valid(db, &req.token).await {
        Ok(Some(record)) => {
            let (token, expires_at) = generate_jwt(record.user_id, Role::Supervisor);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    TokenResponse { token, expires_at },
                    "Token refreshed successfully",
                )),
            )
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<TokenResponse>::error("Invalid refresh token")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<TokenResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /auth/admin/refresh
///
/// Admin counterpart of [`student_refresh`].
pub async fn admin_refresh(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    if let Err(validation_errors) = req.validate() {
        let error_message = format_validation_errors(&validation_errors);
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<TokenResponse>::error(error_message)),
        );
    }

    let db = app_state.db();

    match refresh_token::admin::Model::find_valid(db, &req.token).await {
        Ok(Some(record)) => {
            let (token, expires_at) = generate_jwt(record.user_id, Role::Admin);
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    TokenResponse { token, expires_at },
                    "Token refreshed successfully",
                )),
            )
        }
        Ok(None) => (
            StatusCode::UNAUTHORIZED,
            Json(ApiResponse::<TokenResponse>::error("Invalid refresh token")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<TokenResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// POST /auth/student/logout
///
/// Revoke a student refresh token. Always succeeds, even for tokens that
/// were never issued, so clients can log out idempotently.
pub async fn student_logout(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    match refresh_token::student::Model::revoke(db, &req.token).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Logged out successfully")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
        ),
    }
}

/// POST /auth/supervisor/logout
///
/// Supervisor counterpart of [`student_logout`].
pub async fn supervisor_logout(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    match refresh_token::supervisor::Model::revoke(db, &req.token).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Logged out successfully")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
        ),
    }
}

/// POST /auth/admin/logout
///
/// Admin counterpart of [`student_logout`].
pub async fn admin_logout(
    State(app_state): State<AppState>,
    Json(req): Json<RefreshTokenRequest>,
) -> impl IntoResponse {
    let db = app_state.db();

    match refresh_token::admin::Model::revoke(db, &req.token).await {
        Ok(_) => (
            StatusCode::OK,
            Json(ApiResponse::success((), "Logged out successfully")),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
        ),
    }
}
