//! # auth Routes Module
//!
//! This module defines and wires up routes for the `/auth` endpoint group.
//!
//! ## Structure
//! - `post.rs` — POST handlers (login, refresh, logout) for each role
//!
//! ## Usage
//! The `auth_routes()` function returns a `Router` which is nested under `/auth`
//! in the main application. All endpoints in this group are public; the refresh
//! and logout endpoints authenticate through the opaque refresh token itself.

pub mod post;

use axum::{Router, routing::post};
use util::state::AppState;

use post::{
    admin_login, admin_logout, admin_refresh, student_login, student_logout, student_refresh,
    supervisor_login, supervisor_logout, supervisor_refresh,
};

/// Builds the `/auth` route group, mapping HTTP methods to handlers.
///
/// - `POST /auth/student/login` → `student_login`
/// - `POST /auth/student/refresh` → `student_refresh`
/// - `POST /auth/student/logout` → `student_logout`
/// - `POST /auth/supervisor/login` → `supervisor_login`
/// - `POST /auth/supervisor/refresh` → `supervisor_refresh`
/// - `POST /auth/supervisor/logout` → `supervisor_logout`
/// - `POST /auth/admin/login` → `admin_login`
/// - `POST /auth/admin/refresh` → `admin_refresh`
/// - `POST /auth/admin/logout` → `admin_logout`
///
/// # Returns
/// A configured `Router` instance to be nested in the main app.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/student/login", post(student_login))
        .route("/student/refresh", post(student_refresh))
        .route("/student/logout", post(student_logout))
        .route("/supervisor/login", post(supervisor_login))
        .route("/supervisor/refresh", post(supervisor_refresh))
        .route("/supervisor/logout", post(supervisor_logout))
        .route("/admin/login", post(admin_login))
        .route("/admin/refresh", post(admin_refresh))
        .route("/admin/logout", post(admin_logout))
}
