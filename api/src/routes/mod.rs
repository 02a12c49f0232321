//! HTTP route entry point for `/api/...`.
//!
//! This module defines all HTTP entry points under the `/api` namespace.
//! Routes are organized by role (students, supervisors, admin) plus the
//! public authentication and health groups, each protected via the
//! appropriate access control middleware.
//!
//! Route groups include:
//! - `/health` → Health check endpoint (public)
//! - `/auth` → Login, token refresh and logout for all three roles (public)
//! - `/students` → Student endpoints (student token required)
//! - `/supervisors` → Supervisor endpoints (supervisor token required)
//! - `/admin` → Account provisioning endpoints (admin token required)

use crate::auth::guards::{allow_admin, allow_student, allow_supervisor};
use crate::routes::{
    admin::admin_routes, auth::auth_routes, health::health_routes, students::student_routes,
    supervisors::supervisor_routes,
};
use axum::{Router, middleware::from_fn};
use util::state::AppState;

pub mod admin;
pub mod auth;
pub mod common;
pub mod health;
pub mod students;
pub mod supervisors;

/// Builds the complete application router for all HTTP endpoints.
///
/// The returned router carries its state and is ready to be nested under
/// `/api` by the caller.
///
/// # Route Structure:
/// - `/health` → Health check endpoint (no authentication required).
/// - `/auth` → Login, token refresh and logout for students, supervisors and admins.
/// - `/students` → Tasks, project hand-in, dashboard, notifications and schedules for the logged in student.
/// - `/supervisors` → Assignment, review, metrics, notifications and schedules for the logged in supervisor.
/// - `/admin` → Student and supervisor provisioning.
pub fn routes(app_state: AppState) -> Router {
    Router::new()
        .nest("/health", health_routes())
        .nest("/auth", auth_routes())
        .nest(
            "/students",
            student_routes().route_layer(from_fn(allow_student)),
        )
        .nest(
            "/supervisors",
            supervisor_routes().route_layer(from_fn(allow_supervisor)),
        )
        .nest("/admin", admin_routes().route_layer(from_fn(allow_admin)))
        .with_state(app_state)
}
