//! # admin Routes Module
//!
//! This module defines and wires up routes for the `/admin` endpoint group.
//! Admins provision accounts: each new student arrives together with their
//! one-to-one project, already attached to a supervisor.
//!
//! ## Structure
//! - `post.rs` — POST handlers (student and supervisor provisioning)

pub mod post;

use axum::{Router, routing::post};
use util::state::AppState;

use post::{create_student, create_supervisor};

/// Builds the `/admin` route group, mapping HTTP methods to handlers.
///
/// - `POST /admin/students` → `create_student`
/// - `POST /admin/supervisors` → `create_supervisor`
///
/// # Returns
/// A configured `Router` instance to be nested in the main app.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/students", post(create_student))
        .route("/supervisors", post(create_supervisor))
}
