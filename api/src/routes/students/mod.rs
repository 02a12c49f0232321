//! # students Routes Module
//!
//! This module defines and wires up routes for the `/students` endpoint group.
//! Every route in the group runs behind the student guard; handlers read the
//! caller's id out of the bearer token, so no student id ever appears in a path.
//!
//! ## Structure
//! - `get.rs` — GET handlers (task lists, dashboard, project view, gallery, notifications, schedules)
//! - `post.rs` — POST handlers (task submission, final project hand-in)
//! - `patch.rs` — PATCH handlers (mark notification read)

pub mod get;
pub mod patch;
pub mod post;

use axum::{
    Router,
    routing::{get, patch, post},
};
use util::state::AppState;

use get::{
    get_all_projects, get_all_tasks, get_completed_tasks, get_dashboard_stats, get_notifications,
    get_pending_tasks, get_project, get_rejected_tasks, get_schedules, get_under_review_tasks,
    get_unread_count,
};
use patch::mark_notification_read;
use post::{submit_project, submit_task};

/// Builds the `/students` route group, mapping HTTP methods to handlers.
///
/// - `GET /students/tasks` → `get_all_tasks`
/// - `GET /students/tasks/pending` → `get_pending_tasks`
/// - `GET /students/tasks/completed` → `get_completed_tasks`
/// - `GET /students/tasks/rejected` → `get_rejected_tasks`
/// - `GET /students/tasks/under-review` → `get_under_review_tasks`
/// - `POST /students/tasks/{task_id}/submit` → `submit_task`
/// - `GET /students/dashboard-stats` → `get_dashboard_stats`
/// - `GET /students/project` → `get_project`
/// - `POST /students/submit-project` → `submit_project`
/// - `GET /students/all-projects` → `get_all_projects`
/// - `GET /students/notifications` → `get_notifications`
/// - `PATCH /students/notifications/{id}/read` → `mark_notification_read`
/// - `GET /students/notifications/unread-count` → `get_unread_count`
/// - `GET /students/schedules` → `get_schedules`
///
/// # Returns
/// A configured `Router` instance to be nested in the main app.
pub fn student_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(get_all_tasks))
        .route("/tasks/pending", get(get_pending_tasks))
        .route("/tasks/completed", get(get_completed_tasks))
        .route("/tasks/rejected", get(get_rejected_tasks))
        .route("/tasks/under-review", get(get_under_review_tasks))
        .route("/tasks/{task_id}/submit", post(submit_task))
        .route("/dashboard-stats", get(get_dashboard_stats))
        .route("/project", get(get_project))
        .route("/submit-project", post(submit_project))
        .route("/all-projects", get(get_all_projects))
        .route("/notifications", get(get_notifications))
        .route("/notifications/unread-count", get(get_unread_count))
        .route("/notifications/{id}/read", patch(mark_notification_read))
        .route("/schedules", get(get_schedules))
}
