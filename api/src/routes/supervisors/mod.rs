//! # supervisors Routes Module
//!
//! This module defines and wires up routes for the `/supervisors` endpoint
//! group. Every route runs behind the supervisor guard; student ids appear
//! in paths but every query is additionally scoped to the caller, so a
//! supervisor can never reach another supervisor's students or schedules.
//!
//! ## Structure
//! - `get.rs` — GET handlers (students, tasks, dashboard, gallery, notifications, schedules)
//! - `post.rs` — POST handlers (bulk task assignment, submission review, schedule creation)
//! - `put.rs` — PUT handlers (direct task edit, schedule update)
//! - `patch.rs` — PATCH handlers (mark notification read)
//! - `delete.rs` — DELETE handlers (schedule removal)

pub mod common;
pub mod delete;
pub mod get;
pub mod patch;
pub mod post;
pub mod put;

use axum::{
    Router,
    routing::{get, patch, post, put},
};
use util::state::AppState;

use delete::delete_schedule;
use get::{
    get_all_projects, get_assigned_tasks, get_dashboard_stats, get_notifications,
    get_schedule_by_id, get_schedules, get_student_by_id, get_student_task, get_student_tasks,
    get_students, get_unread_count,
};
use patch::mark_notification_read;
use post::{assign_task, create_schedule, review_task};
use put::{edit_task, update_schedule};

/// Builds the `/supervisors` route group, mapping HTTP methods to handlers.
///
/// - `GET /supervisors/students` → `get_students`
/// - `GET /supervisors/students/{student_id}` → `get_student_by_id`
/// - `GET /supervisors/students/{student_id}/tasks` → `get_student_tasks`
/// - `GET /supervisors/students/{student_id}/tasks/{task_id}` → `get_student_task`
/// - `POST /supervisors/students/{student_id}/tasks/{task_id}/review` → `review_task`
/// - `GET /supervisors/dashboard-stats` → `get_dashboard_stats`
/// - `POST /supervisors/assign-task` → `assign_task`
/// - `GET /supervisors/all-projects` → `get_all_projects`
/// - `GET /supervisors/assigned-tasks` → `get_assigned_tasks`
/// - `PUT /supervisors/tasks/{task_id}` → `edit_task`
/// - `GET /supervisors/notifications` → `get_notifications`
/// - `PATCH /supervisors/notifications/{id}/read` → `mark_notification_read`
/// - `GET /supervisors/notifications/unread-count` → `get_unread_count`
/// - `POST /supervisors/schedules` → `create_schedule`
/// - `GET /supervisors/schedules` → `get_schedules`
/// - `GET /supervisors/schedules/{id}` → `get_schedule_by_id`
/// - `PUT /supervisors/schedules/{id}` → `update_schedule`
/// - `DELETE /supervisors/schedules/{id}` → `delete_schedule`
///
/// # Returns
/// A configured `Router` instance to be nested in the main app.
pub fn supervisor_routes() -> Router<AppState> {
    Router::new()
        .route("/students", get(get_students))
        .route("/students/{student_id}", get(get_student_by_id))
        .route("/students/{student_id}/tasks", get(get_student_tasks))
        .route(
            "/students/{student_id}/tasks/{task_id}",
            get(get_student_task),
        )
        .route(
            "/students/{student_id}/tasks/{task_id}/review",
            post(review_task),
        )
        .route("/dashboard-stats", get(get_dashboard_stats))
        .route("/assign-task", post(assign_task))
        .route("/all-projects", get(get_all_projects))
        .route("/assigned-tasks", get(get_assigned_tasks))
        .route("/tasks/{task_id}", put(edit_task))
        .route("/notifications", get(get_notifications))
        .route("/notifications/unread-count", get(get_unread_count))
        .route("/notifications/{id}/read", patch(mark_notification_read))
        .route("/schedules", post(create_schedule).get(get_schedules))
        .route(
            "/schedules/{id}",
            get(get_schedule_by_id)
                .put(update_schedule)
                .delete(delete_schedule),
        )
}
