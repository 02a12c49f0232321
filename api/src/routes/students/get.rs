//! Student read endpoints.
//!
//! Task lists, the dashboard aggregate, the project view, the completed
//! project gallery, notifications and the read-only schedule feed. All
//! queries are scoped to the student id carried in the bearer token.

use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::lifecycle::project::completion_percentage;
use db::metrics::{self, MonthlyTaskCounts, TaskStatusCounts};
use db::models::{
    notification,
    project::Model as Project,
    schedule::Model as Schedule,
    student::Model as Student,
    supervisor::Model as Supervisor,
    task::{self, Model as Task, TaskStatus},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use util::state::AppState;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{
    NotificationResponse, ScheduleResponse, UnreadCountResponse, gallery_projects,
};

/// A task row in the status-filtered lists, most recently updated first.
#[derive(Debug, Serialize)]
pub struct TaskListItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: String,
    pub updated_at: String,
}

impl From<Task> for TaskListItem {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            due_date: t.due_date.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

/// A task row in the full overview list, newest assignment first.
#[derive(Debug, Serialize)]
pub struct TaskOverviewItem {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub description: String,
    pub created_at: String,
    pub due_date: String,
}

impl From<Task> for TaskOverviewItem {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            status: t.status,
            description: t.description,
            created_at: t.created_at.to_rfc3339(),
            due_date: t.due_date.to_rfc3339(),
        }
    }
}

/// One of the six most recently touched tasks on the dashboard.
#[derive(Debug, Serialize)]
pub struct TaskSummaryItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub updated_at: String,
}

impl From<Task> for TaskSummaryItem {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StudentDashboard {
    pub tasks_status: TaskStatusCounts,
    pub task_summary: Vec<TaskSummaryItem>,
    pub tasks_metrics: Vec<MonthlyTaskCounts>,
    pub tasks: Vec<TaskOverviewItem>,
}

/// One task in the project view history, most recently updated first.
#[derive(Debug, Serialize)]
pub struct ProjectTaskHistoryItem {
    pub title: String,
    pub description: String,
    pub completed_date: Option<String>,
    pub status: TaskStatus,
}

#[derive(Debug, Serialize)]
pub struct ProjectViewResponse {
    pub student_name: String,
    pub matric_number: String,
    pub email: String,
    pub project_title: String,
    pub project_description: String,
    pub supervisor: Option<String>,
    pub project_status: db::models::project::ProjectStatus,
    pub completion_percentage: i32,
    pub task_history: Vec<ProjectTaskHistoryItem>,
}

/// Shared body of the four status-filtered task lists. An empty result
/// is a 404 with a status-specific message, matching the task feed
/// clients that treat "nothing here" as a distinct state.
async fn tasks_in_status(
    db: &DatabaseConnection,
    student_id: i64,
    status: TaskStatus,
    success_message: &str,
    empty_message: &str,
) -> Response {
    match Task::get_by_student_and_status(db, student_id, status).await {
        Ok(tasks) if tasks.is_empty() => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<Vec<TaskListItem>>::error(empty_message)),
        )
            .into_response(),
        Ok(tasks) => {
            let items: Vec<TaskListItem> = tasks.into_iter().map(TaskListItem::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(items, success_message)),
            )
                .into_response()
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<TaskListItem>>::error(format!(
                "Database error: {}",
                e
            ))),
        )
            .into_response(),
    }
}

/// GET /students/tasks
///
/// Every task ever assigned to the caller, newest assignment first.
/// Unlike the status-filtered lists this endpoint returns an empty list
/// rather than a 404 when the student has no tasks yet.
pub async fn get_all_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    let db = app_state.db();

    match task::Entity::find()
        .filter(task::Column::StudentId.eq(claims.sub))
        .order_by_desc(task::Column::CreatedAt)
        .all(db)
        .await
    {
        Ok(tasks) => {
            let items: Vec<TaskOverviewItem> =
                tasks.into_iter().map(TaskOverviewItem::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(items, "Tasks retrieved successfully")),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<TaskOverviewItem>>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// GET /students/tasks/pending
pub async fn get_pending_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    tasks_in_status(
        app_state.db(),
        claims.sub,
        TaskStatus::Pending,
        "Pending tasks retrieved successfully",
        "No pending tasks found for this student",
    )
    .await
}

/// GET /students/tasks/completed
pub async fn get_completed_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    tasks_in_status(
        app_state.db(),
        claims.sub,
        TaskStatus::Completed,
        "Completed tasks retrieved successfully",
        "No completed tasks found for this student",
    )
    .await
}

/// GET /students/tasks/rejected
pub async fn get_rejected_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    tasks_in_status(
        app_state.db(),
        claims.sub,
        TaskStatus::Rejected,
        "Rejected tasks retrieved successfully",
        "No rejected tasks found for this student",
    )
    .await
}

/// GET /students/tasks/under-review
pub async fn get_under_review_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    tasks_in_status(
        app_state.db(),
        claims.sub,
        TaskStatus::UnderReview,
        "Under review tasks retrieved successfully",
        "No tasks under review found for this student",
    )
    .await
}

/// GET /students/dashboard-stats
///
/// The student dashboard aggregate: a snapshot of current task status
/// counts, the six most recently touched tasks, the six-month monthly
/// status-change series and the full task list.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "tasks_status": { "pending": 2, "under_review": 1, "completed": 3, "rejected": 0 },
///     "task_summary": [
///       { "id": 4, "title": "Literature review", "description": "...", "status": "Under Review", "updated_at": "2026-05-20T09:12:00Z" }
///     ],
///     "tasks_metrics": [
///       { "month": "March 2026", "counts": { "pending": 1, "under_review": 0, "completed": 0, "rejected": 0 } }
///     ],
///     "tasks": [
///       { "id": 4, "title": "Literature review", "status": "Under Review", "description": "...", "created_at": "2026-05-01T08:00:00Z", "due_date": "2026-06-01T00:00:00Z" }
///     ]
///   },
///   "message": "Dashboard stats retrieved successfully"
/// }
/// ```
pub async fn get_dashboard_stats(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let db = app_state.db();

    let tasks_status = match metrics::task_status_counts_for_student(db, claims.sub).await {
        Ok(counts) => counts,
        Err(e) => return dashboard_db_error(e),
    };

    let task_summary = match task::Entity::find()
        .filter(task::Column::StudentId.eq(claims.sub))
        .order_by_desc(task::Column::UpdatedAt)
        .limit(6)
        .all(db)
        .await
    {
        Ok(rows) => rows.into_iter().map(TaskSummaryItem::from).collect(),
        Err(e) => return dashboard_db_error(e),
    };

    let tasks_metrics = match metrics::task_series_for_student(db, claims.sub).await {
        Ok(series) => series,
        Err(e) => return dashboard_db_error(e),
    };

    let tasks = match task::Entity::find()
        .filter(task::Column::StudentId.eq(claims.sub))
        .order_by_desc(task::Column::CreatedAt)
        .all(db)
        .await
    {
        Ok(rows) => rows.into_iter().map(TaskOverviewItem::from).collect(),
        Err(e) => return dashboard_db_error(e),
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            StudentDashboard {
                tasks_status,
                task_summary,
                tasks_metrics,
                tasks,
            },
            "Dashboard stats retrieved successfully",
        )),
    )
        .into_response()
}

fn dashboard_db_error(e: sea_orm::DbErr) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
    )
        .into_response()
}

/// GET /students/project
///
/// The caller's project view: project metadata, the supervisor's name,
/// the live completion percentage and the task history.
///
/// ### Responses
/// - `200 OK` → project view payload
/// - `404 Not Found` → `"Project not found for this student"`
pub async fn get_project(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let db = app_state.db();

    let student = match Student::get_by_id(db, claims.sub).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Project not found for this student")),
            )
                .into_response();
        }
        Err(e) => return dashboard_db_error(e),
    };

    let project = match Project::get_by_student(db, claims.sub).await {
        Ok(Some(project)) => project,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Project not found for this student")),
            )
                .into_response();
        }
        Err(e) => return dashboard_db_error(e),
    };

    let supervisor = match Supervisor::get_by_id(db, project.supervisor_id).await {
        Ok(found) => found.map(|s| s.full_name()),
        Err(e) => return dashboard_db_error(e),
    };

    let tasks = match Task::get_by_student(db, claims.sub).await {
        Ok(tasks) => tasks,
        Err(e) => return dashboard_db_error(e),
    };

    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    let completion = completion_percentage(completed, tasks.len());

    let task_history = tasks
        .into_iter()
        .map(|t| ProjectTaskHistoryItem {
            completed_date: (t.status == TaskStatus::Completed)
                .then(|| t.updated_at.to_rfc3339()),
            title: t.title,
            description: t.description,
            status: t.status,
        })
        .collect();

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            ProjectViewResponse {
                student_name: student.full_name(),
                matric_number: student.matric_number,
                email: student.email,
                project_title: project.title,
                project_description: project.description,
                supervisor,
                project_status: project.status,
                completion_percentage: completion,
                task_history,
            },
            "Project retrieved successfully",
        )),
    )
        .into_response()
}

/// GET /students/all-projects
///
/// The gallery of completed projects across the whole cohort.
pub async fn get_all_projects(State(app_state): State<AppState>) -> impl IntoResponse {
    match gallery_projects(app_state.db()).await {
        Ok(projects) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                projects,
                "Projects retrieved successfully",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(
                ApiResponse::<Vec<crate::routes::common::GalleryProject>>::error(format!(
                    "Database error: {}",
                    e
                )),
            ),
        ),
    }
}

/// GET /students/notifications
pub async fn get_notifications(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match notification::Model::list_for_user(
        app_state.db(),
        claims.sub,
        notification::UserKind::Student,
    )
    .await
    {
        Ok(rows) => {
            let items: Vec<NotificationResponse> =
                rows.into_iter().map(NotificationResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(
                    items,
                    "Notifications retrieved successfully",
                )),
            )
        }
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<Vec<NotificationResponse>>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// GET /students/notifications/unread-count
pub async fn get_unread_count(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match notification::Model::unread_count(
        app_state.db(),
        claims.sub,
        notification::UserKind::Student,
    )
    .await
    {
        Ok(count) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                UnreadCountResponse {
                    unread_count: count,
                },
                "Unread count retrieved successfully",
            )),
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::<UnreadCountResponse>::error(format!(
                "Database error: {}",
                e
            ))),
        ),
    }
}

/// GET /students/schedules
///
/// The caller's supervisor's schedule feed, read-only. Students without
/// an assigned supervisor get an empty list.
pub async fn get_schedules(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let db = app_state.db();

    let student = match Student::get_by_id(db, claims.sub).await {
        Ok(Some(student)) => student,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error("Student not found")),
            )
                .into_response();
        }
        Err(e) => return dashboard_db_error(e),
    };

    let Some(supervisor_id) = student.supervisor_id else {
        return (
            StatusCode::OK,
            Json(ApiResponse::success(
                Vec::<ScheduleResponse>::new(),
                "Schedules retrieved successfully",
            )),
        )
            .into_response();
    };

    let rows = match Schedule::get_by_supervisor(db, supervisor_id).await {
        Ok(rows) => rows,
        Err(e) => return dashboard_db_error(e),
    };

    match rows
        .into_iter()
        .map(ScheduleResponse::try_from)
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(schedules) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                schedules,
                "Schedules retrieved successfully",
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
