//! Supervisor read endpoints.
//!
//! Student listings with project and task history, single-task drill-down
//! with submissions, the dashboard aggregate over both metric families,
//! the gallery, notifications and schedules.

use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use db::metrics::{
    self, MonthlyProjectCounts, MonthlyTaskCounts, ProjectStatusCounts, TaskStatusCounts,
};
use db::models::{
    notification,
    project::{self, Model as Project},
    schedule::Model as Schedule,
    student::Model as Student,
    task::{self, Model as Task, TaskStatus},
    task_submission::Model as TaskSubmission,
};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect};
use serde::Serialize;
use util::state::AppState;

use crate::auth::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::{
    NotificationResponse, ScheduleResponse, StudentSummary, SubmissionResponse,
    UnreadCountResponse, gallery_projects,
};
use crate::routes::supervisors::common::SupervisedTaskItem;

/// A project as embedded in supervisor student listings.
#[derive(Debug, Serialize)]
pub struct ProjectDetail {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: project::ProjectStatus,
    pub start_date: String,
    pub final_project_link: Option<String>,
    pub progress: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Project> for ProjectDetail {
    fn from(p: Project) -> Self {
        Self {
            id: p.id,
            title: p.title,
            description: p.description,
            status: p.status,
            start_date: p.start_date.to_rfc3339(),
            final_project_link: p.final_project_link,
            progress: p.progress,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
        }
    }
}

/// One task in a student's history as shown to their supervisor.
#[derive(Debug, Serialize)]
pub struct StudentTaskHistoryItem {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub created_at: String,
    pub updated_at: String,
}

/// One supervised student with their project and full task history.
#[derive(Debug, Serialize)]
pub struct SupervisedStudent {
    pub id: i64,
    pub student_name: String,
    pub matric_number: String,
    pub email: String,
    pub project: Option<ProjectDetail>,
    pub task_history: Vec<StudentTaskHistoryItem>,
}

/// A task with every submission made against it.
#[derive(Debug, Serialize)]
pub struct TaskWithSubmissions {
    pub task: SupervisedTaskItem,
    pub submissions: Vec<SubmissionResponse>,
}

/// An assigned task decorated with its student.
#[derive(Debug, Serialize)]
pub struct AssignedTaskItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: String,
    pub student: Option<StudentSummary>,
    pub created_at: String,
    pub updated_at: String,
}

/// One of the six most recently touched tasks on the supervisor dashboard.
#[derive(Debug, Serialize)]
pub struct SupervisorTaskSummaryItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub student_id: i64,
    pub updated_at: String,
}

#[derive(Debug, Serialize)]
pub struct SupervisorDashboard {
    pub tasks_status: TaskStatusCounts,
    pub projects_status: ProjectStatusCounts,
    pub tasks_metrics: Vec<MonthlyTaskCounts>,
    pub projects_metrics: Vec<MonthlyProjectCounts>,
    pub task_summary: Vec<SupervisorTaskSummaryItem>,
}

fn db_error(e: sea_orm::DbErr) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ApiResponse::<()>::error(format!("Database error: {}", e))),
    )
        .into_response()
}

/// Builds one student entry with its project and task history.
async fn supervised_student(
    db: &sea_orm::DatabaseConnection,
    student: Student,
    project: Option<Project>,
) -> Result<SupervisedStudent, sea_orm::DbErr> {
    let tasks = Task::get_by_student(db, student.id).await?;
    let task_history = tasks
        .into_iter()
        .map(|t| StudentTaskHistoryItem {
            title: t.title,
            description: t.description,
            status: t.status,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        })
        .collect();

    Ok(SupervisedStudent {
        id: student.id,
        student_name: student.full_name(),
        matric_number: student.matric_number,
        email: student.email,
        project: project.map(ProjectDetail::from),
        task_history,
    })
}

/// GET /supervisors/students
///
/// Every student supervised by the caller, each with their project and
/// full task history.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": [
///     {
///       "id": 1,
///       "student_name": "Thabo Nkosi",
///       "matric_number": "u20000001",
///       "email": "thabo@uni.ac.za",
///       "project": { "id": 1, "title": "Smart Campus", "status": "In Progress", "progress": 40 },
///       "task_history": [
///         { "title": "Literature review", "description": "...", "status": "Completed", "created_at": "...", "updated_at": "..." }
///       ]
///     }
///   ],
///   "message": "Students retrieved successfully"
/// }
/// ```
pub async fn get_students(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let db = app_state.db();

    let students = match Student::get_by_supervisor(db, claims.sub).await {
        Ok(students) => students,
        Err(e) => return db_error(e),
    };
    let projects = match Project::get_by_supervisor(db, claims.sub).await {
        Ok(projects) => projects,
        Err(e) => return db_error(e),
    };

    let mut by_student: HashMap<i64, Project> =
        projects.into_iter().map(|p| (p.student_id, p)).collect();

    let mut entries = Vec::with_capacity(students.len());
    for student in students {
        let project = by_student.remove(&student.id);
        match supervised_student(db, student, project).await {
            Ok(entry) => entries.push(entry),
            Err(e) => return db_error(e),
        }
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            entries,
            "Students retrieved successfully",
        )),
    )
        .into_response()
}

/// GET /supervisors/students/{student_id}
///
/// One supervised student with their project and task history. Students
/// of other supervisors are indistinguishable from missing ones.
pub async fn get_student_by_id(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> Response {
    let db = app_state.db();

    let student = match Student::get_by_id(db, student_id).await {
        Ok(Some(student)) if student.supervisor_id == Some(claims.sub) => student,
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error(
                    "Student not found for this supervisor",
                )),
            )
                .into_response();
        }
        Err(e) => return db_error(e),
    };

    let project = match Project::get_by_student(db, student.id).await {
        Ok(project) => project,
        Err(e) => return db_error(e),
    };

    match supervised_student(db, student, project).await {
        Ok(entry) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                entry,
                "Student retrieved successfully",
            )),
        )
            .into_response(),
        Err(e) => db_error(e),
    }
}

/// GET /supervisors/students/{student_id}/tasks
pub async fn get_student_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(student_id): Path<i64>,
) -> Response {
    let db = app_state.db();

    match Student::get_by_id(db, student_id).await {
        Ok(Some(student)) if student.supervisor_id == Some(claims.sub) => {}
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error(
                    "Student not found for this supervisor",
                )),
            )
                .into_response();
        }
        Err(e) => return db_error(e),
    }

    match Task::get_by_student(db, student_id).await {
        Ok(tasks) => {
            let items: Vec<SupervisedTaskItem> =
                tasks.into_iter().map(SupervisedTaskItem::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(items, "Tasks retrieved successfully")),
            )
                .into_response()
        }
        Err(e) => db_error(e),
    }
}

/// GET /supervisors/students/{student_id}/tasks/{task_id}
///
/// A single task with every submission made against it, scoped to the
/// caller and the student in the path.
///
/// ### Responses
/// - `200 OK` → `{ "task": {...}, "submissions": [...] }`
/// - `404 Not Found` → `"Task not found for this supervisor"`
pub async fn get_student_task(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path((student_id, task_id)): Path<(i64, i64)>,
) -> Response {
    let db = app_state.db();

    let task = match Task::get_by_id(db, task_id).await {
        Ok(Some(task)) if task.student_id == student_id && task.supervisor_id == claims.sub => task,
        Ok(_) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<()>::error(
                    "Task not found for this supervisor",
                )),
            )
                .into_response();
        }
        Err(e) => return db_error(e),
    };

    match TaskSubmission::get_by_task(db, task_id).await {
        Ok(submissions) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                TaskWithSubmissions {
                    task: SupervisedTaskItem::from(task),
                    submissions: submissions
                        .into_iter()
                        .map(SubmissionResponse::from)
                        .collect(),
                },
                "Task retrieved successfully",
            )),
        )
            .into_response(),
        Err(e) => db_error(e),
    }
}

/// GET /supervisors/dashboard-stats
///
/// The supervisor dashboard aggregate: current task and project status
/// snapshots across all supervised students, both six-month monthly
/// series and the six most recently touched tasks.
///
/// ### Response
/// - `200 OK`
/// ```json
/// {
///   "success": true,
///   "data": {
///     "tasks_status": { "pending": 4, "under_review": 2, "completed": 9, "rejected": 1 },
///     "projects_status": { "not_started": 1, "in_progress": 2, "completed": 1 },
///     "tasks_metrics": [
///       { "month": "March 2026", "counts": { "pending": 2, "under_review": 1, "completed": 1, "rejected": 0 } }
///     ],
///     "projects_metrics": [
///       { "month": "March 2026", "counts": { "not_started": 1, "in_progress": 1, "completed": 0 } }
///     ],
///     "task_summary": [
///       { "id": 12, "title": "Prototype demo", "description": "...", "status": "Under Review", "student_id": 3, "updated_at": "..." }
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

    let tasks_status = match metrics::task_status_counts_for_supervisor(db, claims.sub).await {
        Ok(counts) => counts,
        Err(e) => return db_error(e),
    };
    let projects_status = match metrics::project_status_counts_for_supervisor(db, claims.sub).await
    {
        Ok(counts) => counts,
        Err(e) => return db_error(e),
    };
    let tasks_metrics = match metrics::task_series_for_supervisor(db, claims.sub).await {
        Ok(series) => series,
        Err(e) => return db_error(e),
    };
    let projects_metrics = match metrics::project_series_for_supervisor(db, claims.sub).await {
        Ok(series) => series,
        Err(e) => return db_error(e),
    };

    let task_summary = match task::Entity::find()
        .filter(task::Column::SupervisorId.eq(claims.sub))
        .order_by_desc(task::Column::UpdatedAt)
        .limit(6)
        .all(db)
        .await
    {
        Ok(rows) => rows
            .into_iter()
            .map(|t| SupervisorTaskSummaryItem {
                id: t.id,
                title: t.title,
                description: t.description,
                status: t.status,
                student_id: t.student_id,
                updated_at: t.updated_at.to_rfc3339(),
            })
            .collect(),
        Err(e) => return db_error(e),
    };

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            SupervisorDashboard {
                tasks_status,
                projects_status,
                tasks_metrics,
                projects_metrics,
                task_summary,
            },
            "Dashboard stats retrieved successfully",
        )),
    )
        .into_response()
}

/// GET /supervisors/all-projects
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

/// GET /supervisors/assigned-tasks
///
/// Every task the caller has ever assigned, newest first, each decorated
/// with its student.
pub async fn get_assigned_tasks(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let db = app_state.db();

    let tasks = match Task::get_by_supervisor(db, claims.sub).await {
        Ok(tasks) => tasks,
        Err(e) => return db_error(e),
    };
    let students = match Student::get_by_supervisor(db, claims.sub).await {
        Ok(students) => students,
        Err(e) => return db_error(e),
    };

    let by_id: HashMap<i64, StudentSummary> = students
        .into_iter()
        .map(|s| (s.id, StudentSummary::from(s)))
        .collect();

    let items: Vec<AssignedTaskItem> = tasks
        .into_iter()
        .map(|t| AssignedTaskItem {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            due_date: t.due_date.to_rfc3339(),
            student: by_id.get(&t.student_id).cloned(),
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        })
        .collect();

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            items,
            "Assigned tasks retrieved successfully",
        )),
    )
        .into_response()
}

/// GET /supervisors/notifications
pub async fn get_notifications(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match notification::Model::list_for_user(
        app_state.db(),
        claims.sub,
        notification::UserKind::Supervisor,
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

/// GET /supervisors/notifications/unread-count
pub async fn get_unread_count(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    match notification::Model::unread_count(
        app_state.db(),
        claims.sub,
        notification::UserKind::Supervisor,
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

/// GET /supervisors/schedules
pub async fn get_schedules(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> Response {
    let rows = match Schedule::get_by_supervisor(app_state.db(), claims.sub).await {
        Ok(rows) => rows,
        Err(e) => return db_error(e),
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

/// GET /supervisors/schedules/{id}
///
/// One schedule by id, only if the caller owns it.
pub async fn get_schedule_by_id(
    State(app_state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(id): Path<i64>,
) -> Response {
    match Schedule::get_owned(app_state.db(), id, claims.sub).await {
        Ok(Some(schedule)) => match ScheduleResponse::try_from(schedule) {
            Ok(response) => (
                StatusCode::OK,
                Json(ApiResponse::success(
                    response,
                    "Schedule retrieved successfully",
                )),
            )
                .into_response(),
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::<()>::error(format!("{}", e))),
            )
                .into_response(),
        },
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(ApiResponse::<()>::error("Schedule not found")),
        )
            .into_response(),
        Err(e) => db_error(e),
    }
}
