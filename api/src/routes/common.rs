//! Response shapes shared by more than one route group.
//!
//! The notification feed and the completed-project gallery are served to
//! both students and supervisors, so their wire formats live here instead
//! of being duplicated per group.

use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use db::lifecycle::LifecycleError;
use db::models::{notification, project, schedule, student, supervisor, task_submission};
use sea_orm::{DatabaseConnection, DbErr};
use serde::{Deserialize, Serialize};
use util::time_format::{TimeFormat12Hour, TimeFormatError, to_12_hour};

/// Parses a client-supplied date that is either a bare `YYYY-MM-DD` day or
/// a full RFC 3339 timestamp. Bare dates land on midnight UTC; anything
/// else is rejected rather than coerced.
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    Some(Utc.from_utc_datetime(&midnight))
}

/// Maps a lifecycle engine error onto an HTTP status and client message.
///
/// Database failures keep the detailed error text in the body the same way
/// direct handler queries report them.
pub fn lifecycle_error_response(e: LifecycleError) -> (StatusCode, String) {
    match e {
        LifecycleError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
        LifecycleError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),
        LifecycleError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
        LifecycleError::Database(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Database error: {}", e),
        ),
    }
}

/// One row of a user's notification feed.
#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub id: i64,
    pub kind: notification::NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_id: Option<i64>,
    pub related_kind: Option<String>,
    pub created_at: String,
}

impl From<notification::Model> for NotificationResponse {
    fn from(n: notification::Model) -> Self {
        Self {
            id: n.id,
            kind: n.kind,
            title: n.title,
            message: n.message,
            is_read: n.is_read,
            related_id: n.related_id,
            related_kind: n.related_kind,
            created_at: n.created_at.to_rfc3339(),
        }
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UnreadCountResponse {
    pub unread_count: u64,
}

/// A schedule as served to clients: the stored 24-hour times plus the
/// derived 12-hour display form.
#[derive(Debug, Serialize, Deserialize)]
pub struct ScheduleResponse {
    pub id: i64,
    pub title: String,
    pub start_date: String,
    pub start_time: String,
    pub start_time_12: TimeFormat12Hour,
    pub end_date: String,
    pub end_time: String,
    pub end_time_12: TimeFormat12Hour,
    pub description: Option<String>,
    pub color: String,
    pub supervisor_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl TryFrom<schedule::Model> for ScheduleResponse {
    type Error = TimeFormatError;

    fn try_from(s: schedule::Model) -> Result<Self, Self::Error> {
        let start_time_12 = to_12_hour(&s.start_time)?;
        let end_time_12 = to_12_hour(&s.end_time)?;
        Ok(Self {
            id: s.id,
            title: s.title,
            start_date: s.start_date.to_rfc3339(),
            start_time: s.start_time,
            start_time_12,
            end_date: s.end_date.to_rfc3339(),
            end_time: s.end_time,
            end_time_12,
            description: s.description,
            color: s.color,
            supervisor_id: s.supervisor_id,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        })
    }
}

/// Minimal student identity attached to gallery and task listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StudentSummary {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub matric_number: String,
}

impl From<student::Model> for StudentSummary {
    fn from(s: student::Model) -> Self {
        Self {
            id: s.id,
            first_name: s.first_name,
            last_name: s.last_name,
            matric_number: s.matric_number,
        }
    }
}

/// A task submission row as served to clients.
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmissionResponse {
    pub id: i64,
    pub task_id: i64,
    pub student_id: i64,
    pub supervisor_id: i64,
    pub link: String,
    pub short_description: String,
    pub status: task_submission::SubmissionStatus,
    pub feedback: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<task_submission::Model> for SubmissionResponse {
    fn from(s: task_submission::Model) -> Self {
        Self {
            id: s.id,
            task_id: s.task_id,
            student_id: s.student_id,
            supervisor_id: s.supervisor_id,
            link: s.link,
            short_description: s.short_description,
            status: s.status,
            feedback: s.feedback,
            created_at: s.created_at.to_rfc3339(),
            updated_at: s.updated_at.to_rfc3339(),
        }
    }
}

/// One completed project in the public gallery.
#[derive(Debug, Serialize, Deserialize)]
pub struct GalleryProject {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: project::ProjectStatus,
    pub final_project_link: Option<String>,
    pub progress: i32,
    pub student: Option<StudentSummary>,
    pub supervisor_name: Option<String>,
    pub updated_at: String,
}

/// Loads the gallery of completed projects, newest first.
///
/// Only projects that are `Completed` and carry a non-empty final link are
/// included; each entry is decorated with its student and supervisor.
pub async fn gallery_projects(db: &DatabaseConnection) -> Result<Vec<GalleryProject>, DbErr> {
    let mut entries = Vec::new();
    for p in project::Model::completed_with_link(db).await? {
        let gallery_student = student::Model::get_by_id(db, p.student_id)
            .await?
            .map(StudentSummary::from);
        let supervisor_name = supervisor::Model::get_by_id(db, p.supervisor_id)
            .await?
            .map(|s| s.full_name());

        entries.push(GalleryProject {
            id: p.id,
            title: p.title,
            description: p.description,
            status: p.status,
            final_project_link: p.final_project_link,
            progress: p.progress,
            student: gallery_student,
            supervisor_name,
            updated_at: p.updated_at.to_rfc3339(),
        });
    }
    Ok(entries)
}
