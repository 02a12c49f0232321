//! Request/response pieces shared by the supervisor verb handlers.

use db::models::task::{Model as Task, TaskStatus};
use serde::Serialize;

lazy_static::lazy_static! {
    pub static ref TIME_12_HOUR_REGEX: regex::Regex =
        regex::Regex::new("^(0?[1-9]|1[0-2]):[0-5][0-9]$").unwrap();
    pub static ref HEX_COLOR_REGEX: regex::Regex =
        regex::Regex::new("^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").unwrap();
}

/// A full task row as served to supervisors.
#[derive(Debug, Serialize)]
pub struct SupervisedTaskItem {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub due_date: String,
    pub student_id: i64,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Task> for SupervisedTaskItem {
    fn from(t: Task) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            due_date: t.due_date.to_rfc3339(),
            student_id: t.student_id,
            created_at: t.created_at.to_rfc3339(),
            updated_at: t.updated_at.to_rfc3339(),
        }
    }
}
