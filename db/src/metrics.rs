//! Read-side aggregation for the dashboards.
//!
//! Two kinds of figures come out of here. Snapshots group the *current*
//! `tasks` and `projects` rows by status. Series walk the append-only
//! history tables instead, bucketing rows by calendar month so a task that
//! passed through three statuses counts once in each, and always answer
//! with exactly six months, oldest first, zero-filled.

use chrono::{DateTime, Datelike, Months, TimeZone, Utc};
use sea_orm::prelude::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType, QueryFilter, QuerySelect,
    RelationTrait,
};
use serde::Serialize;

use crate::models::project::{self, ProjectStatus};
use crate::models::project_status_update;
use crate::models::task::{self, TaskStatus};
use crate::models::task_status_update;

const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Totals per task status. Every field is present even when zero.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TaskStatusCounts {
    pub pending: i64,
    pub under_review: i64,
    pub completed: i64,
    pub rejected: i64,
}

/// Totals per project status. Every field is present even when zero.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectStatusCounts {
    pub not_started: i64,
    pub in_progress: i64,
    pub completed: i64,
}

/// One month of task history counts, labeled "MonthName Year".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyTaskCounts {
    pub month: String,
    pub counts: TaskStatusCounts,
}

/// One month of project history counts, labeled "MonthName Year".
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyProjectCounts {
    pub month: String,
    pub counts: ProjectStatusCounts,
}

/// "August 2026" style label for a date's month.
fn month_label(date: DateTime<Utc>) -> String {
    format!("{} {}", MONTH_NAMES[date.month0() as usize], date.year())
}

/// Midnight on the first day of the month six calendar months before `today`.
///
/// This is the SQL-side cutoff for series queries. It sits one month wider
/// than the six labeled months, so rows from the partially covered seventh
/// month can pass the filter; the fold drops them because their bucket never
/// matches a label.
fn month_window_start(today: DateTime<Utc>) -> DateTime<Utc> {
    let shifted = today - Months::new(6);
    Utc.with_ymd_and_hms(shifted.year(), shifted.month(), 1, 0, 0, 0)
        .unwrap()
}

/// The six bucket keys and display labels ending at `today`'s month,
/// oldest first. Keys use the same `YYYY-MM` shape strftime produces.
fn last_six_month_keys(today: DateTime<Utc>) -> Vec<(String, String)> {
    (0..6)
        .rev()
        .map(|i| {
            let m = today - Months::new(i);
            (format!("{:04}-{:02}", m.year(), m.month()), month_label(m))
        })
        .collect()
}

fn fold_task_counts(rows: Vec<(TaskStatus, i64)>) -> TaskStatusCounts {
    let mut counts = TaskStatusCounts::default();
    for (status, n) in rows {
        match status {
            TaskStatus::Pending => counts.pending = n,
            TaskStatus::UnderReview => counts.under_review = n,
            TaskStatus::Completed => counts.completed = n,
            TaskStatus::Rejected => counts.rejected = n,
        }
    }
    counts
}

fn fold_project_counts(rows: Vec<(ProjectStatus, i64)>) -> ProjectStatusCounts {
    let mut counts = ProjectStatusCounts::default();
    for (status, n) in rows {
        match status {
            ProjectStatus::NotStarted => counts.not_started = n,
            ProjectStatus::InProgress => counts.in_progress = n,
            ProjectStatus::Completed => counts.completed = n,
        }
    }
    counts
}

fn fold_task_series(
    rows: Vec<(String, TaskStatus, i64)>,
    today: DateTime<Utc>,
) -> Vec<MonthlyTaskCounts> {
    let keys = last_six_month_keys(today);
    let mut series: Vec<MonthlyTaskCounts> = keys
        .iter()
        .map(|(_, label)| MonthlyTaskCounts {
            month: label.clone(),
            counts: TaskStatusCounts::default(),
        })
        .collect();
    for (bucket, status, n) in rows {
        if let Some(pos) = keys.iter().position(|(key, _)| *key == bucket) {
            let counts = &mut series[pos].counts;
            match status {
                TaskStatus::Pending => counts.pending += n,
                TaskStatus::UnderReview => counts.under_review += n,
                TaskStatus::Completed => counts.completed += n,
                TaskStatus::Rejected => counts.rejected += n,
            }
        }
    }
    series
}

fn fold_project_series(
    rows: Vec<(String, ProjectStatus, i64)>,
    today: DateTime<Utc>,
) -> Vec<MonthlyProjectCounts> {
    let keys = last_six_month_keys(today);
    let mut series: Vec<MonthlyProjectCounts> = keys
        .iter()
        .map(|(_, label)| MonthlyProjectCounts {
            month: label.clone(),
            counts: ProjectStatusCounts::default(),
        })
        .collect();
    for (bucket, status, n) in rows {
        if let Some(pos) = keys.iter().position(|(key, _)| *key == bucket) {
            let counts = &mut series[pos].counts;
            match status {
                ProjectStatus::NotStarted => counts.not_started += n,
                ProjectStatus::InProgress => counts.in_progress += n,
                ProjectStatus::Completed => counts.completed += n,
            }
        }
    }
    series
}

/// Current task totals for one student.
pub async fn task_status_counts_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<TaskStatusCounts, DbErr> {
    let rows: Vec<(TaskStatus, i64)> = task::Entity::find()
        .select_only()
        .column(task::Column::Status)
        .column_as(task::Column::Id.count(), "count")
        .filter(task::Column::StudentId.eq(student_id))
        .group_by(task::Column::Status)
        .into_tuple()
        .all(db)
        .await?;
    Ok(fold_task_counts(rows))
}

/// Current task totals across every student of one supervisor.
pub async fn task_status_counts_for_supervisor(
    db: &DatabaseConnection,
    supervisor_id: i64,
) -> Result<TaskStatusCounts, DbErr> {
    let rows: Vec<(TaskStatus, i64)> = task::Entity::find()
        .select_only()
        .column(task::Column::Status)
        .column_as(task::Column::Id.count(), "count")
        .filter(task::Column::SupervisorId.eq(supervisor_id))
        .group_by(task::Column::Status)
        .into_tuple()
        .all(db)
        .await?;
    Ok(fold_task_counts(rows))
}

/// Current project totals across one supervisor's students.
pub async fn project_status_counts_for_supervisor(
    db: &DatabaseConnection,
    supervisor_id: i64,
) -> Result<ProjectStatusCounts, DbErr> {
    let rows: Vec<(ProjectStatus, i64)> = project::Entity::find()
        .select_only()
        .column(project::Column::Status)
        .column_as(project::Column::Id.count(), "count")
        .filter(project::Column::SupervisorId.eq(supervisor_id))
        .group_by(project::Column::Status)
        .into_tuple()
        .all(db)
        .await?;
    Ok(fold_project_counts(rows))
}

async fn task_update_buckets(
    db: &DatabaseConnection,
    scope: sea_orm::sea_query::SimpleExpr,
    window_start: DateTime<Utc>,
) -> Result<Vec<(String, TaskStatus, i64)>, DbErr> {
    task_status_update::Entity::find()
        .select_only()
        .column_as(
            Expr::cust("strftime('%Y-%m', task_status_updates.created_at)"),
            "month",
        )
        .column(task_status_update::Column::Status)
        .column_as(task_status_update::Column::Id.count(), "count")
        .join(JoinType::InnerJoin, task_status_update::Relation::Task.def())
        .filter(scope)
        .filter(task_status_update::Column::CreatedAt.gte(window_start))
        .group_by(Expr::cust("strftime('%Y-%m', task_status_updates.created_at)"))
        .group_by(task_status_update::Column::Status)
        .into_tuple()
        .all(db)
        .await
}

async fn project_update_buckets(
    db: &DatabaseConnection,
    supervisor_id: i64,
    window_start: DateTime<Utc>,
) -> Result<Vec<(String, ProjectStatus, i64)>, DbErr> {
    project_status_update::Entity::find()
        .select_only()
        .column_as(
            Expr::cust("strftime('%Y-%m', project_status_updates.created_at)"),
            "month",
        )
        .column(project_status_update::Column::Status)
        .column_as(project_status_update::Column::Id.count(), "count")
        .join(
            JoinType::InnerJoin,
            project_status_update::Relation::Project.def(),
        )
        .filter(project::Column::SupervisorId.eq(supervisor_id))
        .filter(project_status_update::Column::CreatedAt.gte(window_start))
        .group_by(Expr::cust(
            "strftime('%Y-%m', project_status_updates.created_at)",
        ))
        .group_by(project_status_update::Column::Status)
        .into_tuple()
        .all(db)
        .await
}

/// Task history over the last six months for one student.
pub async fn task_series_for_student(
    db: &DatabaseConnection,
    student_id: i64,
) -> Result<Vec<MonthlyTaskCounts>, DbErr> {
    let today = Utc::now();
    let rows = task_update_buckets(
        db,
        task::Column::StudentId.eq(student_id),
        month_window_start(today),
    )
    .await?;
    Ok(fold_task_series(rows, today))
}

/// Task history over the last six months across a supervisor's students.
pub async fn task_series_for_supervisor(
    db: &DatabaseConnection,
    supervisor_id: i64,
) -> Result<Vec<MonthlyTaskCounts>, DbErr> {
    let today = Utc::now();
    let rows = task_update_buckets(
        db,
        task::Column::SupervisorId.eq(supervisor_id),
        month_window_start(today),
    )
    .await?;
    Ok(fold_task_series(rows, today))
}

/// Project history over the last six months across a supervisor's students.
pub async fn project_series_for_supervisor(
    db: &DatabaseConnection,
    supervisor_id: i64,
) -> Result<Vec<MonthlyProjectCounts>, DbErr> {
    let today = Utc::now();
    let rows = project_update_buckets(db, supervisor_id, month_window_start(today)).await?;
    Ok(fold_project_series(rows, today))
}
