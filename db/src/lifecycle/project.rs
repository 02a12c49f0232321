//! Project lifecycle engine.
//!
//! A project is created alongside its student, moves to `In Progress` the
//! first time any of the student's tasks sees activity, and is completed by
//! the student handing in a final link once every assigned task is approved.
//! All writes here keep `project_status_updates` append-only and in step with
//! the `projects` row.

use chrono::Utc;
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, PaginatorTrait, QueryFilter, TransactionTrait,
};
use tracing::warn;

use super::{LifecycleError, LifecycleResult};
use crate::models::notification::{self, NotificationKind, UserKind};
use crate::models::project::{self, ProjectStatus};
use crate::models::project_status_update;
use crate::models::student;
use crate::models::task::{self, TaskStatus};

/// A project may only be handed in once the student has exactly this many
/// tasks and every one of them is `Completed`.
pub const REQUIRED_COMPLETED_TASKS: usize = 5;

/// Share of completed tasks as a whole percentage, rounded to the nearest
/// point. A student with no tasks yet sits at 0.
pub fn completion_percentage(completed: usize, total: usize) -> i32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as i32
}

/// Appends one history row for a project status write.
pub(crate) async fn record_status<C: ConnectionTrait>(
    conn: &C,
    project_id: i64,
    status: ProjectStatus,
    updated_by: &str,
) -> Result<(), DbErr> {
    project_status_update::ActiveModel {
        project_id: Set(project_id),
        status: Set(status),
        updated_by: Set(updated_by.to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Moves a `Not Started` project to `In Progress`, with its history row.
///
/// The task engine calls this when the student's first submission or approval
/// lands. Projects already past `Not Started` are left alone.
pub(crate) async fn advance_if_not_started<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
    updated_by: &str,
) -> Result<(), DbErr> {
    let Some(found) = project::Entity::find()
        .filter(project::Column::StudentId.eq(student_id))
        .one(conn)
        .await?
    else {
        return Ok(());
    };
    if found.status != ProjectStatus::NotStarted {
        return Ok(());
    }

    let project_id = found.id;
    let mut active = found.into_active_model();
    active.status = Set(ProjectStatus::InProgress);
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;
    record_status(conn, project_id, ProjectStatus::InProgress, updated_by).await
}

/// Recomputes the denormalized `progress` column from the student's tasks.
///
/// Runs whenever the number of completed tasks changes (a review approval or
/// a direct supervisor edit into or out of `Completed`).
pub(crate) async fn refresh_progress<C: ConnectionTrait>(
    conn: &C,
    student_id: i64,
) -> Result<(), DbErr> {
    let Some(found) = project::Entity::find()
        .filter(project::Column::StudentId.eq(student_id))
        .one(conn)
        .await?
    else {
        return Ok(());
    };

    let total = task::Entity::find()
        .filter(task::Column::StudentId.eq(student_id))
        .count(conn)
        .await? as usize;
    let completed = task::Entity::find()
        .filter(task::Column::StudentId.eq(student_id))
        .filter(task::Column::Status.eq(TaskStatus::Completed))
        .count(conn)
        .await? as usize;

    let mut active = found.into_active_model();
    active.progress = Set(completion_percentage(completed, total));
    active.updated_at = Set(Utc::now());
    active.update(conn).await?;
    Ok(())
}

/// Creates the one-to-one project row for a freshly provisioned student,
/// starting its history at `Not Started`.
pub async fn create_for_student(
    db: &DatabaseConnection,
    student_id: i64,
    supervisor_id: i64,
    title: &str,
    description: &str,
) -> LifecycleResult<project::Model> {
    let txn = db.begin().await?;

    let created = project::ActiveModel {
        title: Set(title.to_string()),
        description: Set(description.to_string()),
        status: Set(ProjectStatus::NotStarted),
        start_date: Set(Utc::now()),
        final_project_link: Set(None),
        progress: Set(0),
        student_id: Set(student_id),
        supervisor_id: Set(supervisor_id),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;
    record_status(&txn, created.id, ProjectStatus::NotStarted, "admin").await?;

    txn.commit().await?;
    Ok(created)
}

/// Final hand-in: records the project link and closes the project out.
///
/// Gate first: the student must have exactly [`REQUIRED_COMPLETED_TASKS`]
/// tasks, all `Completed`, before anything is written. On success the link,
/// the `Completed` status, a progress of 100 and the history row land in one
/// transaction, and the supervisor is notified after commit.
pub async fn submit_project(
    db: &DatabaseConnection,
    student_id: i64,
    final_project_link: &str,
) -> LifecycleResult<project::Model> {
    let tasks = task::Model::get_by_student(db, student_id).await?;
    let completed = tasks
        .iter()
        .filter(|t| t.status == TaskStatus::Completed)
        .count();
    if tasks.len() != REQUIRED_COMPLETED_TASKS || completed != REQUIRED_COMPLETED_TASKS {
        return Err(LifecycleError::Forbidden(format!(
            "Project can only be submitted once all {} tasks are completed",
            REQUIRED_COMPLETED_TASKS
        )));
    }

    let owner = student::Model::get_by_id(db, student_id)
        .await?
        .ok_or_else(|| LifecycleError::NotFound("Student not found".to_string()))?;
    let current = project::Model::get_by_student(db, student_id)
        .await?
        .ok_or_else(|| {
            LifecycleError::NotFound("Project not found for this student".to_string())
        })?;
    if current.status == ProjectStatus::Completed {
        return Err(LifecycleError::Forbidden(
            "Project has already been submitted".to_string(),
        ));
    }

    let txn = db.begin().await?;

    let project_id = current.id;
    let supervisor_id = current.supervisor_id;
    let mut active = current.into_active_model();
    active.final_project_link = Set(Some(final_project_link.to_string()));
    active.status = Set(ProjectStatus::Completed);
    active.progress = Set(100);
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;
    record_status(&txn, project_id, ProjectStatus::Completed, &owner.full_name()).await?;

    txn.commit().await?;

    if let Err(e) = notification::Model::create(
        db,
        supervisor_id,
        UserKind::Supervisor,
        NotificationKind::ProjectSubmitted,
        "Project Submitted",
        &format!("{} submitted their final project", owner.full_name()),
        Some(project_id),
        Some("project"),
    )
    .await
    {
        warn!("Failed to send project submission notification: {}", e);
    }

    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::task::{
        assign_task_to_students, review_task, submit_task, ReviewDecision,
    };
    use crate::models::supervisor;
    use crate::test_utils::setup_test_db;
    use chrono::Duration;

    async fn seed_pair(db: &DatabaseConnection) -> (supervisor::Model, student::Model) {
        let sup = supervisor::Model::create(db, "ana.joubert@uni.ac.za", "Ana", "Joubert")
            .await
            .unwrap();
        let stu = student::Model::create(
            db,
            "u20000001",
            "Thabo",
            "Nkosi",
            "thabo.nkosi@uni.ac.za",
            Some(sup.id),
        )
        .await
        .unwrap();
        (sup, stu)
    }

    async fn assign_one(db: &DatabaseConnection, supervisor_id: i64, title: &str) -> task::Model {
        assign_task_to_students(
            db,
            supervisor_id,
            title,
            "Write it up",
            Utc::now() + Duration::days(7),
        )
        .await
        .unwrap()
        .remove(0)
    }

    async fn complete_task(
        db: &DatabaseConnection,
        supervisor_id: i64,
        student_id: i64,
        task_id: i64,
    ) {
        submit_task(db, student_id, task_id, "https://git.example/repo", "done")
            .await
            .unwrap();
        review_task(
            db,
            supervisor_id,
            student_id,
            task_id,
            ReviewDecision::Approved,
            "Looks good",
        )
        .await
        .unwrap();
    }

    #[test]
    fn completion_percentage_rounds_to_nearest_point() {
        assert_eq!(completion_percentage(0, 0), 0);
        assert_eq!(completion_percentage(0, 5), 0);
        assert_eq!(completion_percentage(2, 5), 40);
        assert_eq!(completion_percentage(1, 3), 33);
        assert_eq!(completion_percentage(2, 3), 67);
        assert_eq!(completion_percentage(5, 5), 100);
    }

    #[tokio::test]
    async fn creating_a_project_appends_the_initial_history_row() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;

        let created = create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();
        assert_eq!(created.status, ProjectStatus::NotStarted);
        assert_eq!(created.progress, 0);

        let history = project_status_update::Model::get_by_project(&db, created.id)
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].status, ProjectStatus::NotStarted);
        assert_eq!(history[0].updated_by, "admin");
    }

    #[tokio::test]
    async fn submitting_with_all_five_tasks_completed_closes_the_project() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();

        for n in 1..=5 {
            let t = assign_one(&db, sup.id, &format!("Milestone {}", n)).await;
            complete_task(&db, sup.id, stu.id, t.id).await;
        }

        let submitted = submit_project(&db, stu.id, "https://git.example/final")
            .await
            .unwrap();
        assert_eq!(submitted.status, ProjectStatus::Completed);
        assert_eq!(submitted.progress, 100);
        assert_eq!(
            submitted.final_project_link.as_deref(),
            Some("https://git.example/final")
        );

        let history = project_status_update::Model::get_by_project(&db, submitted.id)
            .await
            .unwrap();
        let last = history.last().unwrap();
        assert_eq!(last.status, ProjectStatus::Completed);
        assert_eq!(last.updated_by, "Thabo Nkosi");

        let gallery = project::Model::completed_with_link(&db).await.unwrap();
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].id, submitted.id);
    }

    #[tokio::test]
    async fn four_completed_and_one_open_task_is_forbidden() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();

        let mut ids = Vec::new();
        for n in 1..=5 {
            ids.push(assign_one(&db, sup.id, &format!("Milestone {}", n)).await.id);
        }
        for id in &ids[..4] {
            complete_task(&db, sup.id, stu.id, *id).await;
        }

        let err = submit_project(&db, stu.id, "https://git.example/final")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden(_)));

        let untouched = project::Model::get_by_student(&db, stu.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(untouched.status, ProjectStatus::InProgress);
        assert_eq!(untouched.final_project_link, None);
    }

    #[tokio::test]
    async fn more_than_five_completed_tasks_is_forbidden() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();

        for n in 1..=6 {
            let t = assign_one(&db, sup.id, &format!("Milestone {}", n)).await;
            complete_task(&db, sup.id, stu.id, t.id).await;
        }

        let err = submit_project(&db, stu.id, "https://git.example/final")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden(_)));
    }

    #[tokio::test]
    async fn submitting_without_a_project_row_is_not_found() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;

        for n in 1..=5 {
            let t = assign_one(&db, sup.id, &format!("Milestone {}", n)).await;
            complete_task(&db, sup.id, stu.id, t.id).await;
        }

        let err = submit_project(&db, stu.id, "https://git.example/final")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[tokio::test]
    async fn resubmitting_a_completed_project_is_forbidden() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();

        for n in 1..=5 {
            let t = assign_one(&db, sup.id, &format!("Milestone {}", n)).await;
            complete_task(&db, sup.id, stu.id, t.id).await;
        }
        submit_project(&db, stu.id, "https://git.example/final")
            .await
            .unwrap();

        let err = submit_project(&db, stu.id, "https://git.example/v2")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::Forbidden(_)));

        let unchanged = project::Model::get_by_student(&db, stu.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            unchanged.final_project_link.as_deref(),
            Some("https://git.example/final")
        );
    }
}
