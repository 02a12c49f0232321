//! Task lifecycle engine.
//!
//! Tasks move `Pending -> Under Review -> Completed`, with a rejection
//! sending them back to `Pending` for another attempt. Every transition made
//! here lands together with its `task_status_updates` history row, and the
//! first sign of activity on a student's tasks pulls their project out of
//! `Not Started`.

use chrono::{DateTime, Utc};
use sea_orm::ActiveValue::Set;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    IntoActiveModel, QueryFilter, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::project as project_lifecycle;
use super::{LifecycleError, LifecycleResult};
use crate::models::notification::{self, NotificationKind, UserKind};
use crate::models::student;
use crate::models::task::{self, TaskStatus};
use crate::models::task_status_update;
use crate::models::task_submission::{self, SubmissionStatus};

/// Outcome a supervisor hands down for a pending submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewDecision {
    Approved,
    Rejected,
}

impl ReviewDecision {
    /// Final state recorded on the submission row.
    pub fn submission_status(self) -> SubmissionStatus {
        match self {
            ReviewDecision::Approved => SubmissionStatus::Approved,
            ReviewDecision::Rejected => SubmissionStatus::Rejected,
        }
    }

    /// Where the task lands: approval completes it, rejection reopens it.
    pub fn next_task_status(self) -> TaskStatus {
        match self {
            ReviewDecision::Approved => TaskStatus::Completed,
            ReviewDecision::Rejected => TaskStatus::Pending,
        }
    }
}

/// Appends one history row for a task status write.
pub(crate) async fn record_status<C: ConnectionTrait>(
    conn: &C,
    task_id: i64,
    status: TaskStatus,
) -> Result<(), DbErr> {
    task_status_update::ActiveModel {
        task_id: Set(task_id),
        status: Set(status),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;
    Ok(())
}

/// Creates one `Pending` task per student currently assigned to the
/// supervisor, each with its opening history row in its own transaction.
///
/// Fails with `NotFound` before any write when the supervisor has no
/// students. Students are processed one at a time, so a failure partway
/// through leaves the earlier tasks in place.
pub async fn assign_task_to_students(
    db: &DatabaseConnection,
    supervisor_id: i64,
    title: &str,
    description: &str,
    due_date: DateTime<Utc>,
) -> LifecycleResult<Vec<task::Model>> {
    let students = student::Model::get_by_supervisor(db, supervisor_id).await?;
    if students.is_empty() {
        return Err(LifecycleError::NotFound(
            "No students found for this supervisor".to_string(),
        ));
    }

    let mut created = Vec::with_capacity(students.len());
    for s in &students {
        let txn = db.begin().await?;
        let new_task = task::ActiveModel {
            title: Set(title.to_string()),
            description: Set(description.to_string()),
            due_date: Set(due_date),
            status: Set(TaskStatus::Pending),
            student_id: Set(s.id),
            supervisor_id: Set(supervisor_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        record_status(&txn, new_task.id, TaskStatus::Pending).await?;
        txn.commit().await?;
        created.push(new_task);
    }

    for t in &created {
        if let Err(e) = notification::Model::create(
            db,
            t.student_id,
            UserKind::Student,
            NotificationKind::TaskAssigned,
            "New Task Assigned",
            &format!("\"{}\" is due {}", t.title, t.due_date.format("%Y-%m-%d")),
            Some(t.id),
            Some("task"),
        )
        .await
        {
            warn!("Failed to send task assignment notification: {}", e);
        }
    }

    Ok(created)
}

/// Student hand-in for one of their `Pending` tasks.
///
/// In a single transaction: inserts the submission, moves the task to
/// `Under Review` with its history row, and pulls a `Not Started` project
/// into `In Progress`. The supervisor is notified after commit.
pub async fn submit_task(
    db: &DatabaseConnection,
    student_id: i64,
    task_id: i64,
    link: &str,
    short_description: &str,
) -> LifecycleResult<task_submission::Model> {
    let txn = db.begin().await?;

    let Some(pending) = task::Entity::find_by_id(task_id)
        .filter(task::Column::StudentId.eq(student_id))
        .filter(task::Column::Status.eq(TaskStatus::Pending))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Err(LifecycleError::NotFound(
            "Pending task not found for this student".to_string(),
        ));
    };

    let task_title = pending.title.clone();
    let supervisor_id = pending.supervisor_id;

    let submission = task_submission::ActiveModel {
        task_id: Set(task_id),
        student_id: Set(student_id),
        supervisor_id: Set(supervisor_id),
        link: Set(link.to_string()),
        short_description: Set(short_description.to_string()),
        status: Set(SubmissionStatus::Pending),
        feedback: Set(String::new()),
        created_at: Set(Utc::now()),
        updated_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut active = pending.into_active_model();
    active.status = Set(TaskStatus::UnderReview);
    active.updated_at = Set(Utc::now());
    active.update(&txn).await?;
    record_status(&txn, task_id, TaskStatus::UnderReview).await?;
    project_lifecycle::advance_if_not_started(&txn, student_id, "system").await?;

    txn.commit().await?;

    let student_name = match student::Model::get_by_id(db, student_id).await {
        Ok(Some(s)) => s.full_name(),
        _ => format!("Student #{}", student_id),
    };
    if let Err(e) = notification::Model::create(
        db,
        supervisor_id,
        UserKind::Supervisor,
        NotificationKind::TaskSubmitted,
        "Task Submitted",
        &format!("{} submitted \"{}\" for review", student_name, task_title),
        Some(task_id),
        Some("task"),
    )
    .await
    {
        warn!("Failed to send task submission notification: {}", e);
    }

    Ok(submission)
}

/// Supervisor verdict on a student's submission.
///
/// One transaction covers the whole review: the pending submission takes the
/// decision and feedback, the task moves to the decided status with its
/// history row, and an approval refreshes the project's progress. The
/// pending-only lookup doubles as the replay guard, so reviewing the same
/// submission twice reports `NotFound`.
pub async fn review_task(
    db: &DatabaseConnection,
    supervisor_id: i64,
    student_id: i64,
    task_id: i64,
    decision: ReviewDecision,
    feedback: &str,
) -> LifecycleResult<task::Model> {
    let txn = db.begin().await?;

    let Some(submission) = task_submission::Entity::find()
        .filter(task_submission::Column::TaskId.eq(task_id))
        .filter(task_submission::Column::StudentId.eq(student_id))
        .filter(task_submission::Column::SupervisorId.eq(supervisor_id))
        .filter(task_submission::Column::Status.eq(SubmissionStatus::Pending))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Err(LifecycleError::NotFound(
            "Pending submission not found for this task".to_string(),
        ));
    };

    let mut submission_active = submission.into_active_model();
    submission_active.status = Set(decision.submission_status());
    submission_active.feedback = Set(feedback.to_string());
    submission_active.updated_at = Set(Utc::now());
    submission_active.update(&txn).await?;

    let Some(current) = task::Entity::find_by_id(task_id).one(&txn).await? else {
        txn.rollback().await?;
        return Err(LifecycleError::NotFound("Task not found".to_string()));
    };

    let next_status = decision.next_task_status();
    if !current.status.can_transition_to(next_status) {
        txn.rollback().await?;
        return Err(LifecycleError::Validation(format!(
            "Task cannot move from {} to {}",
            current.status, next_status
        )));
    }

    let mut task_active = current.into_active_model();
    task_active.status = Set(next_status);
    task_active.updated_at = Set(Utc::now());
    let updated = task_active.update(&txn).await?;

    if next_status == TaskStatus::Completed {
        project_lifecycle::advance_if_not_started(&txn, student_id, "system").await?;
        project_lifecycle::refresh_progress(&txn, student_id).await?;
    }
    record_status(&txn, task_id, next_status).await?;

    txn.commit().await?;

    let (kind, title) = match decision {
        ReviewDecision::Approved => (NotificationKind::TaskApproved, "Task Approved"),
        ReviewDecision::Rejected => (NotificationKind::TaskRejected, "Task Needs Revision"),
    };
    if let Err(e) = notification::Model::create(
        db,
        student_id,
        UserKind::Student,
        kind,
        title,
        &format!("\"{}\": {}", updated.title, feedback),
        Some(task_id),
        Some("task"),
    )
    .await
    {
        warn!("Failed to send review notification: {}", e);
    }

    Ok(updated)
}

/// Direct supervisor edit of a task they own.
///
/// This is the manual override path: a status change skips the transition
/// rules but still lands its history row, and the project progress is
/// refreshed when the edit moves the task into or out of `Completed`. It
/// never advances the project out of `Not Started`; only student activity
/// does that.
pub async fn edit_task(
    db: &DatabaseConnection,
    supervisor_id: i64,
    task_id: i64,
    title: Option<&str>,
    description: Option<&str>,
    due_date: Option<DateTime<Utc>>,
    status: Option<TaskStatus>,
) -> LifecycleResult<task::Model> {
    let txn = db.begin().await?;

    let Some(current) = task::Entity::find_by_id(task_id)
        .filter(task::Column::SupervisorId.eq(supervisor_id))
        .one(&txn)
        .await?
    else {
        txn.rollback().await?;
        return Err(LifecycleError::NotFound(
            "Task not found for this supervisor".to_string(),
        ));
    };

    let old_status = current.status;
    let student_id = current.student_id;
    let mut active = current.into_active_model();
    if let Some(t) = title {
        active.title = Set(t.to_string());
    }
    if let Some(d) = description {
        active.description = Set(d.to_string());
    }
    if let Some(d) = due_date {
        active.due_date = Set(d);
    }
    if let Some(s) = status {
        active.status = Set(s);
    }
    active.updated_at = Set(Utc::now());
    let updated = active.update(&txn).await?;

    if let Some(new_status) = status {
        if new_status != old_status {
            record_status(&txn, task_id, new_status).await?;
            if new_status == TaskStatus::Completed || old_status == TaskStatus::Completed {
                project_lifecycle::refresh_progress(&txn, student_id).await?;
            }
        }
    }

    txn.commit().await?;
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::project::{self, ProjectStatus};
    use crate::models::project_status_update;
    use crate::models::supervisor;
    use crate::test_utils::setup_test_db;
    use chrono::Duration;
    use sea_orm::PaginatorTrait;

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

    async fn assign_one(db: &DatabaseConnection, supervisor_id: i64) -> task::Model {
        assign_task_to_students(
            db,
            supervisor_id,
            "Literature review",
            "Survey the field",
            Utc::now() + Duration::days(7),
        )
        .await
        .unwrap()
        .remove(0)
    }

    #[tokio::test]
    async fn assigning_creates_a_pending_task_per_student_with_history() {
        let db = setup_test_db().await;
        let (sup, _) = seed_pair(&db).await;
        student::Model::create(
            &db,
            "u20000002",
            "Lerato",
            "Dlamini",
            "lerato.dlamini@uni.ac.za",
            Some(sup.id),
        )
        .await
        .unwrap();

        let created = assign_task_to_students(
            &db,
            sup.id,
            "Proposal",
            "Draft the proposal",
            Utc::now() + Duration::days(14),
        )
        .await
        .unwrap();
        assert_eq!(created.len(), 2);

        for t in &created {
            assert_eq!(t.status, TaskStatus::Pending);
            let history = task_status_update::Model::get_by_task(&db, t.id)
                .await
                .unwrap();
            assert_eq!(history.len(), 1);
            assert_eq!(history[0].status, TaskStatus::Pending);
        }

        let notes = notification::Model::list_for_user(&db, created[0].student_id, UserKind::Student)
            .await
            .unwrap();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].kind, NotificationKind::TaskAssigned);
    }

    #[tokio::test]
    async fn assigning_with_no_students_is_not_found_and_writes_nothing() {
        let db = setup_test_db().await;
        let sup = supervisor::Model::create(&db, "ana.joubert@uni.ac.za", "Ana", "Joubert")
            .await
            .unwrap();

        let err = assign_task_to_students(
            &db,
            sup.id,
            "Proposal",
            "Draft the proposal",
            Utc::now() + Duration::days(14),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));

        let count = task::Entity::find().count(&db).await.unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn submitting_moves_the_task_under_review_and_starts_the_project() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        project_lifecycle::create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();
        let t = assign_one(&db, sup.id).await;

        let submission = submit_task(&db, stu.id, t.id, "https://git.example/repo", "first pass")
            .await
            .unwrap();
        assert_eq!(submission.status, SubmissionStatus::Pending);
        assert_eq!(submission.feedback, "");
        assert_eq!(submission.supervisor_id, sup.id);

        let reloaded = task::Model::get_by_id(&db, t.id).await.unwrap().unwrap();
        assert_eq!(reloaded.status, TaskStatus::UnderReview);

        let history = task_status_update::Model::get_by_task(&db, t.id).await.unwrap();
        let statuses: Vec<TaskStatus> = history.iter().map(|h| h.status).collect();
        assert_eq!(statuses, vec![TaskStatus::Pending, TaskStatus::UnderReview]);

        let proj = project::Model::get_by_student(&db, stu.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(proj.status, ProjectStatus::InProgress);
        let proj_history = project_status_update::Model::get_by_project(&db, proj.id)
            .await
            .unwrap();
        let last = proj_history.last().unwrap();
        assert_eq!(last.status, ProjectStatus::InProgress);
        assert_eq!(last.updated_by, "system");

        let notes = notification::Model::list_for_user(&db, sup.id, UserKind::Supervisor)
            .await
            .unwrap();
        assert_eq!(notes[0].kind, NotificationKind::TaskSubmitted);
    }

    #[tokio::test]
    async fn submitting_a_task_that_is_not_pending_is_not_found() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        let t = assign_one(&db, sup.id).await;

        submit_task(&db, stu.id, t.id, "https://git.example/repo", "first pass")
            .await
            .unwrap();
        let err = submit_task(&db, stu.id, t.id, "https://git.example/repo", "again")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));

        let submissions = task_submission::Model::get_by_task(&db, t.id).await.unwrap();
        assert_eq!(submissions.len(), 1);
    }

    #[tokio::test]
    async fn submitting_someone_elses_task_is_not_found() {
        let db = setup_test_db().await;
        let (sup, _) = seed_pair(&db).await;
        let outsider = student::Model::create(
            &db,
            "u20000009",
            "Pieter",
            "Venter",
            "pieter.venter@uni.ac.za",
            None,
        )
        .await
        .unwrap();
        let t = assign_one(&db, sup.id).await;

        let err = submit_task(&db, outsider.id, t.id, "https://git.example/repo", "mine?")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[tokio::test]
    async fn approving_a_review_completes_the_task_and_refreshes_progress() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        project_lifecycle::create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();
        let t = assign_one(&db, sup.id).await;
        submit_task(&db, stu.id, t.id, "https://git.example/repo", "first pass")
            .await
            .unwrap();

        let reviewed = review_task(
            &db,
            sup.id,
            stu.id,
            t.id,
            ReviewDecision::Approved,
            "Well structured",
        )
        .await
        .unwrap();
        assert_eq!(reviewed.status, TaskStatus::Completed);

        let submission = &task_submission::Model::get_by_task(&db, t.id).await.unwrap()[0];
        assert_eq!(submission.status, SubmissionStatus::Approved);
        assert_eq!(submission.feedback, "Well structured");

        let history = task_status_update::Model::get_by_task(&db, t.id).await.unwrap();
        assert_eq!(history.last().unwrap().status, TaskStatus::Completed);

        // The only assigned task is now complete, so progress hits 100.
        let proj = project::Model::get_by_student(&db, stu.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(proj.progress, 100);

        let notes = notification::Model::list_for_user(&db, stu.id, UserKind::Student)
            .await
            .unwrap();
        assert_eq!(notes[0].kind, NotificationKind::TaskApproved);
        assert!(notes[0].message.contains("Well structured"));
    }

    #[tokio::test]
    async fn rejecting_a_review_reopens_the_task_for_resubmission() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        let t = assign_one(&db, sup.id).await;
        submit_task(&db, stu.id, t.id, "https://git.example/repo", "first pass")
            .await
            .unwrap();

        let reviewed = review_task(
            &db,
            sup.id,
            stu.id,
            t.id,
            ReviewDecision::Rejected,
            "Missing the evaluation chapter",
        )
        .await
        .unwrap();
        assert_eq!(reviewed.status, TaskStatus::Pending);

        let submission = &task_submission::Model::get_by_task(&db, t.id).await.unwrap()[0];
        assert_eq!(submission.status, SubmissionStatus::Rejected);

        let notes = notification::Model::list_for_user(&db, stu.id, UserKind::Student)
            .await
            .unwrap();
        assert_eq!(notes[0].kind, NotificationKind::TaskRejected);

        // Back to Pending means the student can hand in again.
        submit_task(&db, stu.id, t.id, "https://git.example/repo", "second pass")
            .await
            .unwrap();
        let submissions = task_submission::Model::get_by_task(&db, t.id).await.unwrap();
        assert_eq!(submissions.len(), 2);
    }

    #[tokio::test]
    async fn reviewing_the_same_submission_twice_is_not_found() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        let t = assign_one(&db, sup.id).await;
        submit_task(&db, stu.id, t.id, "https://git.example/repo", "first pass")
            .await
            .unwrap();
        review_task(&db, sup.id, stu.id, t.id, ReviewDecision::Approved, "Good")
            .await
            .unwrap();

        let err = review_task(&db, sup.id, stu.id, t.id, ReviewDecision::Rejected, "Oops")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));

        let unchanged = task::Model::get_by_id(&db, t.id).await.unwrap().unwrap();
        assert_eq!(unchanged.status, TaskStatus::Completed);
    }

    #[tokio::test]
    async fn reviewing_with_the_wrong_supervisor_is_not_found() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        let other = supervisor::Model::create(&db, "jan.botha@uni.ac.za", "Jan", "Botha")
            .await
            .unwrap();
        let t = assign_one(&db, sup.id).await;
        submit_task(&db, stu.id, t.id, "https://git.example/repo", "first pass")
            .await
            .unwrap();

        let err = review_task(&db, other.id, stu.id, t.id, ReviewDecision::Approved, "Good")
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }

    #[tokio::test]
    async fn direct_edit_overrides_status_and_appends_history() {
        let db = setup_test_db().await;
        let (sup, stu) = seed_pair(&db).await;
        project_lifecycle::create_for_student(&db, stu.id, sup.id, "Thesis", "Final year project")
            .await
            .unwrap();
        let t = assign_one(&db, sup.id).await;

        let updated = edit_task(
            &db,
            sup.id,
            t.id,
            Some("Revised title"),
            None,
            None,
            Some(TaskStatus::Completed),
        )
        .await
        .unwrap();
        assert_eq!(updated.title, "Revised title");
        assert_eq!(updated.status, TaskStatus::Completed);

        let history = task_status_update::Model::get_by_task(&db, t.id).await.unwrap();
        let statuses: Vec<TaskStatus> = history.iter().map(|h| h.status).collect();
        assert_eq!(statuses, vec![TaskStatus::Pending, TaskStatus::Completed]);

        // Completed count changed, so the denormalized progress follows.
        let proj = project::Model::get_by_student(&db, stu.id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(proj.progress, 100);
        // The override path never advances Not Started; only submissions do.
        assert_eq!(proj.status, ProjectStatus::NotStarted);
    }

    #[tokio::test]
    async fn direct_edit_without_a_status_change_keeps_history_quiet() {
        let db = setup_test_db().await;
        let (sup, _) = seed_pair(&db).await;
        let t = assign_one(&db, sup.id).await;

        edit_task(&db, sup.id, t.id, None, Some("Sharper scope"), None, None)
            .await
            .unwrap();

        let history = task_status_update::Model::get_by_task(&db, t.id).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[tokio::test]
    async fn editing_an_unowned_task_is_not_found() {
        let db = setup_test_db().await;
        let (sup, _) = seed_pair(&db).await;
        let other = supervisor::Model::create(&db, "jan.botha@uni.ac.za", "Jan", "Botha")
            .await
            .unwrap();
        let t = assign_one(&db, sup.id).await;

        let err = edit_task(&db, other.id, t.id, Some("Hijack"), None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, LifecycleError::NotFound(_)));
    }
}
