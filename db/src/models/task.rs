use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a task.
///
/// The stored strings double as the wire format, so the display casing
/// ("Under Review", not "under_review") is load-bearing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "task_status_enum")]
pub enum TaskStatus {
    #[sea_orm(string_value = "Pending")]
    #[serde(rename = "Pending")]
    Pending,
    #[sea_orm(string_value = "Under Review")]
    #[serde(rename = "Under Review")]
    UnderReview,
    #[sea_orm(string_value = "Completed")]
    #[serde(rename = "Completed")]
    Completed,
    #[sea_orm(string_value = "Rejected")]
    #[serde(rename = "Rejected")]
    Rejected,
}

impl Default for TaskStatus {
    fn default() -> Self {
        TaskStatus::Pending
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status_str = match self {
            TaskStatus::Pending => "Pending",
            TaskStatus::UnderReview => "Under Review",
            TaskStatus::Completed => "Completed",
            TaskStatus::Rejected => "Rejected",
        };
        write!(f, "{}", status_str)
    }
}

impl TaskStatus {
    /// Legal edges of the submit/review path.
    ///
    /// A pending task may be submitted for review; a task under review is
    /// either approved (Completed) or sent back (Pending). Direct supervisor
    /// edits bypass this check on purpose.
    pub fn can_transition_to(&self, next: TaskStatus) -> bool {
        matches!(
            (self, next),
            (TaskStatus::Pending, TaskStatus::UnderReview)
                | (TaskStatus::UnderReview, TaskStatus::Completed)
                | (TaskStatus::UnderReview, TaskStatus::Pending)
        )
    }
}

/// Task model representing the `tasks` table.
///
/// Each task belongs to exactly one student and the supervisor who assigned
/// it. Status writes go through `lifecycle::task` so the status history in
/// `task_status_updates` stays complete.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "tasks")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub due_date: DateTime<Utc>,
    pub status: TaskStatus,
    pub student_id: i64,
    pub supervisor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::student::Entity",
        from = "Column::StudentId",
        to = "super::student::Column::Id"
    )]
    Student,

    #[sea_orm(
        belongs_to = "super::supervisor::Entity",
        from = "Column::SupervisorId",
        to = "super::supervisor::Column::Id"
    )]
    Supervisor,

    #[sea_orm(has_many = "super::task_submission::Entity")]
    Submissions,

    #[sea_orm(has_many = "super::task_status_update::Entity")]
    StatusUpdates,
}

impl Related<super::student::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl Related<super::supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl Related<super::task_submission::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Submissions.def()
    }
}

impl Related<super::task_status_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusUpdates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    /// All tasks of a student, most recently updated first.
    pub async fn get_by_student(
        db: &DatabaseConnection,
        student_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .order_by_desc(Column::UpdatedAt)
            .all(db)
            .await
    }

    /// A student's tasks in one status, most recently updated first.
    pub async fn get_by_student_and_status(
        db: &DatabaseConnection,
        student_id: i64,
        status: TaskStatus,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .filter(Column::Status.eq(status))
            .order_by_desc(Column::UpdatedAt)
            .all(db)
            .await
    }

    /// Every task a supervisor has assigned, newest assignment first.
    pub async fn get_by_supervisor(
        db: &DatabaseConnection,
        supervisor_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SupervisorId.eq(supervisor_id))
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn submit_and_review_edges_are_legal() {
        assert!(TaskStatus::Pending.can_transition_to(TaskStatus::UnderReview));
        assert!(TaskStatus::UnderReview.can_transition_to(TaskStatus::Completed));
        assert!(TaskStatus::UnderReview.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn other_edges_are_rejected() {
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Completed));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::Pending));
        assert!(!TaskStatus::Completed.can_transition_to(TaskStatus::UnderReview));
        assert!(!TaskStatus::Rejected.can_transition_to(TaskStatus::UnderReview));
        assert!(!TaskStatus::Pending.can_transition_to(TaskStatus::Pending));
    }

    #[test]
    fn wire_strings_round_trip_through_serde() {
        let json = serde_json::to_string(&TaskStatus::UnderReview).unwrap();
        assert_eq!(json, "\"Under Review\"");
        let back: TaskStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(back, TaskStatus::UnderReview);
    }

    #[test]
    fn unknown_status_strings_are_rejected() {
        assert!(serde_json::from_str::<TaskStatus>("\"Done\"").is_err());
        assert!(serde_json::from_str::<TaskStatus>("\"under review\"").is_err());
    }
}
