use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{PaginatorTrait, QueryOrder, Set};
use serde::{Deserialize, Serialize};

/// Which user table a notification row points at.
///
/// Notifications are polymorphic over students and supervisors, so the
/// `user_id` column carries no foreign key and this discriminator scopes
/// every read.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "user_kind_enum")]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    #[sea_orm(string_value = "student")]
    Student,
    #[sea_orm(string_value = "supervisor")]
    Supervisor,
}

/// Closed set of events that produce a notification.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "notification_kind_enum"
)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    #[sea_orm(string_value = "student_created")]
    StudentCreated,
    #[sea_orm(string_value = "supervisor_assigned")]
    SupervisorAssigned,
    #[sea_orm(string_value = "task_assigned")]
    TaskAssigned,
    #[sea_orm(string_value = "task_submitted")]
    TaskSubmitted,
    #[sea_orm(string_value = "task_approved")]
    TaskApproved,
    #[sea_orm(string_value = "task_rejected")]
    TaskRejected,
    #[sea_orm(string_value = "project_submitted")]
    ProjectSubmitted,
    #[sea_orm(string_value = "schedule_created")]
    ScheduleCreated,
}

/// Notification model representing the `notifications` table.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub user_id: i64,
    pub user_kind: UserKind,
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    pub related_id: Option<i64>,
    pub related_kind: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn create(
        db: &DatabaseConnection,
        user_id: i64,
        user_kind: UserKind,
        kind: NotificationKind,
        title: &str,
        message: &str,
        related_id: Option<i64>,
        related_kind: Option<&str>,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            user_id: Set(user_id),
            user_kind: Set(user_kind),
            kind: Set(kind),
            title: Set(title.to_string()),
            message: Set(message.to_string()),
            is_read: Set(false),
            related_id: Set(related_id),
            related_kind: Set(related_kind.map(|k| k.to_string())),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// A user's notifications, newest first.
    pub async fn list_for_user(
        db: &DatabaseConnection,
        user_id: i64,
        user_kind: UserKind,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::UserKind.eq(user_kind))
            .order_by_desc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// Mark one notification read, scoped to its owner.
    ///
    /// Returns false when the id does not exist or belongs to someone else.
    pub async fn mark_read(
        db: &DatabaseConnection,
        id: i64,
        user_id: i64,
        user_kind: UserKind,
    ) -> Result<bool, DbErr> {
        let Some(notification) = Entity::find_by_id(id)
            .filter(Column::UserId.eq(user_id))
            .filter(Column::UserKind.eq(user_kind))
            .one(db)
            .await?
        else {
            return Ok(false);
        };

        let mut active: ActiveModel = notification.into();
        active.is_read = Set(true);
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
        Ok(true)
    }

    pub async fn unread_count(
        db: &DatabaseConnection,
        user_id: i64,
        user_kind: UserKind,
    ) -> Result<u64, DbErr> {
        Entity::find()
            .filter(Column::UserId.eq(user_id))
            .filter(Column::UserKind.eq(user_kind))
            .filter(Column::IsRead.eq(false))
            .count(db)
            .await
    }
}
