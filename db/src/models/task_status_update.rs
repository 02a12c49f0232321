use super::task::TaskStatus;
use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

/// Append-only history of task status changes, one row per write.
///
/// The metrics aggregator reads this table; nothing ever updates or
/// deletes rows here except the cascade from a deleted task.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "task_status_updates")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub task_id: i64,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::task::Entity",
        from = "Column::TaskId",
        to = "super::task::Column::Id"
    )]
    Task,
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Task.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Full trail for one task, oldest first.
    pub async fn get_by_task(db: &DatabaseConnection, task_id: i64) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::TaskId.eq(task_id))
            .order_by_asc(Column::CreatedAt)
            .all(db)
            .await
    }

    /// The most recent snapshot for one task, if any.
    pub async fn latest_for_task(
        db: &DatabaseConnection,
        task_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::TaskId.eq(task_id))
            .order_by_desc(Column::CreatedAt)
            .order_by_desc(Column::Id)
            .one(db)
            .await
    }
}
