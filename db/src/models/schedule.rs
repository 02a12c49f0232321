use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{IntoActiveModel, QueryOrder, Set};
use serde::{Deserialize, Serialize};

/// Schedule model representing the `schedules` table.
///
/// `start_time` and `end_time` are stored as 24-hour `"HH:MM"` strings;
/// the API layer converts to and from the 12-hour display form.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "schedules")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub start_date: DateTime<Utc>,
    pub start_time: String,
    pub end_date: DateTime<Utc>,
    pub end_time: String,
    pub description: Option<String>,
    pub color: String,
    pub supervisor_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::supervisor::Entity",
        from = "Column::SupervisorId",
        to = "super::supervisor::Column::Id"
    )]
    Supervisor,
}

impl Related<super::supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    #[allow(clippy::too_many_arguments)]
    pub async fn create(
        db: &DatabaseConnection,
        supervisor_id: i64,
        title: &str,
        start_date: DateTime<Utc>,
        start_time: &str,
        end_date: DateTime<Utc>,
        end_time: &str,
        description: Option<&str>,
        color: &str,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            title: Set(title.to_string()),
            start_date: Set(start_date),
            start_time: Set(start_time.to_string()),
            end_date: Set(end_date),
            end_time: Set(end_time.to_string()),
            description: Set(description.map(|d| d.to_string())),
            color: Set(color.to_string()),
            supervisor_id: Set(supervisor_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    /// A schedule by id, only if the supervisor owns it.
    pub async fn get_owned(
        db: &DatabaseConnection,
        id: i64,
        supervisor_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id)
            .filter(Column::SupervisorId.eq(supervisor_id))
            .one(db)
            .await
    }

    /// All schedules of a supervisor, upcoming order.
    pub async fn get_by_supervisor(
        db: &DatabaseConnection,
        supervisor_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SupervisorId.eq(supervisor_id))
            .order_by_asc(Column::StartDate)
            .order_by_asc(Column::StartTime)
            .all(db)
            .await
    }

    /// Apply a partial update; `None` fields keep their stored value.
    #[allow(clippy::too_many_arguments)]
    pub async fn edit(
        self,
        db: &DatabaseConnection,
        title: Option<&str>,
        start_date: Option<DateTime<Utc>>,
        start_time: Option<&str>,
        end_date: Option<DateTime<Utc>>,
        end_time: Option<&str>,
        description: Option<&str>,
        color: Option<&str>,
    ) -> Result<Self, DbErr> {
        let mut active = self.into_active_model();
        if let Some(t) = title {
            active.title = Set(t.to_string());
        }
        if let Some(d) = start_date {
            active.start_date = Set(d);
        }
        if let Some(t) = start_time {
            active.start_time = Set(t.to_string());
        }
        if let Some(d) = end_date {
            active.end_date = Set(d);
        }
        if let Some(t) = end_time {
            active.end_time = Set(t.to_string());
        }
        if let Some(d) = description {
            active.description = Set(Some(d.to_string()));
        }
        if let Some(c) = color {
            active.color = Set(c.to_string());
        }
        active.updated_at = Set(Utc::now());
        active.update(db).await
    }

    pub async fn delete_owned(
        db: &DatabaseConnection,
        id: i64,
        supervisor_id: i64,
    ) -> Result<bool, DbErr> {
        let result = Entity::delete_many()
            .filter(Column::Id.eq(id))
            .filter(Column::SupervisorId.eq(supervisor_id))
            .exec(db)
            .await?;
        Ok(result.rows_affected > 0)
    }
}
