use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::{QueryOrder, Set};
use serde::{Deserialize, Serialize};

/// Student model representing the `students` table.
///
/// A student is linked to at most one supervisor and owns exactly one
/// project for the duration of their degree.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "students")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub matric_number: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub supervisor_id: Option<i64>,
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

    #[sea_orm(has_many = "super::task::Entity")]
    Tasks,

    #[sea_orm(has_one = "super::project::Entity")]
    Project,
}

impl Related<super::supervisor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Supervisor.def()
    }
}

impl Related<super::task::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Tasks.def()
    }
}

impl Related<super::project::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Project.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Create a new student record.
    pub async fn create(
        db: &DatabaseConnection,
        matric_number: &str,
        first_name: &str,
        last_name: &str,
        email: &str,
        supervisor_id: Option<i64>,
    ) -> Result<Self, DbErr> {
        let active = ActiveModel {
            matric_number: Set(matric_number.to_string()),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            email: Set(email.to_string()),
            supervisor_id: Set(supervisor_id),
            created_at: Set(Utc::now()),
            updated_at: Set(Utc::now()),
            ..Default::default()
        };
        active.insert(db).await
    }

    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn get_by_matric_number(
        db: &DatabaseConnection,
        matric_number: &str,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::MatricNumber.eq(matric_number))
            .one(db)
            .await
    }

    /// All students assigned to a supervisor, most recently added first.
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

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}
