use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::QueryOrder;
use serde::{Deserialize, Serialize};

/// Lifecycle status of a project. Forward-only:
/// Not Started -> In Progress -> Completed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(
    rs_type = "String",
    db_type = "Enum",
    enum_name = "project_status_enum"
)]
pub enum ProjectStatus {
    #[sea_orm(string_value = "Not Started")]
    #[serde(rename = "Not Started")]
    NotStarted,
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "Completed")]
    #[serde(rename = "Completed")]
    Completed,
}

impl Default for ProjectStatus {
    fn default() -> Self {
        ProjectStatus::NotStarted
    }
}

impl std::fmt::Display for ProjectStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status_str = match self {
            ProjectStatus::NotStarted => "Not Started",
            ProjectStatus::InProgress => "In Progress",
            ProjectStatus::Completed => "Completed",
        };
        write!(f, "{}", status_str)
    }
}

/// Project model representing the `projects` table.
///
/// One project per student (`student_id` is unique). `progress` is the
/// denormalized completion percentage, refreshed by `lifecycle::project`
/// whenever the completed-task count changes.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "projects")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: ProjectStatus,
    pub start_date: DateTime<Utc>,
    pub final_project_link: Option<String>,
    pub progress: i32,
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

    #[sea_orm(has_many = "super::project_status_update::Entity")]
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

impl Related<super::project_status_update::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::StatusUpdates.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub async fn get_by_id(db: &DatabaseConnection, id: i64) -> Result<Option<Self>, DbErr> {
        Entity::find_by_id(id).one(db).await
    }

    pub async fn get_by_student(
        db: &DatabaseConnection,
        student_id: i64,
    ) -> Result<Option<Self>, DbErr> {
        Entity::find()
            .filter(Column::StudentId.eq(student_id))
            .one(db)
            .await
    }

    pub async fn get_by_supervisor(
        db: &DatabaseConnection,
        supervisor_id: i64,
    ) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::SupervisorId.eq(supervisor_id))
            .order_by_desc(Column::UpdatedAt)
            .all(db)
            .await
    }

    /// Completed projects with a non-empty final link, newest first.
    ///
    /// This is the public gallery query; projects completed without a
    /// submitted link never appear in it.
    pub async fn completed_with_link(db: &DatabaseConnection) -> Result<Vec<Self>, DbErr> {
        Entity::find()
            .filter(Column::Status.eq(ProjectStatus::Completed))
            .filter(Column::FinalProjectLink.is_not_null())
            .filter(Column::FinalProjectLink.ne(""))
            .order_by_desc(Column::UpdatedAt)
            .all(db)
            .await
    }
}
