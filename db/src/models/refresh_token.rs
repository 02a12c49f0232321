//! Per-role refresh tokens.
//!
//! Each role keeps its own table so a leaked student token can never be
//! replayed against a supervisor or admin login. The three entities are
//! intentionally identical apart from the owning table.

use rand::distributions::Alphanumeric;
use rand::{Rng, thread_rng};

/// Opaque 64-character token; validity is decided by the stored row, not
/// by anything encoded in the token itself.
fn generate_token() -> String {
    thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

pub mod student {
    use chrono::{DateTime, Duration, Utc};
    use sea_orm::ActiveValue::Set;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "refresh_student_tokens")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub token: String,
        pub user_id: i64,
        pub revoked: bool,
        pub expires_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::models::student::Entity",
            from = "Column::UserId",
            to = "crate::models::student::Column::Id",
            on_delete = "Cascade"
        )]
        Student,
    }

    impl Related<crate::models::student::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Student.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub async fn create(
            db: &DatabaseConnection,
            user_id: i64,
            expiry_days: u64,
        ) -> Result<Self, DbErr> {
            let active = ActiveModel {
                token: Set(super::generate_token()),
                user_id: Set(user_id),
                revoked: Set(false),
                expires_at: Set(Utc::now() + Duration::days(expiry_days as i64)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            active.insert(db).await
        }

        /// Look a token up only if it is unrevoked and unexpired.
        pub async fn find_valid(
            db: &DatabaseConnection,
            token: &str,
        ) -> Result<Option<Self>, DbErr> {
            Entity::find()
                .filter(Column::Token.eq(token))
                .filter(Column::Revoked.eq(false))
                .filter(Column::ExpiresAt.gt(Utc::now()))
                .one(db)
                .await
        }

        pub async fn revoke(db: &DatabaseConnection, token: &str) -> Result<bool, DbErr> {
            let Some(record) = Entity::find()
                .filter(Column::Token.eq(token))
                .one(db)
                .await?
            else {
                return Ok(false);
            };
            let mut active: ActiveModel = record.into();
            active.revoked = Set(true);
            active.updated_at = Set(Utc::now());
            active.update(db).await?;
            Ok(true)
        }
    }
}

pub mod supervisor {
    use chrono::{DateTime, Duration, Utc};
    use sea_orm::ActiveValue::Set;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "refresh_supervisor_tokens")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub token: String,
        pub user_id: i64,
        pub revoked: bool,
        pub expires_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::models::supervisor::Entity",
            from = "Column::UserId",
            to = "crate::models::supervisor::Column::Id",
            on_delete = "Cascade"
        )]
        Supervisor,
    }

    impl Related<crate::models::supervisor::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Supervisor.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub async fn create(
            db: &DatabaseConnection,
            user_id: i64,
            expiry_days: u64,
        ) -> Result<Self, DbErr> {
            let active = ActiveModel {
                token: Set(super::generate_token()),
                user_id: Set(user_id),
                revoked: Set(false),
                expires_at: Set(Utc::now() + Duration::days(expiry_days as i64)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            active.insert(db).await
        }

        pub async fn find_valid(
            db: &DatabaseConnection,
            token: &str,
        ) -> Result<Option<Self>, DbErr> {
            Entity::find()
                .filter(Column::Token.eq(token))
                .filter(Column::Revoked.eq(false))
                .filter(Column::ExpiresAt.gt(Utc::now()))
                .one(db)
                .await
        }

        pub async fn revoke(db: &DatabaseConnection, token: &str) -> Result<bool, DbErr> {
            let Some(record) = Entity::find()
                .filter(Column::Token.eq(token))
                .one(db)
                .await?
            else {
                return Ok(false);
            };
            let mut active: ActiveModel = record.into();
            active.revoked = Set(true);
            active.updated_at = Set(Utc::now());
            active.update(db).await?;
            Ok(true)
        }
    }
}

pub mod admin {
    use chrono::{DateTime, Duration, Utc};
    use sea_orm::ActiveValue::Set;
    use sea_orm::entity::prelude::*;
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
    #[sea_orm(table_name = "refresh_admin_tokens")]
    pub struct Model {
        #[sea_orm(primary_key)]
        pub id: i64,
        pub token: String,
        pub user_id: i64,
        pub revoked: bool,
        pub expires_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {
        #[sea_orm(
            belongs_to = "crate::models::admin::Entity",
            from = "Column::UserId",
            to = "crate::models::admin::Column::Id",
            on_delete = "Cascade"
        )]
        Admin,
    }

    impl Related<crate::models::admin::Entity> for Entity {
        fn to() -> RelationDef {
            Relation::Admin.def()
        }
    }

    impl ActiveModelBehavior for ActiveModel {}

    impl Model {
        pub async fn create(
            db: &DatabaseConnection,
            user_id: i64,
            expiry_days: u64,
        ) -> Result<Self, DbErr> {
            let active = ActiveModel {
                token: Set(super::generate_token()),
                user_id: Set(user_id),
                revoked: Set(false),
                expires_at: Set(Utc::now() + Duration::days(expiry_days as i64)),
                created_at: Set(Utc::now()),
                updated_at: Set(Utc::now()),
                ..Default::default()
            };
            active.insert(db).await
        }

        pub async fn find_valid(
            db: &DatabaseConnection,
            token: &str,
        ) -> Result<Option<Self>, DbErr> {
            Entity::find()
                .filter(Column::Token.eq(token))
                .filter(Column::Revoked.eq(false))
                .filter(Column::ExpiresAt.gt(Utc::now()))
                .one(db)
                .await
        }

        pub async fn revoke(db: &DatabaseConnection, token: &str) -> Result<bool, DbErr> {
            let Some(record) = Entity::find()
                .filter(Column::Token.eq(token))
                .one(db)
                .await?
            else {
                return Ok(false);
            };
            let mut active: ActiveModel = record.into();
            active.revoked = Set(true);
            active.updated_at = Set(Utc::now());
            active.update(db).await?;
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::models::student as students;
    use crate::test_utils::setup_test_db;

    #[tokio::test]
    async fn valid_tokens_are_found_and_revocation_hides_them() {
        let db = setup_test_db().await;
        let student = students::Model::create(&db, "u20000001", "Thabo", "Nkosi", "thabo@test.com", None)
            .await
            .unwrap();

        let issued = super::student::Model::create(&db, student.id, 7).await.unwrap();
        assert_eq!(issued.token.len(), 64);

        let found = super::student::Model::find_valid(&db, &issued.token)
            .await
            .unwrap();
        assert!(found.is_some());

        assert!(super::student::Model::revoke(&db, &issued.token).await.unwrap());
        let gone = super::student::Model::find_valid(&db, &issued.token)
            .await
            .unwrap();
        assert!(gone.is_none());
    }

    #[tokio::test]
    async fn unknown_tokens_are_not_found() {
        let db = setup_test_db().await;
        let found = super::student::Model::find_valid(&db, "nope").await.unwrap();
        assert!(found.is_none());
        assert!(!super::student::Model::revoke(&db, "nope").await.unwrap());
    }
}
