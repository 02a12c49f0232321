use sea_orm_migration::prelude::*;

pub struct Migration;

impl MigrationName for Migration {
    fn name(&self) -> &str {
        "m202601120011_create_refresh_tokens"
    }
}

/// The three refresh-token tables are identical apart from which user table
/// they reference.
fn refresh_token_table(table: &str, owner_table: &str) -> TableCreateStatement {
    Table::create()
        .table(Alias::new(table))
        .if_not_exists()
        .col(
            ColumnDef::new(Alias::new("id"))
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(
            ColumnDef::new(Alias::new("token"))
                .string()
                .not_null()
                .unique_key(),
        )
        .col(
            ColumnDef::new(Alias::new("user_id"))
                .big_integer()
                .not_null(),
        )
        .col(
            ColumnDef::new(Alias::new("revoked"))
                .boolean()
                .not_null()
                .default(false),
        )
        .col(
            ColumnDef::new(Alias::new("expires_at"))
                .timestamp()
                .not_null(),
        )
        .col(
            ColumnDef::new(Alias::new("created_at"))
                .timestamp()
                .not_null()
                .default(Expr::cust("CURRENT_TIMESTAMP")),
        )
        .col(
            ColumnDef::new(Alias::new("updated_at"))
                .timestamp()
                .not_null()
                .default(Expr::cust("CURRENT_TIMESTAMP")),
        )
        .foreign_key(
            ForeignKey::create()
                .from(Alias::new(table), Alias::new("user_id"))
                .to(Alias::new(owner_table), Alias::new("id"))
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(refresh_token_table("refresh_student_tokens", "students"))
            .await?;
        manager
            .create_table(refresh_token_table(
                "refresh_supervisor_tokens",
                "supervisors",
            ))
            .await?;
        manager
            .create_table(refresh_token_table("refresh_admin_tokens", "admins"))
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("refresh_student_tokens"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("refresh_supervisor_tokens"))
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(Alias::new("refresh_admin_tokens"))
                    .to_owned(),
            )
            .await
    }
}
