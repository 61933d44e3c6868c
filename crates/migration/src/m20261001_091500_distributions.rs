use sea_orm_migration::prelude::*;

use super::m20261001_090000_users::Users;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Distributions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Distributions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Distributions::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Distributions::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Distributions::Friends).string().not_null())
                    .col(ColumnDef::new(Distributions::Spender).string().not_null())
                    .col(
                        ColumnDef::new(Distributions::Description)
                            .string()
                            .not_null(),
                    )
                    // Friend -> spender -> payments, serialized as JSON text.
                    .col(
                        ColumnDef::new(Distributions::Distribution)
                            .text()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Distributions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-distributions-user_id")
                            .from(Distributions::Table, Distributions::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-distributions-user_id-created_at")
                    .table(Distributions::Table)
                    .col(Distributions::UserId)
                    .col(Distributions::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Distributions::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
pub enum Distributions {
    Table,
    Id,
    UserId,
    AmountMinor,
    Friends,
    Spender,
    Description,
    Distribution,
    CreatedAt,
}
