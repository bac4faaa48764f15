use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Ratings::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Ratings::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Ratings::UserId).uuid().not_null())
                    .col(ColumnDef::new(Ratings::ProductId).big_integer().not_null())
                    .col(ColumnDef::new(Ratings::Content).text().not_null())
                    .col(
                        ColumnDef::new(Ratings::NumberStars)
                            .small_integer()
                            .not_null()
                            .check(Expr::col(Ratings::NumberStars).between(1, 5)),
                    )
                    .col(ColumnDef::new(Ratings::AdminResponse).text())
                    .col(
                        ColumnDef::new(Ratings::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Ratings::CreatedBy).string().not_null())
                    .col(ColumnDef::new(Ratings::UpdatedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Ratings::UpdatedBy).string())
                    .foreign_key(
                        ForeignKey::create()
                            .from(Ratings::Table, Ratings::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .table(Ratings::Table)
                    .col(Ratings::ProductId)
                    .col(Ratings::CreatedAt)
                    .name("idx_ratings_product_id_created_at")
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Ratings::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Ratings {
    Table,
    Id,
    UserId,
    ProductId,
    Content,
    NumberStars,
    AdminResponse,
    CreatedAt,
    CreatedBy,
    UpdatedAt,
    UpdatedBy,
}

#[derive(Iden)]
enum Users {
    Table,
    Id,
}
