//! Migration: Create menu_items table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(MenuItems::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(MenuItems::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(MenuItems::Name).string().not_null())
                    .col(ColumnDef::new(MenuItems::Description).text().not_null())
                    .col(ColumnDef::new(MenuItems::Price).string().not_null())
                    .col(ColumnDef::new(MenuItems::Calories).integer().not_null())
                    .col(ColumnDef::new(MenuItems::Protein).integer().not_null())
                    .col(ColumnDef::new(MenuItems::Image).string().not_null())
                    .col(ColumnDef::new(MenuItems::Category).string().not_null())
                    .col(
                        ColumnDef::new(MenuItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(MenuItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_menu_items_category")
                    .table(MenuItems::Table)
                    .col(MenuItems::Category)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(MenuItems::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum MenuItems {
    Table,
    Id,
    Name,
    Description,
    Price,
    Calories,
    Protein,
    Image,
    Category,
    CreatedAt,
    UpdatedAt,
}
