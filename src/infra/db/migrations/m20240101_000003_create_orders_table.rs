//! Migration: Create orders table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Orders::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Orders::Id).uuid().not_null().primary_key())
                    // Weak reference to users.firebase_uid, no cascade
                    .col(ColumnDef::new(Orders::FirebaseUid).string().not_null())
                    .col(ColumnDef::new(Orders::UserEmail).string().not_null())
                    .col(ColumnDef::new(Orders::UserName).string().not_null())
                    .col(ColumnDef::new(Orders::Items).json_binary().not_null())
                    .col(ColumnDef::new(Orders::Subtotal).string().not_null())
                    .col(ColumnDef::new(Orders::Tax).string().not_null())
                    .col(ColumnDef::new(Orders::Total).string().not_null())
                    .col(
                        ColumnDef::new(Orders::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Orders::PreparationTime).string().null())
                    .col(ColumnDef::new(Orders::RejectionReason).text().null())
                    .col(ColumnDef::new(Orders::CancelledBy).string().null())
                    .col(
                        ColumnDef::new(Orders::GuestArrived)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Orders::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Orders::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_firebase_uid")
                    .table(Orders::Table)
                    .col(Orders::FirebaseUid)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_orders_created_at")
                    .table(Orders::Table)
                    .col(Orders::CreatedAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Orders::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Orders {
    Table,
    Id,
    FirebaseUid,
    UserEmail,
    UserName,
    Items,
    Subtotal,
    Tax,
    Total,
    Status,
    PreparationTime,
    RejectionReason,
    CancelledBy,
    GuestArrived,
    CreatedAt,
    UpdatedAt,
}
