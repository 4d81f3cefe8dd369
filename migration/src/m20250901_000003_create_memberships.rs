use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_accounts::{Customers, Users};
use crate::m20250901_000002_create_gyms::{Gyms, MembershipTypes};

#[derive(DeriveIden)]
enum Transactions {
    Table,
    Id,
    PayerId,
    ReceiverId,
    PaymentMethod,
    OnlineTransaction,
    Price,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Memberships {
    Table,
    Id,
    CustomerId,
    GymId,
    TypeId,
    TransactionId,
    StartDate,
    ValidityDate,
    SessionLeft,
    Price,
    Days,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum InOuts {
    Table,
    Id,
    CustomerId,
    GymId,
    SubscriptionId,
    Closet,
    EnterTime,
    OutTime,
    ConfirmIn,
    CreatedAt,
}

/// Rejects a second open check-in for the same customer and gym. "Open" is
/// a pending request or a confirmed entry without an exit time.
const ONE_OPEN_IN_OUT_INDEX: &str = r#"
CREATE UNIQUE INDEX IF NOT EXISTS idx_in_outs_one_open_per_customer_gym
ON in_outs (customer_id, gym_id)
WHERE confirm_in = FALSE OR (enter_time IS NOT NULL AND out_time IS NULL)
"#;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transactions::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transactions::PayerId).big_integer().null())
                    .col(ColumnDef::new(Transactions::ReceiverId).big_integer().null())
                    .col(
                        ColumnDef::new(Transactions::PaymentMethod)
                            .string_len(16)
                            .not_null()
                            .default("online"),
                    )
                    .col(ColumnDef::new(Transactions::OnlineTransaction).string_len(255).null())
                    .col(
                        ColumnDef::new(Transactions::Price)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Transactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_payer_id")
                            .from(Transactions::Table, Transactions::PayerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_receiver_id")
                            .from(Transactions::Table, Transactions::ReceiverId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Memberships::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Memberships::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Memberships::CustomerId).big_integer().not_null())
                    .col(ColumnDef::new(Memberships::GymId).big_integer().not_null())
                    .col(ColumnDef::new(Memberships::TypeId).big_integer().not_null())
                    .col(ColumnDef::new(Memberships::TransactionId).big_integer().null())
                    .col(ColumnDef::new(Memberships::StartDate).date().not_null())
                    .col(ColumnDef::new(Memberships::ValidityDate).date().null())
                    .col(
                        ColumnDef::new(Memberships::SessionLeft)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Memberships::Price).big_integer().not_null())
                    .col(ColumnDef::new(Memberships::Days).integer().not_null())
                    .col(
                        ColumnDef::new(Memberships::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Memberships::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_customer_id")
                            .from(Memberships::Table, Memberships::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_gym_id")
                            .from(Memberships::Table, Memberships::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_type_id")
                            .from(Memberships::Table, Memberships::TypeId)
                            .to(MembershipTypes::Table, MembershipTypes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_memberships_transaction_id")
                            .from(Memberships::Table, Memberships::TransactionId)
                            .to(Transactions::Table, Transactions::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_memberships_customer_gym")
                    .table(Memberships::Table)
                    .col(Memberships::CustomerId)
                    .col(Memberships::GymId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(InOuts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InOuts::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(InOuts::CustomerId).big_integer().not_null())
                    .col(ColumnDef::new(InOuts::GymId).big_integer().not_null())
                    .col(ColumnDef::new(InOuts::SubscriptionId).big_integer().not_null())
                    .col(ColumnDef::new(InOuts::Closet).string_len(50).null())
                    .col(ColumnDef::new(InOuts::EnterTime).timestamp_with_time_zone().null())
                    .col(ColumnDef::new(InOuts::OutTime).timestamp_with_time_zone().null())
                    .col(
                        ColumnDef::new(InOuts::ConfirmIn)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(InOuts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_in_outs_customer_id")
                            .from(InOuts::Table, InOuts::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_in_outs_gym_id")
                            .from(InOuts::Table, InOuts::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_in_outs_subscription_id")
                            .from(InOuts::Table, InOuts::SubscriptionId)
                            .to(Memberships::Table, Memberships::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // partial indexes are not expressible through the schema builder
        manager
            .get_connection()
            .execute_unprepared(ONE_OPEN_IN_OUT_INDEX)
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(InOuts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Memberships::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
