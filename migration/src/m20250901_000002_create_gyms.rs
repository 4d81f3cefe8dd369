use sea_orm_migration::prelude::*;

use crate::m20250901_000001_create_accounts::{Customers, GymManagers, Users};

#[derive(DeriveIden)]
pub enum Gyms {
    Table,
    Id,
    ManagerId,
    Title,
    Location,
    Address,
    MainImg,
    Phone,
    HeadlinePhone,
    Gender,
    CommissionType,
    Facilities,
    Description,
    WorkHoursPerDay,
    WorkDaysPerWeek,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum MembershipTypes {
    Table,
    Id,
    GymId,
    Title,
    Days,
    Price,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum GymSecretaries {
    Table,
    Id,
    UserId,
    GymId,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum GymImages {
    Table,
    Id,
    GymId,
    ImageUrl,
    Title,
    CreatedAt,
}

#[derive(DeriveIden, Clone, Copy)]
enum GymBanners {
    Table,
    Id,
    GymId,
    ImageUrl,
    Title,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BlockLists {
    Table,
    Id,
    CustomerId,
    GymId,
    Description,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Rates {
    Table,
    Id,
    CustomerId,
    GymId,
    Rate,
    CreatedAt,
}

/// Image-like tables (images and banners) share one layout.
fn gym_media_table<T>(
    table: T,
    id: T,
    gym_id: T,
    image_url: T,
    title: T,
    created_at: T,
    fk: &str,
) -> TableCreateStatement
where
    T: IntoIden + Copy + 'static,
{
    Table::create()
        .table(table)
        .if_not_exists()
        .col(
            ColumnDef::new(id)
                .big_integer()
                .not_null()
                .auto_increment()
                .primary_key(),
        )
        .col(ColumnDef::new(gym_id).big_integer().not_null())
        .col(ColumnDef::new(image_url).string_len(1024).not_null())
        .col(ColumnDef::new(title).string_len(255).null())
        .col(
            ColumnDef::new(created_at)
                .timestamp_with_time_zone()
                .not_null()
                .default(Expr::current_timestamp()),
        )
        .foreign_key(
            ForeignKey::create()
                .name(fk)
                .from(table, gym_id)
                .to(Gyms::Table, Gyms::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Gyms::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Gyms::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Gyms::ManagerId).big_integer().not_null())
                    .col(ColumnDef::new(Gyms::Title).string_len(255).not_null())
                    .col(ColumnDef::new(Gyms::Location).string_len(255).null())
                    .col(ColumnDef::new(Gyms::Address).text().null())
                    .col(ColumnDef::new(Gyms::MainImg).string_len(1024).null())
                    .col(ColumnDef::new(Gyms::Phone).string_len(20).null())
                    .col(ColumnDef::new(Gyms::HeadlinePhone).string_len(20).null())
                    .col(
                        ColumnDef::new(Gyms::Gender)
                            .string_len(16)
                            .not_null()
                            .default("both"),
                    )
                    .col(
                        ColumnDef::new(Gyms::CommissionType)
                            .string_len(16)
                            .not_null()
                            .default("monthly"),
                    )
                    .col(ColumnDef::new(Gyms::Facilities).text().null())
                    .col(ColumnDef::new(Gyms::Description).text().null())
                    .col(ColumnDef::new(Gyms::WorkHoursPerDay).integer().null())
                    .col(ColumnDef::new(Gyms::WorkDaysPerWeek).integer().null())
                    .col(
                        ColumnDef::new(Gyms::IsActive)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Gyms::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gyms_manager_id")
                            .from(Gyms::Table, Gyms::ManagerId)
                            .to(GymManagers::Table, GymManagers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_gyms_manager_id")
                    .table(Gyms::Table)
                    .col(Gyms::ManagerId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GymSecretaries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GymSecretaries::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GymSecretaries::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(GymSecretaries::GymId).big_integer().not_null())
                    .col(
                        ColumnDef::new(GymSecretaries::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gym_secretaries_user_id")
                            .from(GymSecretaries::Table, GymSecretaries::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gym_secretaries_gym_id")
                            .from(GymSecretaries::Table, GymSecretaries::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(MembershipTypes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(MembershipTypes::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(MembershipTypes::GymId).big_integer().not_null())
                    .col(ColumnDef::new(MembershipTypes::Title).string_len(255).not_null())
                    .col(ColumnDef::new(MembershipTypes::Days).integer().not_null())
                    .col(ColumnDef::new(MembershipTypes::Price).big_integer().not_null())
                    .col(ColumnDef::new(MembershipTypes::Description).text().null())
                    .col(
                        ColumnDef::new(MembershipTypes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_membership_types_gym_id")
                            .from(MembershipTypes::Table, MembershipTypes::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(gym_media_table(
                GymImages::Table,
                GymImages::Id,
                GymImages::GymId,
                GymImages::ImageUrl,
                GymImages::Title,
                GymImages::CreatedAt,
                "fk_gym_images_gym_id",
            ))
            .await?;

        manager
            .create_table(gym_media_table(
                GymBanners::Table,
                GymBanners::Id,
                GymBanners::GymId,
                GymBanners::ImageUrl,
                GymBanners::Title,
                GymBanners::CreatedAt,
                "fk_gym_banners_gym_id",
            ))
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlockLists::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlockLists::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BlockLists::CustomerId).big_integer().not_null())
                    .col(ColumnDef::new(BlockLists::GymId).big_integer().not_null())
                    .col(ColumnDef::new(BlockLists::Description).text().null())
                    .col(
                        ColumnDef::new(BlockLists::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_block_lists_customer_id")
                            .from(BlockLists::Table, BlockLists::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_block_lists_gym_id")
                            .from(BlockLists::Table, BlockLists::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Rates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Rates::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Rates::CustomerId).big_integer().not_null())
                    .col(ColumnDef::new(Rates::GymId).big_integer().not_null())
                    .col(ColumnDef::new(Rates::Rate).small_integer().not_null())
                    .col(
                        ColumnDef::new(Rates::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rates_customer_id")
                            .from(Rates::Table, Rates::CustomerId)
                            .to(Customers::Table, Customers::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_rates_gym_id")
                            .from(Rates::Table, Rates::GymId)
                            .to(Gyms::Table, Gyms::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Rates::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BlockLists::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GymBanners::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GymImages::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(MembershipTypes::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GymSecretaries::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Gyms::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
