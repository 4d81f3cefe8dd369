use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
pub enum Users {
    Table,
    Id,
    Phone,
    FullName,
    Email,
    PasswordHash,
    IsActive,
    IsDeleted,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
pub enum Customers {
    Table,
    Id,
    UserId,
    NationalCode,
    City,
    Gender,
    ProfilePhoto,
    Balance,
    IsDeleted,
    CreatedAt,
}

#[derive(DeriveIden)]
pub enum GymManagers {
    Table,
    Id,
    UserId,
    NationalCode,
    VerificationCode,
    City,
    InvitationCode,
    Balance,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PlatformManagers {
    Table,
    Id,
    UserId,
    AccessCode,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ApiKeys {
    Table,
    Id,
    Key,
    ClientName,
    IsActive,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Otps {
    Table,
    Id,
    Phone,
    Code,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveIden)]
enum BlacklistedTokens {
    Table,
    Id,
    Jti,
    UserId,
    ExpiresAt,
    CreatedAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Phone)
                            .string_len(11)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FullName).string_len(255).not_null())
                    .col(ColumnDef::new(Users::Email).string_len(255).null().unique_key())
                    .col(ColumnDef::new(Users::PasswordHash).string_len(255).null())
                    .col(
                        ColumnDef::new(Users::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Users::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Customers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Customers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Customers::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Customers::NationalCode).string_len(50).null())
                    .col(ColumnDef::new(Customers::City).string_len(255).null())
                    .col(ColumnDef::new(Customers::Gender).string_len(16).null())
                    .col(ColumnDef::new(Customers::ProfilePhoto).string_len(1024).null())
                    .col(
                        ColumnDef::new(Customers::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Customers::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Customers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_customers_user_id")
                            .from(Customers::Table, Customers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(GymManagers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(GymManagers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(GymManagers::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(GymManagers::NationalCode).string_len(50).null())
                    .col(ColumnDef::new(GymManagers::VerificationCode).string_len(100).null())
                    .col(ColumnDef::new(GymManagers::City).string_len(255).null())
                    .col(ColumnDef::new(GymManagers::InvitationCode).string_len(100).null())
                    .col(
                        ColumnDef::new(GymManagers::Balance)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(GymManagers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_gym_managers_user_id")
                            .from(GymManagers::Table, GymManagers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PlatformManagers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PlatformManagers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(PlatformManagers::UserId)
                            .big_integer()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(PlatformManagers::AccessCode).string_len(100).not_null())
                    .col(
                        ColumnDef::new(PlatformManagers::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_platform_managers_user_id")
                            .from(PlatformManagers::Table, PlatformManagers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ApiKeys::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ApiKeys::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ApiKeys::Key)
                            .string_len(255)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(ApiKeys::ClientName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(ApiKeys::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ApiKeys::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // one live code per phone
        manager
            .create_table(
                Table::create()
                    .table(Otps::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Otps::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Otps::Phone)
                            .string_len(11)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Otps::Code).string_len(8).not_null())
                    .col(
                        ColumnDef::new(Otps::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Otps::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(BlacklistedTokens::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BlacklistedTokens::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(BlacklistedTokens::Jti)
                            .string_len(64)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(BlacklistedTokens::UserId).big_integer().not_null())
                    .col(
                        ColumnDef::new(BlacklistedTokens::ExpiresAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BlacklistedTokens::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BlacklistedTokens::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Otps::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ApiKeys::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PlatformManagers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(GymManagers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Customers::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;
        Ok(())
    }
}
