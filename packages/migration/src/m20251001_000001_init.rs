use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_query::{ColumnDef, ForeignKeyAction, Index, Table};

#[derive(DeriveMigrationName)]
pub struct Migration;

// ----- Iden enums for tables & columns -----
#[derive(Iden)]
enum Users {
    Table,
    Id,
    Sub,
    Username,
    Role,
    Bio,
    Location,
    Phone,
    KennelName,
    PayoutRecipientCode,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum UserCredentials {
    Table,
    Id,
    UserId,
    Email,
    GoogleSub,
    LastLogin,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Breeds {
    Table,
    Id,
    Name,
    Species,
    Size,
    Description,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Listings {
    Table,
    Id,
    BreederId,
    BreedId,
    Kind,
    Title,
    Description,
    Sex,
    Location,
    Price,
    ReservationFee,
    Currency,
    TotalCount,
    AvailableCount,
    Status,
    AvailableFrom,
    PublishedAt,
    LockVersion,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Applications {
    Table,
    Id,
    ListingId,
    SeekerId,
    Status,
    Message,
    Household,
    HasOtherPets,
    PreferredSex,
    DecidedAt,
    LockVersion,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ApplicationEvents {
    Table,
    Id,
    ApplicationId,
    FromStatus,
    ToStatus,
    ActorId,
    ActorRole,
    Note,
    CreatedAt,
}

#[derive(Iden)]
enum Payouts {
    Table,
    Id,
    BreederId,
    Currency,
    GrossAmount,
    CommissionAmount,
    NetAmount,
    CommissionBps,
    Status,
    TransferReference,
    TransferCode,
    FailureReason,
    CreatedBy,
    CreatedAt,
    UpdatedAt,
    ProcessedAt,
}

#[derive(Iden)]
enum Transactions {
    Table,
    Id,
    ApplicationId,
    PayerId,
    BreederId,
    Kind,
    Amount,
    Currency,
    Reference,
    Status,
    AuthorizationUrl,
    GatewayStatus,
    FailureReason,
    VerifyAttempts,
    PaidAt,
    PayoutId,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    UserId,
    Kind,
    Title,
    Body,
    Link,
    ReadAt,
    CreatedAt,
}

fn id_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .big_integer()
        .not_null()
        .primary_key()
        .auto_increment()
        .to_owned()
}

fn ts_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .not_null()
        .to_owned()
}

fn ts_null_col<T: IntoIden>(col: T) -> ColumnDef {
    ColumnDef::new(col)
        .timestamp_with_time_zone()
        .null()
        .to_owned()
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(id_col(Users::Id))
                    .col(ColumnDef::new(Users::Sub).string().not_null())
                    .col(ColumnDef::new(Users::Username).string().null())
                    .col(
                        ColumnDef::new(Users::Role)
                            .string_len(16)
                            .not_null()
                            .default("seeker"),
                    )
                    .col(ColumnDef::new(Users::Bio).text().null())
                    .col(ColumnDef::new(Users::Location).string().null())
                    .col(ColumnDef::new(Users::Phone).string().null())
                    .col(ColumnDef::new(Users::KennelName).string().null())
                    .col(ColumnDef::new(Users::PayoutRecipientCode).string().null())
                    .col(ts_col(Users::CreatedAt))
                    .col(ts_col(Users::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_users_sub")
                    .table(Users::Table)
                    .col(Users::Sub)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // user_credentials
        manager
            .create_table(
                Table::create()
                    .table(UserCredentials::Table)
                    .if_not_exists()
                    .col(id_col(UserCredentials::Id))
                    .col(
                        ColumnDef::new(UserCredentials::UserId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(UserCredentials::Email)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(UserCredentials::GoogleSub)
                            .string()
                            .null()
                            .unique_key(),
                    )
                    .col(ts_null_col(UserCredentials::LastLogin))
                    .col(ts_col(UserCredentials::CreatedAt))
                    .col(ts_col(UserCredentials::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_credentials_user_id")
                            .from(UserCredentials::Table, UserCredentials::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ux_user_credentials_user_id")
                    .table(UserCredentials::Table)
                    .col(UserCredentials::UserId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // breeds catalog
        manager
            .create_table(
                Table::create()
                    .table(Breeds::Table)
                    .if_not_exists()
                    .col(id_col(Breeds::Id))
                    .col(
                        ColumnDef::new(Breeds::Name)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Breeds::Species)
                            .string_len(16)
                            .not_null()
                            .default("dog"),
                    )
                    .col(ColumnDef::new(Breeds::Size).string_len(16).null())
                    .col(ColumnDef::new(Breeds::Description).text().null())
                    .col(ts_col(Breeds::CreatedAt))
                    .col(ts_col(Breeds::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        // listings
        manager
            .create_table(
                Table::create()
                    .table(Listings::Table)
                    .if_not_exists()
                    .col(id_col(Listings::Id))
                    .col(ColumnDef::new(Listings::BreederId).big_integer().not_null())
                    .col(ColumnDef::new(Listings::BreedId).big_integer().not_null())
                    .col(ColumnDef::new(Listings::Kind).string_len(16).not_null())
                    .col(ColumnDef::new(Listings::Title).string().not_null())
                    .col(ColumnDef::new(Listings::Description).text().null())
                    .col(ColumnDef::new(Listings::Sex).string_len(16).null())
                    .col(ColumnDef::new(Listings::Location).string().null())
                    .col(ColumnDef::new(Listings::Price).big_integer().not_null())
                    .col(
                        ColumnDef::new(Listings::ReservationFee)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Listings::Currency).string_len(3).not_null())
                    .col(ColumnDef::new(Listings::TotalCount).integer().not_null())
                    .col(
                        ColumnDef::new(Listings::AvailableCount)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Listings::Status)
                            .string_len(16)
                            .not_null()
                            .default("draft"),
                    )
                    .col(ts_null_col(Listings::AvailableFrom))
                    .col(ts_null_col(Listings::PublishedAt))
                    .col(
                        ColumnDef::new(Listings::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ts_col(Listings::CreatedAt))
                    .col(ts_col(Listings::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_breeder_id")
                            .from(Listings::Table, Listings::BreederId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_listings_breed_id")
                            .from(Listings::Table, Listings::BreedId)
                            .to(Breeds::Table, Breeds::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("ix_listings_breeder_id", Listings::BreederId),
            ("ix_listings_breed_id", Listings::BreedId),
            ("ix_listings_status", Listings::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Listings::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        // applications
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(id_col(Applications::Id))
                    .col(
                        ColumnDef::new(Applications::ListingId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::SeekerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Applications::Status)
                            .string_len(24)
                            .not_null()
                            .default("submitted"),
                    )
                    .col(ColumnDef::new(Applications::Message).text().not_null())
                    .col(ColumnDef::new(Applications::Household).text().null())
                    .col(
                        ColumnDef::new(Applications::HasOtherPets)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Applications::PreferredSex)
                            .string_len(16)
                            .null(),
                    )
                    .col(ts_null_col(Applications::DecidedAt))
                    .col(
                        ColumnDef::new(Applications::LockVersion)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(ts_col(Applications::CreatedAt))
                    .col(ts_col(Applications::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_listing_id")
                            .from(Applications::Table, Applications::ListingId)
                            .to(Listings::Table, Listings::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_applications_seeker_id")
                            .from(Applications::Table, Applications::SeekerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("ix_applications_listing_id", Applications::ListingId),
            ("ix_applications_seeker_id", Applications::SeekerId),
            ("ix_applications_status", Applications::Status),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Applications::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        // application_events (transition history)
        manager
            .create_table(
                Table::create()
                    .table(ApplicationEvents::Table)
                    .if_not_exists()
                    .col(id_col(ApplicationEvents::Id))
                    .col(
                        ColumnDef::new(ApplicationEvents::ApplicationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApplicationEvents::FromStatus)
                            .string_len(24)
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ApplicationEvents::ToStatus)
                            .string_len(24)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ApplicationEvents::ActorId)
                            .big_integer()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ApplicationEvents::ActorRole)
                            .string_len(16)
                            .not_null(),
                    )
                    .col(ColumnDef::new(ApplicationEvents::Note).text().null())
                    .col(ts_col(ApplicationEvents::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_events_application_id")
                            .from(ApplicationEvents::Table, ApplicationEvents::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_application_events_actor_id")
                            .from(ApplicationEvents::Table, ApplicationEvents::ActorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_application_events_application_id")
                    .table(ApplicationEvents::Table)
                    .col(ApplicationEvents::ApplicationId)
                    .to_owned(),
            )
            .await?;

        // payouts (before transactions: transactions.payout_id references it)
        manager
            .create_table(
                Table::create()
                    .table(Payouts::Table)
                    .if_not_exists()
                    .col(id_col(Payouts::Id))
                    .col(ColumnDef::new(Payouts::BreederId).big_integer().not_null())
                    .col(ColumnDef::new(Payouts::Currency).string_len(3).not_null())
                    .col(
                        ColumnDef::new(Payouts::GrossAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Payouts::CommissionAmount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Payouts::NetAmount).big_integer().not_null())
                    .col(ColumnDef::new(Payouts::CommissionBps).integer().not_null())
                    .col(
                        ColumnDef::new(Payouts::Status)
                            .string_len(16)
                            .not_null()
                            .default("processing"),
                    )
                    .col(
                        ColumnDef::new(Payouts::TransferReference)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Payouts::TransferCode).string().null())
                    .col(ColumnDef::new(Payouts::FailureReason).text().null())
                    .col(ColumnDef::new(Payouts::CreatedBy).big_integer().null())
                    .col(ts_col(Payouts::CreatedAt))
                    .col(ts_col(Payouts::UpdatedAt))
                    .col(ts_null_col(Payouts::ProcessedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payouts_breeder_id")
                            .from(Payouts::Table, Payouts::BreederId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_payouts_created_by")
                            .from(Payouts::Table, Payouts::CreatedBy)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        // transactions
        manager
            .create_table(
                Table::create()
                    .table(Transactions::Table)
                    .if_not_exists()
                    .col(id_col(Transactions::Id))
                    .col(
                        ColumnDef::new(Transactions::ApplicationId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::PayerId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::BreederId)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transactions::Kind).string_len(24).not_null())
                    .col(ColumnDef::new(Transactions::Amount).big_integer().not_null())
                    .col(
                        ColumnDef::new(Transactions::Currency)
                            .string_len(3)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Reference)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Transactions::Status)
                            .string_len(16)
                            .not_null()
                            .default("pending"),
                    )
                    .col(ColumnDef::new(Transactions::AuthorizationUrl).text().null())
                    .col(ColumnDef::new(Transactions::GatewayStatus).string().null())
                    .col(ColumnDef::new(Transactions::FailureReason).text().null())
                    .col(
                        ColumnDef::new(Transactions::VerifyAttempts)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ts_null_col(Transactions::PaidAt))
                    .col(ColumnDef::new(Transactions::PayoutId).big_integer().null())
                    .col(ts_col(Transactions::CreatedAt))
                    .col(ts_col(Transactions::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_application_id")
                            .from(Transactions::Table, Transactions::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_payer_id")
                            .from(Transactions::Table, Transactions::PayerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_breeder_id")
                            .from(Transactions::Table, Transactions::BreederId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_transactions_payout_id")
                            .from(Transactions::Table, Transactions::PayoutId)
                            .to(Payouts::Table, Payouts::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, col) in [
            ("ix_transactions_application_id", Transactions::ApplicationId),
            ("ix_transactions_breeder_id", Transactions::BreederId),
            ("ix_transactions_payout_id", Transactions::PayoutId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Transactions::Table)
                        .col(col)
                        .to_owned(),
                )
                .await?;
        }

        // notifications
        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(id_col(Notifications::Id))
                    .col(ColumnDef::new(Notifications::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Notifications::Kind).string_len(40).not_null())
                    .col(ColumnDef::new(Notifications::Title).string().not_null())
                    .col(ColumnDef::new(Notifications::Body).text().not_null())
                    .col(ColumnDef::new(Notifications::Link).string().null())
                    .col(ts_null_col(Notifications::ReadAt))
                    .col(ts_col(Notifications::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_user_id")
                            .from(Notifications::Table, Notifications::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("ix_notifications_user_id")
                    .table(Notifications::Table)
                    .col(Notifications::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Reverse dependency order; dropping a table drops its indexes.
        manager
            .drop_table(Table::drop().table(Notifications::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Transactions::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Payouts::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(ApplicationEvents::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Applications::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Listings::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Breeds::Table).if_exists().to_owned())
            .await?;
        manager
            .drop_table(
                Table::drop()
                    .table(UserCredentials::Table)
                    .if_exists()
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).if_exists().to_owned())
            .await?;

        Ok(())
    }
}
