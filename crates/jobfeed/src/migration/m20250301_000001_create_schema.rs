//! Initial migration to create the jobfeed database schema.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        self.create_jobs(manager).await?;
        self.create_job_locations(manager).await?;
        self.create_job_contacts(manager).await?;
        self.create_job_categories(manager).await?;
        self.create_job_occupations(manager).await?;
        self.create_feed_cursor(manager).await?;
        self.create_system_parameters(manager).await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SystemParameters::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(FeedCursor::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobOccupations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobContacts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(JobLocations::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Jobs::Table).to_owned())
            .await?;
        Ok(())
    }
}

impl Migration {
    async fn create_jobs(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Jobs::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Jobs::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Jobs::Status).string().null())
                    // Posting
                    .col(ColumnDef::new(Jobs::Title).string().null())
                    .col(ColumnDef::new(Jobs::JobTitle).string().null())
                    .col(ColumnDef::new(Jobs::Description).text().null())
                    .col(ColumnDef::new(Jobs::JobUrl).text().null())
                    .col(ColumnDef::new(Jobs::ApplicationUrl).text().null())
                    .col(ColumnDef::new(Jobs::Source).string().null())
                    .col(ColumnDef::new(Jobs::SourceUrl).text().null())
                    // Employer
                    .col(ColumnDef::new(Jobs::EmployerName).string().null())
                    .col(ColumnDef::new(Jobs::EmployerOrgnr).string().null())
                    .col(ColumnDef::new(Jobs::EmployerDescription).text().null())
                    .col(ColumnDef::new(Jobs::EmployerHomepage).text().null())
                    // Place
                    .col(ColumnDef::new(Jobs::Municipality).string().null())
                    .col(ColumnDef::new(Jobs::County).string().null())
                    // Terms
                    .col(ColumnDef::new(Jobs::Extent).string().null())
                    .col(ColumnDef::new(Jobs::EngagementType).string().null())
                    .col(ColumnDef::new(Jobs::StartTime).string().null())
                    .col(ColumnDef::new(Jobs::Sector).string().null())
                    .col(ColumnDef::new(Jobs::PositionCount).integer().null())
                    // Dates
                    .col(
                        ColumnDef::new(Jobs::Published)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Jobs::Expires)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(Jobs::ApplicationDue)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(ColumnDef::new(Jobs::ApplicationDueText).string().null())
                    .col(
                        ColumnDef::new(Jobs::UpstreamUpdatedAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    // Tracking
                    .col(
                        ColumnDef::new(Jobs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Jobs::SyncedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_published")
                    .table(Jobs::Table)
                    .col(Jobs::Published)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_jobs_status")
                    .table(Jobs::Table)
                    .col(Jobs::Status)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn create_job_locations(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobLocations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobLocations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobLocations::JobId).string().not_null())
                    .col(ColumnDef::new(JobLocations::Address).string().null())
                    .col(ColumnDef::new(JobLocations::City).string().null())
                    .col(ColumnDef::new(JobLocations::PostalCode).string().null())
                    .col(ColumnDef::new(JobLocations::Country).string().null())
                    .col(ColumnDef::new(JobLocations::Municipality).string().null())
                    .col(ColumnDef::new(JobLocations::County).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_locations_job")
                            .from(JobLocations::Table, JobLocations::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_locations_job")
                    .table(JobLocations::Table)
                    .col(JobLocations::JobId)
                    .to_owned(),
            )
            .await
    }

    async fn create_job_contacts(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobContacts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobContacts::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobContacts::JobId).string().not_null())
                    .col(ColumnDef::new(JobContacts::Name).string().null())
                    .col(ColumnDef::new(JobContacts::Email).string().null())
                    .col(ColumnDef::new(JobContacts::Phone).string().null())
                    .col(ColumnDef::new(JobContacts::Role).string().null())
                    .col(ColumnDef::new(JobContacts::Title).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_contacts_job")
                            .from(JobContacts::Table, JobContacts::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_contacts_job")
                    .table(JobContacts::Table)
                    .col(JobContacts::JobId)
                    .to_owned(),
            )
            .await
    }

    async fn create_job_categories(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobCategories::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobCategories::JobId).string().not_null())
                    .col(ColumnDef::new(JobCategories::CategoryType).string().null())
                    .col(ColumnDef::new(JobCategories::Code).string().null())
                    .col(ColumnDef::new(JobCategories::Name).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_categories_job")
                            .from(JobCategories::Table, JobCategories::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_categories_job")
                    .table(JobCategories::Table)
                    .col(JobCategories::JobId)
                    .to_owned(),
            )
            .await
    }

    async fn create_job_occupations(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(JobOccupations::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(JobOccupations::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(JobOccupations::JobId).string().not_null())
                    .col(ColumnDef::new(JobOccupations::Level1).string().null())
                    .col(ColumnDef::new(JobOccupations::Level2).string().null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_job_occupations_job")
                            .from(JobOccupations::Table, JobOccupations::JobId)
                            .to(Jobs::Table, Jobs::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_job_occupations_job")
                    .table(JobOccupations::Table)
                    .col(JobOccupations::JobId)
                    .to_owned(),
            )
            .await
    }

    async fn create_feed_cursor(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(FeedCursor::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FeedCursor::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(FeedCursor::NextLocator).text().not_null())
                    .col(
                        ColumnDef::new(FeedCursor::LastSeenDate)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(FeedCursor::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(FeedCursor::Title).string().null())
                    .col(ColumnDef::new(FeedCursor::HomePageUrl).text().null())
                    .col(ColumnDef::new(FeedCursor::FeedUrl).text().null())
                    .col(ColumnDef::new(FeedCursor::Description).text().null())
                    .to_owned(),
            )
            .await
    }

    async fn create_system_parameters(&self, manager: &SchemaManager<'_>) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SystemParameters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SystemParameters::Key)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SystemParameters::Value).text().not_null())
                    .col(
                        ColumnDef::new(SystemParameters::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }
}

#[derive(DeriveIden)]
enum Jobs {
    Table,
    Id,
    Status,
    Title,
    JobTitle,
    Description,
    JobUrl,
    ApplicationUrl,
    Source,
    SourceUrl,
    EmployerName,
    EmployerOrgnr,
    EmployerDescription,
    EmployerHomepage,
    Municipality,
    County,
    Extent,
    EngagementType,
    StartTime,
    Sector,
    PositionCount,
    Published,
    Expires,
    ApplicationDue,
    ApplicationDueText,
    UpstreamUpdatedAt,
    CreatedAt,
    SyncedAt,
}

#[derive(DeriveIden)]
enum JobLocations {
    Table,
    Id,
    JobId,
    Address,
    City,
    PostalCode,
    Country,
    Municipality,
    County,
}

#[derive(DeriveIden)]
enum JobContacts {
    Table,
    Id,
    JobId,
    Name,
    Email,
    Phone,
    Role,
    Title,
}

#[derive(DeriveIden)]
enum JobCategories {
    Table,
    Id,
    JobId,
    CategoryType,
    Code,
    Name,
}

#[derive(DeriveIden)]
enum JobOccupations {
    Table,
    Id,
    JobId,
    #[sea_orm(iden = "level1")]
    Level1,
    #[sea_orm(iden = "level2")]
    Level2,
}

#[derive(DeriveIden)]
#[sea_orm(iden = "feed_cursor")]
enum FeedCursor {
    Table,
    Id,
    NextLocator,
    LastSeenDate,
    UpdatedAt,
    Title,
    HomePageUrl,
    FeedUrl,
    Description,
}

#[derive(DeriveIden)]
enum SystemParameters {
    Table,
    Key,
    Value,
    UpdatedAt,
}
