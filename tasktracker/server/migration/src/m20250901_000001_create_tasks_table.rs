use sea_orm_migration::prelude::*;
use sea_orm_migration::schema::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Tasks {
    Table,
    Id,
    Title,
    Description,
    Priority,
    Status,
    DueDate,
    CompletedAt,
}

const IDX_TASKS_PRIORITY_STATUS: &str = "idx-tasks-priority-status";

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Tasks::Table)
                    .if_not_exists()
                    .col(pk_auto(Tasks::Id))
                    .col(string_len(Tasks::Title, 100))
                    .col(string_len_null(Tasks::Description, 255))
                    .col(string_len(Tasks::Priority, 16).default("medium"))
                    .col(string_len(Tasks::Status, 16).default("pending"))
                    .col(date(Tasks::DueDate))
                    .col(timestamp_with_time_zone_null(Tasks::CompletedAt))
                    .to_owned(),
            )
            .await?;

        // Backs the high-priority-pending count run on every create and update.
        manager
            .create_index(
                Index::create()
                    .name(IDX_TASKS_PRIORITY_STATUS)
                    .table(Tasks::Table)
                    .col(Tasks::Priority)
                    .col(Tasks::Status)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name(IDX_TASKS_PRIORITY_STATUS)
                    .table(Tasks::Table)
                    .to_owned(),
            )
            .await?;
        manager
            .drop_table(Table::drop().table(Tasks::Table).to_owned())
            .await
    }
}
