#![allow(dead_code)]

use chrono::{Days, NaiveDate, Utc};
use migration::MigratorTrait;
use sea_orm::{ActiveModelTrait, ActiveValue, ConnectOptions, Database, DatabaseConnection};
use tasktracker_server::entities::sea_orm_active_enums::{Priority, Status};
use tasktracker_server::entities::task;

/// Connects to a fresh in-memory SQLite database with all migrations applied.
pub async fn setup_db() -> anyhow::Result<DatabaseConnection> {
    // Allow multiple calls to init for tests.
    let _ = tracing_subscriber::fmt().try_init();
    // Every pooled connection would otherwise get its own empty in-memory database.
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).min_connections(1);
    let db = Database::connect(options).await?;
    migration::Migrator::up(&db, None).await?;
    Ok(db)
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: u64) -> NaiveDate {
    today() + Days::new(days)
}

pub fn days_before_today(days: u64) -> NaiveDate {
    today() - Days::new(days)
}

/// Inserts a task straight into the store, bypassing the creation rules.
pub async fn insert_task(
    db: &DatabaseConnection,
    title: &str,
    priority: Priority,
    status: Status,
    due_date: NaiveDate,
) -> task::Model {
    task::ActiveModel {
        title: ActiveValue::Set(title.to_string()),
        description: ActiveValue::Set(None),
        priority: ActiveValue::Set(priority),
        status: ActiveValue::Set(status),
        due_date: ActiveValue::Set(due_date),
        completed_at: ActiveValue::Set(None),
        ..Default::default()
    }
    .insert(db)
    .await
    .expect("Failed to insert task")
}
