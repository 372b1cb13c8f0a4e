use crate::entities::sea_orm_active_enums::{Priority, Status};
use crate::entities::*;
use chrono::{DateTime, NaiveDate, Utc};
use mockable::{Clock, DefaultClock};
use sea_orm::sea_query::{Expr, SimpleExpr};
use sea_orm::*;
use std::sync::Arc;

pub mod api;
pub mod filter;

pub use filter::{ListTasksQuery, TaskFilter};

/// Maximum number of tasks that may be high priority and pending at once.
pub const HIGH_PRIORITY_PENDING_LIMIT: u64 = 5;
/// Maximum number of characters in a task title.
pub const MAX_TITLE_LENGTH: usize = 100;
/// Maximum number of characters in a task description.
pub const MAX_DESCRIPTION_LENGTH: usize = 255;

#[derive(Debug, PartialEq, Clone, Eq)]
pub struct Task {
    id: u32,
    title: String,
    description: Option<String>,
    priority: Priority,
    status: Status,
    due_date: NaiveDate,
    completed_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Returns the ID of the task.
    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn priority(&self) -> Priority {
        self.priority
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn due_date(&self) -> NaiveDate {
        self.due_date
    }

    /// Returns when the task was completed, if it has been.
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }
}

impl From<task::Model> for Task {
    fn from(model: task::Model) -> Self {
        Self {
            id: model.id as u32,
            title: model.title,
            description: model.description,
            priority: model.priority,
            status: model.status,
            due_date: model.due_date,
            completed_at: model.completed_at,
        }
    }
}

/// Caller-supplied task fields, used for both creation and full replacement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskInput {
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    pub due_date: NaiveDate,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskInput {
    /// Creates an input with default priority and status and no description.
    pub fn new(title: impl Into<String>, due_date: NaiveDate) -> Self {
        Self {
            title: title.into(),
            description: None,
            priority: Priority::default(),
            status: Status::default(),
            due_date,
            completed_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_completed_at(mut self, completed_at: DateTime<Utc>) -> Self {
        self.completed_at = Some(completed_at);
        self
    }

    /// Checks the field bounds that hold regardless of store state.
    fn validate(&self) -> Result<(), TaskServiceError> {
        if self.title.trim().is_empty() {
            return Err(TaskServiceError::InvalidInput(
                "Title must not be empty".to_string(),
            ));
        }
        if self.title.chars().count() > MAX_TITLE_LENGTH {
            return Err(TaskServiceError::InvalidInput(format!(
                "Title must be at most {} characters",
                MAX_TITLE_LENGTH
            )));
        }
        if let Some(description) = &self.description {
            if description.chars().count() > MAX_DESCRIPTION_LENGTH {
                return Err(TaskServiceError::InvalidInput(format!(
                    "Description must be at most {} characters",
                    MAX_DESCRIPTION_LENGTH
                )));
            }
        }
        Ok(())
    }
}

/// Aggregate counts over every stored task.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct TaskStats {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    /// Tasks due before today, completed ones included.
    pub overdue: u64,
    pub high_priority_pending: u64,
}

impl TaskStats {
    /// Tallies `tasks` in a single pass.
    pub fn from_tasks<'a>(tasks: impl IntoIterator<Item = &'a Task>, today: NaiveDate) -> Self {
        tasks.into_iter().fold(Self::default(), |mut stats, task| {
            stats.total += 1;
            match task.status {
                Status::Pending => stats.pending += 1,
                Status::InProcess => stats.in_progress += 1,
                Status::Completed => stats.completed += 1,
            }
            if task.due_date < today {
                stats.overdue += 1;
            }
            if task.priority == Priority::High && task.status == Status::Pending {
                stats.high_priority_pending += 1;
            }
            stats
        })
    }
}

/// Error type for TaskService operations.
#[derive(Debug, thiserror::Error)]
pub enum TaskServiceError {
    /// The supplied task data breaks a field rule.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    /// Too many high priority tasks are already pending.
    #[error("There are already {limit} or more high priority pending tasks")]
    CapacityExceeded { limit: u64 },
    #[error("Task with ID {0} not found")]
    TaskNotFound(u32),
    /// The requested status change is not allowed.
    #[error("Cannot change task status from {from} to {to}")]
    IllegalTransition { from: Status, to: Status },
    /// Represents a database error.
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),
}

#[derive(Clone, Debug)]
pub struct TaskState {
    pub db: Arc<sea_orm::DatabaseConnection>,
}

pub struct TaskService<'a, C = DefaultClock> {
    db: &'a sea_orm::DatabaseConnection,
    clock: C,
}

impl TaskService<'_> {
    pub fn new(db: &sea_orm::DatabaseConnection) -> TaskService<'_> {
        TaskService::with_clock(db, DefaultClock)
    }
}

impl<'a, C> TaskService<'a, C>
where
    C: Clock + Send + Sync,
{
    /// Creates a service that reads the current date and time from `clock`.
    pub fn with_clock(db: &'a sea_orm::DatabaseConnection, clock: C) -> Self {
        Self { db, clock }
    }

    /// Creates a new task.
    ///
    /// # Arguments
    ///
    /// * `input` - The fields of the new task.
    ///
    /// # Returns
    ///
    /// The persisted `Task`, or `InvalidInput` when the due date is not after
    /// today and `CapacityExceeded` when a high priority task would go over
    /// the pending limit.
    #[tracing::instrument(skip(self))]
    pub async fn create_task(&self, input: TaskInput) -> Result<Task, TaskServiceError> {
        input.validate()?;

        let today = self.today();
        if input.due_date <= today {
            return Err(TaskServiceError::InvalidInput(format!(
                "Due date {} must be after {}",
                input.due_date, today
            )));
        }
        if input.priority == Priority::High {
            self.ensure_high_priority_capacity().await?;
        }

        let completed_at = self.completed_at_for(&input);
        let active_model = task::ActiveModel {
            title: ActiveValue::Set(input.title),
            description: ActiveValue::Set(input.description),
            priority: ActiveValue::Set(input.priority),
            status: ActiveValue::Set(input.status),
            due_date: ActiveValue::Set(input.due_date),
            completed_at: ActiveValue::Set(completed_at),
            ..Default::default()
        };
        let created_model = active_model.insert(self.db).await?;
        tracing::info!("Created task {}", created_model.id);
        Ok(Task::from(created_model))
    }

    /// Lists the tasks selected by `filter`, ordered by ID.
    ///
    /// Pages past the end of the store come back short or empty.
    #[tracing::instrument(skip(self))]
    pub async fn list_tasks(&self, filter: TaskFilter) -> Result<Vec<Task>, TaskServiceError> {
        let query = task::Entity::find().order_by_asc(task::Column::Id);
        let query = match filter {
            TaskFilter::TitleStartsWith(prefix) => {
                query.filter(ilike(task::Column::Title, like_pattern("", &prefix, "%")))
            }
            TaskFilter::TitleEndsWith(suffix) => {
                query.filter(ilike(task::Column::Title, like_pattern("%", &suffix, "")))
            }
            TaskFilter::Search(needle) => {
                let pattern = like_pattern("%", &needle, "%");
                query.filter(
                    Condition::any()
                        .add(ilike(task::Column::Title, pattern.clone()))
                        .add(ilike(task::Column::Description, pattern)),
                )
            }
            TaskFilter::Page { page, limit } => {
                if page == 0 || limit == 0 {
                    return Err(TaskServiceError::InvalidInput(
                        "Page and limit must both be at least 1".to_string(),
                    ));
                }
                // The store binds offset and limit as signed 64-bit integers.
                let max_row = i64::MAX as u64;
                match (page - 1).checked_mul(limit) {
                    Some(offset) if offset <= max_row => {
                        query.offset(offset).limit(limit.min(max_row))
                    }
                    _ => return Ok(Vec::new()),
                }
            }
            TaskFilter::Overdue => query
                .filter(task::Column::DueDate.lt(self.today()))
                .filter(task::Column::Status.ne(Status::Completed)),
            TaskFilter::Status(status) => query.filter(task::Column::Status.eq(status)),
            TaskFilter::Priority(priority) => query.filter(task::Column::Priority.eq(priority)),
            TaskFilter::All => query,
        };

        let tasks = query
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(tasks)
    }

    /// Retrieves a task by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn get_task_by_id(&self, id: u32) -> Result<Task, TaskServiceError> {
        let task_model = self.find_model(id).await?;
        Ok(Task::from(task_model))
    }

    /// Computes aggregate counts over all tasks.
    #[tracing::instrument(skip(self))]
    pub async fn get_stats(&self) -> Result<TaskStats, TaskServiceError> {
        let tasks: Vec<Task> = task::Entity::find()
            .all(self.db)
            .await?
            .into_iter()
            .map(Task::from)
            .collect();
        Ok(TaskStats::from_tasks(&tasks, self.today()))
    }

    /// Replaces every field of an existing task.
    ///
    /// # Arguments
    ///
    /// * `id` - The ID of the task to update.
    /// * `input` - The new field values.
    ///
    /// # Returns
    ///
    /// The updated `Task`. Fails with `TaskNotFound`, `CapacityExceeded` or
    /// `IllegalTransition`. The capacity check counts the task being updated.
    #[tracing::instrument(skip(self))]
    pub async fn update_task_by_id(
        &self,
        id: u32,
        input: TaskInput,
    ) -> Result<Task, TaskServiceError> {
        let task_to_update = self.find_model(id).await?;
        input.validate()?;

        if input.priority == Priority::High {
            self.ensure_high_priority_capacity().await?;
        }
        if !task_to_update.status.can_transition_to(input.status) {
            return Err(TaskServiceError::IllegalTransition {
                from: task_to_update.status,
                to: input.status,
            });
        }

        let completed_at = self.completed_at_for(&input);
        let mut active_model: task::ActiveModel = task_to_update.into();
        active_model.title = ActiveValue::Set(input.title);
        active_model.description = ActiveValue::Set(input.description);
        active_model.priority = ActiveValue::Set(input.priority);
        active_model.status = ActiveValue::Set(input.status);
        active_model.due_date = ActiveValue::Set(input.due_date);
        active_model.completed_at = ActiveValue::Set(completed_at);
        let updated_model = active_model.update(self.db).await?;

        Ok(Task::from(updated_model))
    }

    /// Permanently deletes a task by its ID.
    #[tracing::instrument(skip(self))]
    pub async fn delete_task_by_id(&self, id: u32) -> Result<(), TaskServiceError> {
        let task_to_delete = self.find_model(id).await?;
        task::Entity::delete_by_id(task_to_delete.id)
            .exec(self.db)
            .await?;
        tracing::info!("Deleted task {}", id);
        Ok(())
    }

    async fn find_model(&self, id: u32) -> Result<task::Model, TaskServiceError> {
        let id_column = i32::try_from(id).map_err(|_| TaskServiceError::TaskNotFound(id))?;
        task::Entity::find_by_id(id_column)
            .one(self.db)
            .await?
            .ok_or(TaskServiceError::TaskNotFound(id))
    }

    /// Fails when the store already holds the maximum number of high priority
    /// pending tasks.
    #[tracing::instrument(skip(self))]
    async fn ensure_high_priority_capacity(&self) -> Result<(), TaskServiceError> {
        let high_priority_pending = task::Entity::find()
            .filter(task::Column::Priority.eq(Priority::High))
            .filter(task::Column::Status.eq(Status::Pending))
            .count(self.db)
            .await?;
        if high_priority_pending >= HIGH_PRIORITY_PENDING_LIMIT {
            tracing::warn!(
                "Rejected high priority task: {} already pending",
                high_priority_pending
            );
            return Err(TaskServiceError::CapacityExceeded {
                limit: HIGH_PRIORITY_PENDING_LIMIT,
            });
        }
        Ok(())
    }

    /// Completed tasks are stamped with the current time; otherwise the
    /// caller's value is kept.
    fn completed_at_for(&self, input: &TaskInput) -> Option<DateTime<Utc>> {
        if input.status == Status::Completed {
            Some(self.clock.utc())
        } else {
            input.completed_at
        }
    }

    /// The current UTC calendar date.
    fn today(&self) -> NaiveDate {
        self.clock.utc().date_naive()
    }
}

/// Case-insensitive LIKE that works on both PostgreSQL and SQLite.
///
/// The database folds both sides, so column and pattern are always folded by
/// the same rules. SQLite only folds ASCII letters.
fn ilike(column: task::Column, pattern: String) -> SimpleExpr {
    Expr::cust_with_exprs(
        "LOWER($1) LIKE LOWER($2) ESCAPE '\\'",
        [
            SimpleExpr::from(Expr::col(column)),
            SimpleExpr::from(Expr::val(pattern)),
        ],
    )
}

/// Escapes LIKE wildcards in `text` so it is matched literally.
fn like_pattern(before: &str, text: &str, after: &str) -> String {
    let mut pattern = String::from(before);
    for character in text.chars() {
        if matches!(character, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(character);
    }
    pattern.push_str(after);
    pattern
}
