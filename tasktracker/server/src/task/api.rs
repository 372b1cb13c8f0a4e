use crate::entities::sea_orm_active_enums::{Priority, Status};
use crate::task::{
    ListTasksQuery, Task, TaskFilter, TaskInput, TaskService, TaskServiceError, TaskState,
    TaskStats,
};
use axum::{
    Router,
    extract::{Path, Query, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// JSON representation of a Task for API responses.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskJson {
    /// Unique identifier for the task
    pub id: u32,
    pub title: String,
    pub description: Option<String>,
    pub priority: Priority,
    pub status: Status,
    /// Calendar date the task is due, `YYYY-MM-DD`
    pub due_date: NaiveDate,
    /// When the task was completed
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<Task> for TaskJson {
    fn from(task: Task) -> Self {
        Self {
            id: task.id(),
            title: task.title().to_string(),
            description: task.description().map(str::to_string),
            priority: task.priority(),
            status: task.status(),
            due_date: task.due_date(),
            completed_at: task.completed_at(),
        }
    }
}

/// JSON request payload for creating or replacing a task.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TaskRequest {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Defaults to `medium`
    #[serde(default)]
    pub priority: Option<Priority>,
    /// Defaults to `pending`
    #[serde(default)]
    pub status: Option<Status>,
    pub due_date: NaiveDate,
    /// Ignored when `status` is `completed`; the server stamps the current time instead.
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TaskRequest> for TaskInput {
    fn from(request: TaskRequest) -> Self {
        Self {
            title: request.title,
            description: request.description,
            priority: request.priority.unwrap_or_default(),
            status: request.status.unwrap_or_default(),
            due_date: request.due_date,
            completed_at: request.completed_at,
        }
    }
}

/// JSON representation of the aggregate task counts.
#[derive(Debug, Default, Serialize, Deserialize, ToSchema)]
pub struct StatsJson {
    pub total: u64,
    pub pending: u64,
    pub in_progress: u64,
    pub completed: u64,
    /// Tasks due before today, whatever their status
    pub overdue: u64,
    pub high_priority_pending: u64,
}

impl From<TaskStats> for StatsJson {
    fn from(stats: TaskStats) -> Self {
        Self {
            total: stats.total,
            pending: stats.pending,
            in_progress: stats.in_progress,
            completed: stats.completed,
            overdue: stats.overdue,
            high_priority_pending: stats.high_priority_pending,
        }
    }
}

/// JSON response for API errors
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

/// Error returned by the task handlers.
#[derive(Debug)]
pub struct ApiError(TaskServiceError);

impl From<TaskServiceError> for ApiError {
    fn from(error: TaskServiceError) -> Self {
        Self(error)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status_code, error) = match &self.0 {
            TaskServiceError::InvalidInput(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_INPUT")
            }
            TaskServiceError::CapacityExceeded { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "CAPACITY_EXCEEDED")
            }
            TaskServiceError::TaskNotFound(_) => (StatusCode::UNPROCESSABLE_ENTITY, "NOT_FOUND"),
            TaskServiceError::IllegalTransition { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "ILLEGAL_TRANSITION")
            }
            TaskServiceError::Database(err) => {
                tracing::error!("Task store failure: {}", err);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "INTERNAL_ERROR".to_string(),
                        message: "An unexpected error occurred while processing your request. Please try again later.".to_string(),
                    }),
                )
                    .into_response();
            }
        };

        (
            status_code,
            Json(ErrorResponse {
                error: error.to_string(),
                message: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

/// Reads the task ID from the path. A non-numeric or negative ID is invalid input.
fn task_id(path: Result<Path<u32>, PathRejection>) -> Result<u32, ApiError> {
    path.map(|Path(id)| id).map_err(|rejection| {
        ApiError::from(TaskServiceError::InvalidInput(format!(
            "Invalid task ID: {}",
            rejection.body_text()
        )))
    })
}

/// Handler for POST /tasks - Creates a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    post,
    path = "/tasks",
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task created", body = TaskJson),
        (status = 422, description = "Due date not in the future or too many high priority pending tasks", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn create_task_handler(
    State(state): State<TaskState>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<TaskJson>, ApiError> {
    let service = TaskService::new(&state.db);
    let task = service.create_task(TaskInput::from(request)).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for GET /tasks - Lists tasks, narrowed by at most one filter.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks",
    params(ListTasksQuery),
    responses(
        (status = 200, description = "Matching tasks ordered by ID", body = Vec<TaskJson>),
        (status = 422, description = "Invalid pagination parameters", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn list_tasks_handler(
    State(state): State<TaskState>,
    Query(query): Query<ListTasksQuery>,
) -> Result<Json<Vec<TaskJson>>, ApiError> {
    let service = TaskService::new(&state.db);
    let tasks = service.list_tasks(TaskFilter::from(query)).await?;
    Ok(Json(tasks.into_iter().map(TaskJson::from).collect()))
}

/// Handler for GET /tasks/stats - Returns aggregate counts.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/stats",
    responses((status = 200, description = "Aggregate task counts", body = StatsJson)),
    tag = "Tasks"
)]
pub async fn stats_handler(State(state): State<TaskState>) -> Result<Json<StatsJson>, ApiError> {
    let service = TaskService::new(&state.db);
    let stats = service.get_stats().await?;
    Ok(Json(StatsJson::from(stats)))
}

/// Handler for GET /tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    get,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    responses(
        (status = 200, description = "The task", body = TaskJson),
        (status = 422, description = "Invalid task ID or task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn get_task_handler(
    State(state): State<TaskState>,
    path: Result<Path<u32>, PathRejection>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = task_id(path)?;
    let service = TaskService::new(&state.db);
    let task = service.get_task_by_id(id).await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for PUT /tasks/{id} - Replaces every field of a task.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    put,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    request_body = TaskRequest,
    responses(
        (status = 200, description = "Task updated", body = TaskJson),
        (status = 422, description = "Task not found, too many high priority pending tasks or illegal status change", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn update_task_handler(
    State(state): State<TaskState>,
    path: Result<Path<u32>, PathRejection>,
    Json(request): Json<TaskRequest>,
) -> Result<Json<TaskJson>, ApiError> {
    let id = task_id(path)?;
    let service = TaskService::new(&state.db);
    let task = service
        .update_task_by_id(id, TaskInput::from(request))
        .await?;
    Ok(Json(TaskJson::from(task)))
}

/// Handler for DELETE /tasks/{id}.
#[tracing::instrument(skip(state))]
#[utoipa::path(
    delete,
    path = "/tasks/{id}",
    params(("id" = u32, Path, description = "Task ID")),
    responses(
        (status = 204, description = "Task deleted"),
        (status = 422, description = "Invalid task ID or task not found", body = ErrorResponse)
    ),
    tag = "Tasks"
)]
pub async fn delete_task_handler(
    State(state): State<TaskState>,
    path: Result<Path<u32>, PathRejection>,
) -> Result<StatusCode, ApiError> {
    let id = task_id(path)?;
    let service = TaskService::new(&state.db);
    service.delete_task_by_id(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Creates and returns the tasks API router.
pub fn create_api_router(state: TaskState) -> Router {
    Router::new()
        .route("/tasks", get(list_tasks_handler).post(create_task_handler))
        .route("/tasks/stats", get(stats_handler))
        .route(
            "/tasks/{id}",
            get(get_task_handler)
                .put(update_task_handler)
                .delete(delete_task_handler),
        )
        .with_state(state)
}
