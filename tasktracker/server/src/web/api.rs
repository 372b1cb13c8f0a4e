use crate::entities::sea_orm_active_enums::{Priority, Status};
use crate::task::api::{self, ErrorResponse, StatsJson, TaskJson, TaskRequest};
use utoipa::OpenApi;

/// OpenAPI description of the JSON task endpoints.
#[derive(OpenApi)]
#[openapi(
    paths(
        api::create_task_handler,
        api::list_tasks_handler,
        api::stats_handler,
        api::get_task_handler,
        api::update_task_handler,
        api::delete_task_handler,
    ),
    components(schemas(TaskJson, TaskRequest, StatsJson, ErrorResponse, Priority, Status)),
    tags((name = "Tasks", description = "Task tracking endpoints"))
)]
pub struct ApiDoc;
