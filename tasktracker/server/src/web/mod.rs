use axum::Router;
use axum::response::Json;
use migration::MigratorTrait;
use sea_orm::{Database, DatabaseConnection};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::config::Config;
use crate::task::TaskState;
use crate::task::api::create_api_router;

pub mod api;

#[tracing::instrument(skip(config))]
pub async fn start_web_server(config: Config) -> anyhow::Result<()> {
    let server_address = format!("0.0.0.0:{}", &config.port);
    let listener = tokio::net::TcpListener::bind(&server_address).await?;
    tracing::info!("Web server running on http://{}", server_address);

    let db = Database::connect(&config.db_url).await?;
    migration::Migrator::up(&db, None).await?;
    tracing::info!("Database migrations applied successfully");

    axum::serve(listener, create_app(db)).await?;
    Ok(())
}

/// Builds the full application router on top of a migrated database.
pub fn create_app(db: DatabaseConnection) -> Router {
    let task_state = TaskState { db: Arc::new(db) };

    Router::new()
        .route("/health", axum::routing::get(health_check_handler))
        .route("/api-docs/openapi.json", axum::routing::get(openapi_handler))
        .merge(create_api_router(task_state))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::new()),
        )
}

#[tracing::instrument]
pub async fn health_check_handler() -> &'static str {
    "OK"
}

/// Serves the OpenAPI document describing the task endpoints.
#[tracing::instrument]
pub async fn openapi_handler() -> Json<utoipa::openapi::OpenApi> {
    Json(api::ApiDoc::openapi())
}
