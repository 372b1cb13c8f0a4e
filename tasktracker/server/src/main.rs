#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();
    let config = tasktracker_server::config::Config::from_env()?;
    tasktracker_server::web::start_web_server(config).await
}
