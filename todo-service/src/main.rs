use service_core::observability::{init_tracing, shutdown_tracing};
use todo_service::config::TodoConfig;
use todo_service::services::init_metrics;
use todo_service::startup::Application;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let config = TodoConfig::load().map_err(|e| {
        eprintln!("Failed to load configuration: {}", e);
        std::io::Error::other(format!("Configuration error: {}", e))
    })?;

    init_tracing(
        &config.service_name,
        &config.log_level,
        config.otlp_endpoint.as_deref(),
    );
    init_metrics();

    let application = Application::build(config).await.map_err(|e| {
        tracing::error!("Failed to build application: {}", e);
        shutdown_tracing();
        std::io::Error::other(format!("Startup error: {}", e))
    })?;

    let result = application.run_until_stopped().await;
    shutdown_tracing();
    result
}
