use parascribe::api::server::{self, AppState};
use parascribe::config::ServiceConfig;
use parascribe::services::ServiceContainer;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before reading configuration.
    dotenvy::dotenv().ok();

    parascribe::logging::init();

    let config = ServiceConfig::from_env_or_default();
    let container = ServiceContainer::new(config)?;
    let state = AppState::new(container.jobs.clone(), container.coordinator.clone());

    let shutdown = container.cancellation_token();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("shutdown signal received");
                shutdown.cancel();
            }
        }
    });

    server::serve(&container.config.api, state, shutdown).await?;
    Ok(())
}
