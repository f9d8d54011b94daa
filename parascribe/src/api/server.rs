//! API server setup and configuration.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::get;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::routes;
use crate::config::ApiServerConfig;
use crate::coordinator::Coordinator;
use crate::jobs::JobManager;
use crate::{Error, Result};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Server start time for uptime calculation.
    pub start_time: Instant,
    /// Job state machine.
    pub jobs: Arc<JobManager>,
    /// Distribution coordinator.
    pub coordinator: Arc<Coordinator>,
}

impl AppState {
    pub fn new(jobs: Arc<JobManager>, coordinator: Arc<Coordinator>) -> Self {
        Self {
            start_time: Instant::now(),
            jobs,
            coordinator,
        }
    }
}

/// Assemble the application router.
pub fn build_router(config: &ApiServerConfig, state: AppState) -> Router {
    let mut router = Router::new()
        .nest("/api/jobs", routes::jobs::router())
        .route("/api/health", get(routes::health::health))
        .layer(TraceLayer::new_for_http());

    if config.enable_cors {
        router = router.layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        );
    }

    router.with_state(state)
}

/// Bind and serve until the shutdown token fires.
pub async fn serve(
    config: &ApiServerConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<()> {
    let addr: SocketAddr = format!("{}:{}", config.bind_address, config.port)
        .parse()
        .map_err(|e| Error::Other(format!("Invalid bind address: {}", e)))?;

    let router = build_router(config, state);
    let listener = TcpListener::bind(addr).await?;
    info!("API server listening on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("API server stopped");
    Ok(())
}
