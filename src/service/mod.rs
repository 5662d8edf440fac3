//! HTTP service: loads the artifact pair once, shares it read-only with
//! every handler, and degrades to an unhealthy-but-running state when the
//! artifacts are missing or unreadable.

mod routes;
pub mod schema;

use crate::artifacts;
use crate::config::ServiceConfig;
use crate::predictor::Predictor;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tracing::{info, warn};

/// Shared application state, immutable after construction.
pub struct AppState {
    /// `None` when artifact loading failed at startup; handlers report the
    /// degraded status instead of crashing.
    pub predictor: Option<Predictor>,
}

/// Load the artifact pair. A failure is logged and degrades the service;
/// it never aborts the process.
pub fn build_state(config: &ServiceConfig) -> Arc<AppState> {
    let predictor = match artifacts::load_pair(
        &config.artifacts.model_path,
        &config.artifacts.preprocessor_path,
    ) {
        Ok((model, state, meta)) => {
            info!(run_id = %meta.run_id, model = model.kind().as_str(), "model loaded");
            Some(Predictor::new(model, state, meta))
        }
        Err(e) => {
            warn!(error = %e, "artifacts not loaded; serving in degraded mode");
            None
        }
    };
    Arc::new(AppState { predictor })
}

/// Build the axum router with all routes.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(routes::root_handler))
        .route("/health", get(routes::health_handler))
        .route("/features", get(routes::features_handler))
        .route("/predict", post(routes::predict_handler))
        .with_state(state)
}

/// Bind and serve until ctrl-c.
pub async fn serve(config: ServiceConfig) -> anyhow::Result<()> {
    let state = build_state(&config);
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&config.http.bind_addr).await?;
    info!(addr = %config.http.bind_addr, "prediction service listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("shutdown signal received");
}
