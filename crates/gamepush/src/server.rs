// SPDX-FileCopyrightText: 2026 Gamepush Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Management HTTP surface built on axum.
//!
//! Sets up routes, middleware, and shared state. There is no authentication;
//! bind it to a private interface.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use gamepush_config::model::GatewayConfig;
use gamepush_core::GamepushError;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::app::App;
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub app: Arc<App>,
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    pub fn new(app: App) -> Self {
        Self {
            app: Arc::new(app),
            start_time: Instant::now(),
        }
    }
}

/// Build the router with every management route.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::get_health))
        .route("/games/refresh", post(handlers::post_refresh))
        .route("/games/{window}", get(handlers::get_games))
        .route("/push", post(handlers::post_push_one))
        .route("/push/{window}", post(handlers::post_push_window))
        .route("/confirmation", post(handlers::post_confirmation))
        .route("/inbound/{contact_type}", post(handlers::post_inbound))
        .route(
            "/wechat/callback",
            get(handlers::get_wechat_callback).post(handlers::post_wechat_callback),
        )
        .route(
            "/subscribers",
            get(handlers::get_subscribers).post(handlers::post_subscriber),
        )
        .route(
            "/subscribers/{id}",
            get(handlers::get_subscriber).delete(handlers::delete_subscriber),
        )
        .route("/logs", get(handlers::get_logs))
        .route("/logs/subscriber/{id}", get(handlers::get_subscriber_logs))
        .route("/jobs", get(handlers::get_jobs))
        .route("/jobs/{id}/run", post(handlers::post_run_job))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve the management surface until `shutdown` is cancelled.
pub async fn start_server(
    config: &GatewayConfig,
    state: AppState,
    shutdown: CancellationToken,
) -> Result<(), GamepushError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| GamepushError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| GamepushError::Internal(format!("gateway server error: {e}")))?;

    Ok(())
}
