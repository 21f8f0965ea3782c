// SPDX-FileCopyrightText: 2026 DelayDesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the API.

use axum::{
    Router,
    routing::{delete, get, patch},
};
use delaydesk_config::model::ServerConfig;
use delaydesk_core::DelayError;
use delaydesk_service::DelayService;
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct AppState {
    pub service: DelayService,
}

/// Builds the API router.
///
/// Routes:
/// - GET /api/health
/// - GET /api/delays/aggregate/by-neighborhood
/// - GET, POST /api/delays
/// - DELETE /api/delays/{id}
/// - PATCH /api/delays/{id}/resolve
pub fn router(service: DelayService) -> Router {
    let state = AppState { service };

    Router::new()
        .route("/api/health", get(handlers::health))
        .route(
            "/api/delays/aggregate/by-neighborhood",
            get(handlers::aggregate_by_neighborhood),
        )
        .route(
            "/api/delays",
            get(handlers::list_delays).post(handlers::create_delay),
        )
        .route("/api/delays/{id}", delete(handlers::delete_delay))
        .route("/api/delays/{id}/resolve", patch(handlers::resolve_delay))
        .fallback(handlers::not_found)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Serves the API on the configured host:port until `shutdown` is cancelled.
///
/// In-flight requests are drained before this returns.
pub async fn start_server(
    config: &ServerConfig,
    service: DelayService,
    shutdown: CancellationToken,
) -> Result<(), DelayError> {
    let app = router(service);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| DelayError::Server {
            message: format!("failed to bind to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("API server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await
        .map_err(|e| DelayError::Server {
            message: format!("server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("API server stopped");
    Ok(())
}
