// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::sync::Arc;
use std::time::Instant;

use axum::Router;
use axum::routing::{get, post};
use meterwise_agent::Assistant;
use meterwise_config::model::GatewayConfig;
use meterwise_core::{MeterwiseError, SubscriberStore};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub assistant: Arc<Assistant>,
    /// Probed by `/health`.
    pub store: Arc<dyn SubscriberStore>,
    pub start_time: Instant,
}

impl GatewayState {
    pub fn new(assistant: Arc<Assistant>, store: Arc<dyn SubscriberStore>) -> Self {
        Self {
            assistant,
            store,
            start_time: Instant::now(),
        }
    }
}

/// Routes:
/// - POST /webhooks/telegram
/// - POST /webhooks/ticketing
/// - GET /health
pub fn router(state: GatewayState) -> Router {
    Router::new()
        .route("/webhooks/telegram", post(handlers::telegram_webhook))
        .route("/webhooks/ticketing", post(handlers::ticketing_webhook))
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Binds to `host:port` and serves until `cancel` fires.
pub async fn serve(
    config: &GatewayConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), MeterwiseError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| MeterwiseError::Channel {
            message: format!("failed to bind gateway to {addr}: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway listening on {addr}");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(cancel.cancelled_owned())
        .await
        .map_err(|e| MeterwiseError::Channel {
            message: format!("gateway server error: {e}"),
            source: Some(Box::new(e)),
        })?;

    tracing::info!("gateway stopped");
    Ok(())
}
