// SPDX-FileCopyrightText: 2026 Meterwise Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Webhook and health handlers.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use meterwise_core::{HealthStatus, PluginAdapter};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::server::GatewayState;

fn parse_body(source: &str, body: &Bytes) -> Option<Value> {
    match serde_json::from_slice(body) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(source, error = %e, "webhook body is not JSON");
            None
        }
    }
}

/// POST /webhooks/telegram. Always 200, including for malformed bodies.
pub async fn telegram_webhook(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    let Some(update) = parse_body("telegram", &body) else {
        return StatusCode::OK;
    };
    match meterwise_telegram::handler::parse_update(&update) {
        Some(inbound) => {
            state
                .assistant
                .handle_inbound_message(&inbound.identity, &inbound.text)
                .await;
        }
        None => debug!("Telegram update without text ignored"),
    }
    StatusCode::OK
}

/// POST /webhooks/ticketing. Always 200.
pub async fn ticketing_webhook(State(state): State<GatewayState>, body: Bytes) -> StatusCode {
    if let Some(payload) = parse_body("ticketing", &body) {
        let event = meterwise_ticketing::parse_event(&payload);
        state.assistant.handle_ticketing_event(event).await;
    }
    StatusCode::OK
}

/// GET /health. 200 while storage is healthy or degraded, 503 otherwise.
pub async fn health(State(state): State<GatewayState>) -> impl IntoResponse {
    let uptime_secs = state.start_time.elapsed().as_secs();
    let (code, status, detail) = match state.store.health_check().await {
        Ok(HealthStatus::Healthy) => (StatusCode::OK, "healthy", None),
        Ok(HealthStatus::Degraded(d)) => (StatusCode::OK, "degraded", Some(d)),
        Ok(HealthStatus::Unhealthy(d)) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", Some(d)),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            "unhealthy",
            Some(e.to_string()),
        ),
    };
    (
        code,
        Json(json!({ "status": status, "detail": detail, "uptime_secs": uptime_secs })),
    )
}
