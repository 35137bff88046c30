// Liveness and database readiness endpoints

use serde_json::json;
use axum::{http::StatusCode, extract::State};

use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;
use tracing::{instrument, warn};

/// Liveness; no backing service is touched
#[instrument(skip(state))]
pub async fn health(State(state): State<AppState>) -> HandlerResponse {
    HandlerResponse::new(StatusCode::OK)
        .data(json!({
            "status": "ok",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.environment.environment,
            "instance": instance_identifier(),
        }))
        .message("Service is running")
}

/// Verifies database connectivity
#[instrument(skip(state))]
pub async fn database_health(State(state): State<AppState>) -> HandlerResponse {
    match state.database.ping().await {
        Ok(()) => HandlerResponse::new(StatusCode::OK)
            .data(json!({ "database": "connected" }))
            .message("Database connection healthy"),
        Err(e) => {
            warn!("Database health check failed: {:#}", e);
            HandlerResponse::new(StatusCode::SERVICE_UNAVAILABLE)
                .data(json!({ "database": "disconnected" }))
                .message("Database connection failed")
        }
    }
}

/// Container id, host name or process id, whichever is available first
fn instance_identifier() -> String {
    if let Ok(hostname) = std::env::var("HOSTNAME") {
        if hostname.len() > 8 && hostname.chars().all(|c: char| c.is_ascii_hexdigit() || c == '-') {
            let short: String = hostname.chars().take(12).collect();
            return format!("container_{}", short);
        }
        return format!("host_{}", hostname);
    }

    if let Ok(hostname) = hostname::get() {
        if let Some(hostname_str) = hostname.to_str() {
            return format!("host_{}", hostname_str);
        }
    }

    format!("process_{}", std::process::id())
}
