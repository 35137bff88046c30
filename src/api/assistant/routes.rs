use axum::{routing::post, Router};
use crate::config::state::AppState;
use super::handler;

pub fn assistant_routes() -> Router<AppState> {
    Router::new()
        .route("/api/chat", post(handler::chat))
        .route("/api/feedback", post(handler::feedback))
}
