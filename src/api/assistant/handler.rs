use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;

use super::intent::Intent;

#[derive(Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub query: String,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    #[serde(default)]
    pub feedback: String,
}

#[instrument(skip_all)]
pub async fn chat(Json(payload): Json<ChatRequest>) -> HandlerResponse {
    let intent: Intent = Intent::classify(&payload.query);
    tracing::debug!("Chat intent {:?}", intent);

    HandlerResponse::new(StatusCode::OK).data(json!({ "answer": intent.answer() }))
}

/// Always acknowledges; only non-empty feedback is kept, in a bounded log
pub async fn feedback(
    State(state): State<AppState>,
    Json(payload): Json<FeedbackRequest>,
) -> HandlerResponse {
    if !payload.feedback.is_empty() {
        let preview: String = payload.feedback.chars().take(200).collect();
        info!("New feedback received: {}", preview);
        state.feedback.push(&payload.feedback).await;
    }

    HandlerResponse::new(StatusCode::OK).data(json!({ "status": "received" }))
}
