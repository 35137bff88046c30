// Quiz route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::state::AppState;
use super::handler;

/// Creates router with the home page, quiz and profile endpoints
pub fn quiz_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handler::home))
        .route("/quizzes", get(handler::quiz_list))
        .route("/quizzes/create", post(handler::create_quiz))
        .route("/quizzes/{id}", get(handler::quiz_detail))
        .route("/quizzes/{id}/attempt", post(handler::quiz_attempt))
        .route("/quizzes/{id}/results", get(handler::quiz_results))
        .route("/profile/{user_id}", get(handler::user_profile))
}
