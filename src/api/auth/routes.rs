use axum::{routing::{get, post}, Router};
use crate::config::state::AppState;
use super::handler;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/user/ping", get(handler::ping))
        .route("/user/register", post(handler::register))
        .route("/user/login", post(handler::login))
}

pub fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/user/logout", post(handler::logout))
        .route("/user/profile", get(handler::profile))
        .route("/user/password_change", post(handler::password_change))
}
