use axum::{routing::get, Router};
use crate::config::state::AppState;
use super::handler;

pub fn page_routes() -> Router<AppState> {
    Router::new().route("/legal/{page}", get(handler::legal_page))
}
