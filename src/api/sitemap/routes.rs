use axum::{routing::get, Router};
use crate::config::state::AppState;
use super::handler;

pub fn sitemap_routes() -> Router<AppState> {
    Router::new().route("/sitemap.xml", get(handler::sitemap))
}
