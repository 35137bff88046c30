// Video route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::state::AppState;
use super::handler;

/// Creates router with all video endpoints
pub fn video_routes() -> Router<AppState> {
    Router::new()
        .route("/video", get(handler::video_list))
        .route("/video/create", post(handler::create_video))
        .route("/video/dashboard", get(handler::teacher_dashboard))
        .route("/video/{id}", get(handler::video_detail))
        .route("/video/edit/{id}", post(handler::edit_video))
        .route("/video/delete/{id}", post(handler::delete_video))
}
