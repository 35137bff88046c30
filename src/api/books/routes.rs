// Book route definitions

use axum::{
    routing::{get, post},
    Router,
};

use crate::config::state::AppState;
use super::handler;

/// Creates router with all book endpoints
pub fn book_routes() -> Router<AppState> {
    Router::new()
        .route("/book", get(handler::book_list))
        .route("/book/upload", post(handler::book_upload))
        .route("/book/dashboard", get(handler::teacher_book_dashboard))
        .route("/book/{id}", get(handler::book_detail))
        .route("/book/edit/{id}", post(handler::edit_book))
        .route("/book/delete/{id}", post(handler::delete_book))
        .route("/book/download/{id}", get(handler::download_book))
}
