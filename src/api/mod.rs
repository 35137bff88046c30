/*
* HTTP API: route composition and helpers shared by the handlers.
*/

pub mod assistant;
pub mod auth;
pub mod books;
pub mod health;
pub mod middleware;
pub mod pages;
pub mod quizzes;
pub mod sitemap;
pub mod videos;

use axum::{http::StatusCode, middleware::from_fn_with_state, Router};
use serde_json::{Map, Value};
use sqlx::PgPool;

use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;

/// Field-level validation problems, reported together
pub type FieldErrors = Vec<(&'static str, String)>;

/// Public routes merged with the session-protected ones
pub fn routes(state: &AppState) -> Router<AppState> {
    let protected: Router<AppState> = Router::new()
        .merge(auth::account_routes())
        .merge(quizzes::quiz_routes())
        .merge(videos::video_routes())
        .merge(books::book_routes())
        .route_layer(from_fn_with_state(state.clone(), middleware::require_session));

    Router::new()
        .merge(health::health_routes())
        .merge(auth::auth_routes())
        .merge(pages::page_routes())
        .merge(sitemap::sitemap_routes())
        .merge(assistant::assistant_routes())
        .merge(protected)
}

/// The connection pool, or 503 when the database was never connected
pub(crate) fn db_pool(state: &AppState) -> Result<&PgPool, HandlerResponse> {
    state.database.get_pool().map_err(|e| {
        tracing::error!("{:#}", e);
        HandlerResponse::new(StatusCode::SERVICE_UNAVAILABLE).message("Database unavailable")
    })
}

/// Groups `(field, message)` pairs into `{ field: [messages] }`
pub(crate) fn field_errors_json(errors: &[(&'static str, String)]) -> Value {
    let mut grouped: Map<String, Value> = Map::new();
    for (field, message) in errors {
        let entry: &mut Value = grouped
            .entry(field.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
        if let Value::Array(list) = entry {
            list.push(Value::String(message.clone()));
        }
    }
    Value::Object(grouped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn field_errors_are_grouped_by_field() {
        let errors: FieldErrors = vec![
            ("password", "too short".to_string()),
            ("email", "invalid".to_string()),
            ("password", "entirely numeric".to_string()),
        ];
        assert_eq!(
            field_errors_json(&errors),
            json!({ "password": ["too short", "entirely numeric"], "email": ["invalid"] })
        );
    }
}
