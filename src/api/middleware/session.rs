use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;

/// The logged-in user, stored in request extensions by `require_session`
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    pub token: String,
}

/// Token from `Authorization: Bearer <token>`
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let (scheme, token) = value.split_once(' ')?;
            scheme.eq_ignore_ascii_case("bearer").then_some(token.trim())
        })
        .filter(|token| !token.is_empty())
}

/// Rejects requests without a live session
pub async fn require_session(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, HandlerResponse> {
    let token: String = bearer_token(&headers)
        .ok_or_else(|| {
            HandlerResponse::new(StatusCode::UNAUTHORIZED)
                .message("Authentication credentials were not provided")
                .data(json!({ "error": "missing_session" }))
        })?
        .to_string();

    let session = state.redis.get_session(&token).await.map_err(|e| {
        tracing::error!("Session lookup failed: {:#}", e);
        HandlerResponse::new(StatusCode::SERVICE_UNAVAILABLE)
            .message("Session store unavailable")
    })?;

    let session = session.ok_or_else(|| {
        HandlerResponse::new(StatusCode::UNAUTHORIZED)
            .message("Session expired or invalid, please log in again")
            .data(json!({ "error": "invalid_session" }))
    })?;

    tracing::debug!("Request authenticated as {}", session.username);

    request.extensions_mut().insert(CurrentUser {
        id: session.user_id,
        username: session.username,
        token,
    });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    #[test]
    fn parses_bearer_tokens() {
        assert_eq!(bearer_token(&headers("Bearer abc123")), Some("abc123"));
        assert_eq!(bearer_token(&headers("bearer  abc123 ")), Some("abc123"));
    }

    #[test]
    fn rejects_other_schemes_and_blanks() {
        assert_eq!(bearer_token(&headers("Basic dXNlcjpwdw==")), None);
        assert_eq!(bearer_token(&headers("Bearer ")), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }
}
