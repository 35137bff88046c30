// Content-Security-Policy header, added when a response doesn't set its own

use axum::{
    body::Body,
    extract::State,
    http::{header::CONTENT_SECURITY_POLICY, HeaderValue, Request, Response},
    middleware::Next,
};
use tracing::warn;

use crate::config::environment::EnvironmentVariables;

/// Directive -> sources. Videos are YouTube embeds, everything else is first-party.
pub const DEFAULT_DIRECTIVES: &[(&str, &[&str])] = &[
    ("default-src", &["'self'"]),
    ("script-src", &["'self'", "https://www.youtube.com"]),
    ("style-src", &["'self'", "'unsafe-inline'"]),
    ("img-src", &["'self'", "data:", "https://placehold.co", "https://i.ytimg.com"]),
    ("frame-src", &["https://www.youtube.com", "https://www.youtube-nocookie.com"]),
    ("connect-src", &["'self'"]),
    ("object-src", &["'none'"]),
    ("frame-ancestors", &["'self'"]),
];

#[derive(Debug, Clone)]
pub struct ContentSecurityPolicy {
    header: Option<HeaderValue>,
}

impl ContentSecurityPolicy {
    /// CONTENT_SECURITY_POLICY overrides the built-in directives
    pub fn from_env(env: &EnvironmentVariables) -> Self {
        let value: String = env
            .csp_override
            .clone()
            .unwrap_or_else(|| build_policy(DEFAULT_DIRECTIVES));
        Self::from_value(&value)
    }

    pub fn from_value(value: &str) -> Self {
        if value.trim().is_empty() {
            return Self { header: None };
        }

        match HeaderValue::from_str(value) {
            Ok(header) => Self { header: Some(header) },
            Err(e) => {
                warn!("Ignoring invalid Content-Security-Policy '{}': {}", value, e);
                Self { header: None }
            }
        }
    }
}

/// "directive source source; directive source"
pub fn build_policy(directives: &[(&str, &[&str])]) -> String {
    directives
        .iter()
        .map(|(directive, sources)| format!("{} {}", directive, sources.join(" ")))
        .collect::<Vec<String>>()
        .join("; ")
}

pub async fn add_content_security_policy(
    State(policy): State<ContentSecurityPolicy>,
    req: Request<Body>,
    next: Next,
) -> Response<Body> {
    let mut response: Response<Body> = next.run(req).await;

    if let Some(header) = policy.header {
        if !response.headers().contains_key(CONTENT_SECURITY_POLICY) {
            response.headers_mut().insert(CONTENT_SECURITY_POLICY, header);
        }
    }

    response
}
