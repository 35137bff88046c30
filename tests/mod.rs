//! tests/mod.rs
//! A shared test helper to spawn the app on an ephemeral port.
//! No Postgres or Redis is needed: nothing connects until a handler asks for it.

#![allow(dead_code)]

use std::collections::HashMap;

use axum::Router;
use axum::serve;
use learnflow_ai::config::{environment::EnvironmentVariables, state::AppState};
use learnflow_ai::core::server::{routes, with_middleware};
use tokio::net::TcpListener as TokioTcpListener;

/// Configuration for tests; `overrides` win over the defaults
pub fn test_env(overrides: &[(&str, &str)]) -> EnvironmentVariables {
    let mut vars: HashMap<String, String> = HashMap::from([
        ("ENVIRONMENT".to_string(), "test".to_string()),
        ("DB_HOST".to_string(), "127.0.0.1".to_string()),
        ("DB_PASSWORD".to_string(), "unused".to_string()),
        ("SITE_DOMAIN".to_string(), "learnflow.test".to_string()),
    ]);
    for (key, value) in overrides {
        vars.insert(key.to_string(), value.to_string());
    }
    EnvironmentVariables::from_vars(&vars).expect("Invalid test configuration")
}

/// Spawns the app on a random unused port and returns its base URL.
pub fn spawn_app() -> String {
    spawn_app_with(test_env(&[]), Router::new())
}

/// Same as `spawn_app`, with a custom configuration and extra routes behind the full middleware stack.
pub fn spawn_app_with(env: EnvironmentVariables, extra: Router<AppState>) -> String {
    let state: AppState = AppState::new(env).expect("Failed to build state");

    // * Build the application with the same layers as the server.
    let app: Router = with_middleware(routes(&state).merge(extra), state);

    // * Bind an ephemeral port using std::net::TcpListener.
    let std_listener: std::net::TcpListener = std::net::TcpListener::bind("127.0.0.1:0")
        .expect("Failed to bind random port");
    std_listener.set_nonblocking(true).unwrap();

    // * Convert std::net::TcpListener to tokio::net::TcpListener.
    let tokio_listener: TokioTcpListener = TokioTcpListener::from_std(std_listener)
        .expect("Failed to convert to tokio listener");

    let addr: std::net::SocketAddr = tokio_listener.local_addr().unwrap();

    // * Spawn the server in a background task.
    tokio::spawn(async move {
        serve(tokio_listener, app)
            .await
            .expect("Server failed");
    });

    // * Return the base URL, e.g. "http://127.0.0.1:12345".
    format!("http://{}", addr)
}
