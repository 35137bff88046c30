// Application server configuration and setup

use std::time::Duration;
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    extract::DefaultBodyLimit,
    error_handling::HandleErrorLayer,
};
use tower::{ServiceBuilder, timeout::TimeoutLayer};
use tower_http::trace::TraceLayer;
use tokio::{signal, net::TcpListener};
use listenfd::ListenFd;
use anyhow::{Context, Result};
use tracing::info;

use crate::api;
use crate::api::middleware::csp::{add_content_security_policy, ContentSecurityPolicy};
use crate::config::{environment::EnvironmentVariables, state::AppState};
use crate::staticfiles::static_routes;
use crate::utils::{
    error_handler::{handle_global_error, not_found_fallback},
    response_handler::response_wrapper,
};

/// Every route the service exposes, without the outer middleware
pub fn routes(state: &AppState) -> Router<AppState> {
    api::routes(state)
        .merge(static_routes(&state.environment))
        .fallback(not_found_fallback)
}

/// Wraps `router` in the middleware stack and binds the state
pub fn with_middleware(router: Router<AppState>, state: AppState) -> Router {
    let env = state.environment.clone();
    let csp = ContentSecurityPolicy::from_env(&env);

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(from_fn(response_wrapper))
                .layer(from_fn_with_state(csp, add_content_security_policy))
                .layer(HandleErrorLayer::new(handle_global_error))
                .layer(TimeoutLayer::new(Duration::from_secs(env.default_timeout_seconds)))
                .layer(DefaultBodyLimit::max(env.max_request_body_size))
        )
        .with_state(state)
}

/// Creates and configures the application router with all middleware layers
pub fn create_app(state: AppState) -> Router {
    let router: Router<AppState> = routes(&state);
    with_middleware(router, state)
}

/// Sets up the TCP listener from a passed socket or binds HOST:PORT
pub async fn setup_listener(env: &EnvironmentVariables) -> Result<TcpListener> {
    let mut listenfd: ListenFd = ListenFd::from_env();

    let listener: TcpListener = match listenfd.take_tcp_listener(0)? {
        Some(std_listener) => {
            std_listener.set_nonblocking(true)?;
            TcpListener::from_std(std_listener)?
        }
        None => {
            let addr: String = format!("{}:{}", env.host, env.port);
            TcpListener::bind(&addr)
                .await
                .with_context(|| format!("Failed to bind {}", addr))?
        }
    };

    Ok(listener)
}

/// Connects the backing services, binds and serves until a shutdown signal
pub async fn run(state: AppState) -> Result<()> {
    state.connect().await?;

    let listener: TcpListener = setup_listener(&state.environment).await?;
    info!("Server listening on: {}", listener.local_addr()?);

    let app: Router = create_app(state.clone());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    state.shutdown().await;
    Ok(())
}

/// Handles graceful shutdown signals (Ctrl+C and TERM)
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install TERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("Shutting down via Ctrl+C"),
        _ = terminate => tracing::info!("Shutting down via TERM signal"),
    }
}
