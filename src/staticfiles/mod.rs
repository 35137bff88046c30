/*
* Static assets: collection into STATIC_ROOT and serving under STATIC_URL.
*/

pub mod collect;

use axum::Router;
use tower_http::services::ServeDir;

use crate::config::environment::EnvironmentVariables;
use crate::config::state::AppState;

pub use collect::{collect_static, confirm_on_stdin, CollectError, CollectOptions, CollectReport};

/// Serves the collected files from STATIC_ROOT at STATIC_URL
pub fn static_routes(env: &EnvironmentVariables) -> Router<AppState> {
    Router::new().nest_service(
        &env.static_url,
        ServeDir::new(&env.static_root).append_index_html_on_directories(false),
    )
}
