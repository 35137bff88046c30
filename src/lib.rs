// Library root for the LearnFlow AI service and its management commands

pub mod api;
pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod config;
pub mod core;
pub mod database;
pub mod staticfiles;
pub mod utils;

pub use crate::config::environment::EnvironmentVariables;
pub use crate::config::state::AppState;
pub use crate::core::server::create_app;
pub use crate::database::DatabaseService;
