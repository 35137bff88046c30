pub mod migrations;
pub mod postgres_service;
pub mod redis_manager;

pub use postgres_service::DatabaseService;
pub use redis_manager::{QuizResult, RedisService, SessionData};

/// Postgres unique_violation
pub const UNIQUE_VIOLATION: &str = "23505";

/// True when the error chain carries a Postgres unique violation
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<sqlx::Error>())
        .any(|e| match e {
            sqlx::Error::Database(db_err) => db_err.code().as_deref() == Some(UNIQUE_VIOLATION),
            _ => false,
        })
}
