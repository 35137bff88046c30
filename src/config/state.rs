// Application state management with singleton pattern

use std::sync::Arc;
use once_cell::sync::OnceCell;

use crate::api::assistant::FeedbackLog;
use crate::config::environment::EnvironmentVariables;
use crate::database::{DatabaseService, RedisService};

// AppState singleton
#[derive(Debug, Clone)]
pub struct AppState {
    pub environment: Arc<EnvironmentVariables>,
    pub database: DatabaseService,
    pub redis: RedisService,
    pub feedback: FeedbackLog,
}

impl AppState {
    /// Builds the state from an explicit configuration. No connection is opened here.
    pub fn new(environment: EnvironmentVariables) -> anyhow::Result<Self> {
        let environment_arc: Arc<EnvironmentVariables> = Arc::new(environment);

        let database: DatabaseService = DatabaseService::new(environment_arc.clone());
        let redis: RedisService = RedisService::new(environment_arc.clone())?;

        Ok(Self {
            environment: environment_arc,
            database,
            redis,
            feedback: FeedbackLog::new(),
        })
    }

    /// Returns the singleton instance built from the process environment
    pub fn instance() -> anyhow::Result<&'static Self> {
        static INSTANCE: OnceCell<AppState> = OnceCell::new();

        INSTANCE.get_or_try_init(|| {
            let environment: EnvironmentVariables = EnvironmentVariables::instance()?.clone();
            AppState::new(environment)
        })
    }

    /// Connects to Postgres and Redis
    pub async fn connect(&self) -> anyhow::Result<()> {
        self.database.initialize().await?;
        self.redis.initialize().await?;

        tracing::info!("Services (DB + Redis) initialized successfully");
        Ok(())
    }

    /// Gracefully shutdown all connections
    pub async fn shutdown(&self) {
        self.database.shutdown().await;
        self.redis.shutdown().await;
    }
}
