// =============================================================================
// DATABASE SERVICE - PostgreSQL pool management
// =============================================================================

use std::sync::Arc;
use anyhow::{Context, Result};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{ConnectOptions, PgPool};
use tokio::sync::OnceCell;
use tracing::{debug, info, log::LevelFilter};

use crate::config::environment::EnvironmentVariables;
use crate::database::migrations::{self, MigrationReport, PendingMigration};

/// Database service managing the single PostgreSQL connection pool.
#[derive(Clone, Debug)]
pub struct DatabaseService {
    /// Connection pool, created by `initialize()`
    pool: Arc<OnceCell<PgPool>>,
    /// Environment configuration
    config: Arc<EnvironmentVariables>,
}

impl DatabaseService {
    /// Creates a new DatabaseService instance.
    /// Note: The pool is not initialized until `initialize()` is called.
    pub fn new(config: Arc<EnvironmentVariables>) -> Self {
        Self {
            pool: Arc::new(OnceCell::new()),
            config,
        }
    }

    /// Creates the pool if needed. Safe to call more than once.
    pub async fn initialize(&self) -> Result<()> {
        self.pool.get_or_try_init(|| async {
            info!(
                "Connecting to PostgreSQL at {}:{}/{}",
                self.config.db_host, self.config.db_port, self.config.db_name
            );
            let pool: PgPool = self.create_pool().await?;
            info!("DatabaseService initialized successfully");
            Ok::<PgPool, anyhow::Error>(pool)
        }).await?;

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Gracefully shuts down the service.
    pub async fn shutdown(&self) {
        info!("Initiating DatabaseService shutdown...");
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            info!("Database connection pool closed");
        } else {
            debug!("Database pool was not initialized, nothing to close");
        }
    }

    /// Returns the connection pool.
    /// Errors if the pool has not been initialized.
    pub fn get_pool(&self) -> Result<&PgPool> {
        self.pool.get().ok_or_else(|| anyhow::anyhow!("Database pool not initialized"))
    }

    /// Round-trips a trivial query
    pub async fn ping(&self) -> Result<()> {
        let pool = self.get_pool()?;
        sqlx::query("SELECT 1")
            .execute(pool)
            .await
            .context("Database ping failed")?;
        Ok(())
    }

    /// Applies every pending migration
    pub async fn migrate(&self) -> Result<MigrationReport> {
        let pool = self.get_pool()?;
        migrations::run(pool).await
    }

    /// Lists the migrations `migrate()` would apply, without applying them
    pub async fn pending_migrations(&self) -> Result<Vec<PendingMigration>> {
        let pool = self.get_pool()?;
        migrations::pending(pool).await
    }
}

// =============================================================================
// INTERNAL HELPERS
// =============================================================================

impl DatabaseService {
    /// Creates the connection pool based on environment config
    async fn create_pool(&self) -> Result<PgPool> {
        let connect_options = self.create_connect_options();

        let pool = PgPoolOptions::new()
            .max_connections(self.config.db_max_connections)
            .min_connections(1)
            .idle_timeout(std::time::Duration::from_secs(30))
            .acquire_timeout(std::time::Duration::from_secs(10))
            .connect_with(connect_options)
            .await
            .context("Failed to create database connection pool")?;

        Ok(pool)
    }

    /// Creates connection options with SSL and UTC timezone
    fn create_connect_options(&self) -> PgConnectOptions {
        let options = PgConnectOptions::new()
            .host(&self.config.db_host)
            .port(self.config.db_port)
            .username(&self.config.db_user)
            .password(&self.config.db_password)
            .database(&self.config.db_name)
            .log_statements(LevelFilter::Debug)
            .options([
                ("timezone", "UTC"),
                ("application_name", "learnflow-ai"),
            ]);

        // Production requires TLS; local development only prefers it
        if self.config.is_production() {
            options.ssl_mode(PgSslMode::Require)
        } else {
            options.ssl_mode(PgSslMode::Prefer)
        }
    }
}
