// =============================================================================
// MIGRATIONS - Versioned schema changes from ./migrations, applied by sqlx
// =============================================================================
//
// sqlx's Migrator keeps the `_sqlx_migrations` ledger, verifies checksums, takes a
// Postgres advisory lock and runs every migration in its own transaction.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::Serialize;
use sqlx::migrate::{Migration, Migrator};
use sqlx::PgPool;
use tracing::info;

/// Migrations embedded from `migrations/`.
/// Versions in the database that this build doesn't ship (a newer release ran first) are tolerated.
pub static MIGRATOR: Lazy<Migrator> = Lazy::new(|| {
    let mut migrator: Migrator = sqlx::migrate!();
    migrator.set_ignore_missing(true);
    migrator
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PendingMigration {
    pub version: i64,
    pub name: String,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct MigrationReport {
    pub applied: Vec<i64>,
    pub already_applied: usize,
}

impl MigrationReport {
    pub fn is_noop(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Up migrations that are not in `applied`, in version order
pub fn plan<'a>(
    available: impl IntoIterator<Item = &'a Migration>,
    applied: &[i64],
) -> Vec<PendingMigration> {
    let mut pending: Vec<PendingMigration> = available
        .into_iter()
        .filter(|m| !m.migration_type.is_down_migration())
        .filter(|m| !applied.contains(&m.version))
        .map(|m| PendingMigration { version: m.version, name: m.description.to_string() })
        .collect();
    pending.sort_by_key(|m| m.version);
    pending
}

/// Applies pending migrations. Idempotent: a second run applies nothing.
pub async fn run(pool: &PgPool) -> Result<MigrationReport> {
    let before: Vec<PendingMigration> = pending(pool).await?;
    let shipped: usize = plan(MIGRATOR.iter(), &[]).len();

    MIGRATOR
        .run(pool)
        .await
        .context("Failed to apply migrations")?;

    for migration in &before {
        info!("Applied migration {:04}_{}", migration.version, migration.name);
    }

    Ok(MigrationReport {
        applied: before.iter().map(|m| m.version).collect(),
        already_applied: shipped.saturating_sub(before.len()),
    })
}

/// Lists migrations not yet recorded in the ledger
pub async fn pending(pool: &PgPool) -> Result<Vec<PendingMigration>> {
    let applied: Vec<i64> = applied_versions(pool).await?;
    Ok(plan(MIGRATOR.iter(), &applied))
}

/// Successfully applied versions; empty before the first `migrate`
async fn applied_versions(pool: &PgPool) -> Result<Vec<i64>> {
    let ledger_exists: bool = sqlx::query_scalar("SELECT to_regclass('_sqlx_migrations') IS NOT NULL")
        .fetch_one(pool)
        .await
        .context("Failed to look up the migration ledger")?;

    if !ledger_exists {
        return Ok(Vec::new());
    }

    sqlx::query_scalar("SELECT version FROM _sqlx_migrations WHERE success ORDER BY version")
        .fetch_all(pool)
        .await
        .context("Failed to read _sqlx_migrations")
}
