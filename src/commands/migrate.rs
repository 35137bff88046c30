// `migrate`: bring the schema up to date

use anyhow::{Context, Result};
use tracing::info;

use crate::config::state::AppState;
use crate::database::migrations::{MigrationReport, PendingMigration};

/// Connects and applies pending migrations, or only lists them when `plan_only`
pub async fn migrate(state: &AppState, plan_only: bool) -> Result<()> {
    state
        .database
        .initialize()
        .await
        .context("Cannot migrate without a database connection")?;

    if plan_only {
        let pending: Vec<PendingMigration> = state.database.pending_migrations().await?;
        if pending.is_empty() {
            info!("No planned migration operations.");
        }
        for migration in &pending {
            info!("Planned: {:04}_{}", migration.version, migration.name);
        }
        return Ok(());
    }

    let report: MigrationReport = state.database.migrate().await?;
    if report.is_noop() {
        info!("No migrations to apply ({} already applied).", report.already_applied);
    } else {
        info!(
            "Applied {} migration(s): {:?}",
            report.applied.len(),
            report.applied
        );
    }
    Ok(())
}
