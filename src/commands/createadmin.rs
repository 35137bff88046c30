// `createadmin`: idempotent superuser from ADMIN_* variables

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::api::auth::service::{self, NewUser, Role};
use crate::config::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminOutcome {
    Created,
    AlreadyExists,
}

pub async fn createadmin(state: &AppState) -> Result<AdminOutcome> {
    let env = &state.environment;
    state
        .database
        .initialize()
        .await
        .context("Cannot create the superuser without a database connection")?;
    let pool = state.database.get_pool()?;

    if service::username_exists(pool, &env.admin_username).await? {
        warn!("Superuser already exists.");
        return Ok(AdminOutcome::AlreadyExists);
    }

    let password: &str = env
        .admin_password
        .as_deref()
        .context("ADMIN_PASSWORD must be set to create the superuser")?;

    let admin = NewUser {
        username: &env.admin_username,
        email: &env.admin_email,
        password,
        role: Role::Teacher,
        is_superuser: true,
    };
    service::create_user(pool, &admin).await?;

    info!("Superuser created.");
    Ok(AdminOutcome::Created)
}
