// Start of file: /src/config/environment.rs

// * Environment configuration with a singleton pattern.
// * Parsing is split from loading so it can be exercised without touching the process env.

use std::{borrow::Cow, collections::HashMap, path::PathBuf};
// * anyhow for convenient error handling
use anyhow::{Context, Result};
// * once_cell for lazy static initialization
use once_cell::sync::Lazy;
use tracing::warn;

use crate::bootstrap::BootstrapLayout;

// ! Default values for environment variables (used if variables aren't set):
const DEFAULT_ENVIRONMENT: &str = "development";
const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 8000;
const DEFAULT_MAX_BODY_SIZE: usize = 2_097_152; // 2MB
const DEFAULT_TIMEOUT: u64 = 30; // 30 seconds
const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432; // Default Postgres port
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "postgres";
const DEFAULT_DB_NAME: &str = "learnflow";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";
const DEFAULT_STATIC_ROOT: &str = "staticfiles";
const DEFAULT_STATIC_DIRS: &str = "static";
const DEFAULT_STATIC_URL: &str = "/static";
const DEFAULT_SITE_DOMAIN: &str = "localhost:8000";
const DEFAULT_ADMIN_USERNAME: &str = "admin";
const DEFAULT_ADMIN_EMAIL: &str = "admin@localhost";
const DEFAULT_SESSION_TTL: u64 = 24 * 60 * 60;

// * A struct containing all environment variables used by the app
#[derive(Clone, Debug)]
pub struct EnvironmentVariables {
    pub environment: Cow<'static, str>,
    pub host: Cow<'static, str>,
    pub port: u16,
    pub max_request_body_size: usize,
    pub default_timeout_seconds: u64,
    pub db_host: Cow<'static, str>,
    pub db_port: u16,
    pub db_user: Cow<'static, str>,
    pub db_password: Cow<'static, str>,
    pub db_name: Cow<'static, str>,
    pub db_max_connections: u32,
    pub redis_url: Cow<'static, str>,
    pub static_root: PathBuf,
    pub static_dirs: Vec<PathBuf>,
    pub static_url: Cow<'static, str>,
    pub site_domain: Cow<'static, str>,
    pub bootstrap_layout: BootstrapLayout,
    pub admin_username: Cow<'static, str>,
    pub admin_email: Cow<'static, str>,
    pub admin_password: Option<String>,
    pub session_ttl_seconds: u64,
    pub csp_override: Option<String>,
}

impl EnvironmentVariables {
    // * Loads environment variables from the process (and .env outside production).
    pub fn load() -> Result<Self> {
        // ? In non-production environments, attempt to load .env
        if std::env::var("ENVIRONMENT").unwrap_or_default() != "production" {
            dotenv::dotenv().ok();
        }

        let vars: HashMap<String, String> = std::env::vars().collect();
        Self::from_vars(&vars)
    }

    // * Builds the configuration from an explicit variable map, providing defaults if missing
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get_var = |key: &str| {
            vars.get(key)
                .map(String::as_str)
                .filter(|value| !value.trim().is_empty())
        };

        let owned_or = |key: &str, default: &'static str| -> Cow<'static, str> {
            get_var(key)
                .map(|s| Cow::Owned(s.to_string()))
                .unwrap_or(Cow::Borrowed(default))
        };

        Ok(Self {
            environment: get_var("ENVIRONMENT")
                .map(|s| Cow::Owned(s.into()))
                .unwrap_or_else(|| {
                    warn!("Missing ENVIRONMENT, defaulting to '{DEFAULT_ENVIRONMENT}'");
                    Cow::Borrowed(DEFAULT_ENVIRONMENT)
                }),

            host: owned_or("HOST", DEFAULT_HOST),

            port: get_var("PORT")
                .map(|s| s.trim().parse().with_context(|| format!("Invalid PORT value '{s}'")))
                .transpose()?
                .unwrap_or(DEFAULT_PORT),

            max_request_body_size: get_var("MAX_REQUEST_BODY_SIZE")
                .map(|s| s.parse().context("Invalid MAX_REQUEST_BODY_SIZE"))
                .transpose()?
                .unwrap_or(DEFAULT_MAX_BODY_SIZE),

            default_timeout_seconds: get_var("DEFAULT_TIMEOUT_SECONDS")
                .map(|s| s.parse().context("Invalid DEFAULT_TIMEOUT_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_TIMEOUT),

            db_host: get_var("DB_HOST")
                .map(|s| Cow::Owned(s.into()))
                .unwrap_or_else(|| {
                    warn!("Missing DB_HOST, defaulting to '{DEFAULT_DB_HOST}'");
                    Cow::Borrowed(DEFAULT_DB_HOST)
                }),

            db_port: get_var("DB_PORT")
                .map(|s| s.parse().context("Invalid DB_PORT"))
                .transpose()?
                .unwrap_or(DEFAULT_DB_PORT),

            db_user: owned_or("DB_USER", DEFAULT_DB_USER),

            db_password: get_var("DB_PASSWORD")
                .map(|s| Cow::Owned(s.into()))
                .unwrap_or_else(|| {
                    warn!("Missing DB_PASSWORD, defaulting to the development password");
                    Cow::Borrowed(DEFAULT_DB_PASSWORD)
                }),

            db_name: owned_or("DB_NAME", DEFAULT_DB_NAME),

            db_max_connections: get_var("DB_MAX_CONNECTIONS")
                .map(|s| s.parse().context("Invalid DB_MAX_CONNECTIONS"))
                .transpose()?
                .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS),

            redis_url: owned_or("REDIS_URL", DEFAULT_REDIS_URL),

            static_root: PathBuf::from(get_var("STATIC_ROOT").unwrap_or(DEFAULT_STATIC_ROOT)),

            static_dirs: get_var("STATIC_DIRS")
                .unwrap_or(DEFAULT_STATIC_DIRS)
                .split(':')
                .map(str::trim)
                .filter(|dir| !dir.is_empty())
                .map(PathBuf::from)
                .collect(),

            static_url: normalize_static_url(get_var("STATIC_URL").unwrap_or(DEFAULT_STATIC_URL)),

            site_domain: owned_or("SITE_DOMAIN", DEFAULT_SITE_DOMAIN),

            bootstrap_layout: get_var("BOOTSTRAP_LAYOUT")
                .map(|s| s.parse().context("Invalid BOOTSTRAP_LAYOUT"))
                .transpose()?
                .unwrap_or_default(),

            admin_username: owned_or("ADMIN_USERNAME", DEFAULT_ADMIN_USERNAME),
            admin_email: owned_or("ADMIN_EMAIL", DEFAULT_ADMIN_EMAIL),
            admin_password: get_var("ADMIN_PASSWORD").map(str::to_string),

            session_ttl_seconds: get_var("SESSION_TTL_SECONDS")
                .map(|s| s.parse().context("Invalid SESSION_TTL_SECONDS"))
                .transpose()?
                .unwrap_or(DEFAULT_SESSION_TTL),

            csp_override: get_var("CONTENT_SECURITY_POLICY").map(str::to_string),
        })
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    // * Returns a reference to the lazily-initialized environment configuration
    pub fn instance() -> Result<&'static Self> {
        static INSTANCE: Lazy<Result<EnvironmentVariables, String>> = Lazy::new(|| {
            let config = EnvironmentVariables::load().map_err(|e| format!("{e:#}"))?;

            if cfg!(debug_assertions) {
                tracing::debug!("Loaded environment configuration for '{}'", config.environment);
            }

            Ok(config)
        });

        INSTANCE
            .as_ref()
            .map_err(|e| anyhow::anyhow!("Failed to load environment configuration: {e}"))
    }
}

// "static/" and "/static/" both mount at "/static"
fn normalize_static_url(raw: &str) -> Cow<'static, str> {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        return Cow::Borrowed(DEFAULT_STATIC_URL);
    }
    Cow::Owned(format!("/{trimmed}"))
}


// End of file: /src/config/environment.rs
