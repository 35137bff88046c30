// `collectstatic`: gather assets into STATIC_ROOT

use anyhow::{Context, Result};

use crate::config::environment::EnvironmentVariables;
use crate::staticfiles::{collect_static, confirm_on_stdin, CollectOptions, CollectReport};

/// Runs the copy on the blocking pool; interactive runs prompt on stdin
pub async fn collectstatic(env: &EnvironmentVariables, options: CollectOptions) -> Result<CollectReport> {
    let sources = env.static_dirs.clone();
    let root = env.static_root.clone();

    let report: CollectReport = tokio::task::spawn_blocking(move || {
        collect_static(&sources, &root, options, confirm_on_stdin)
    })
    .await
    .context("Static collection task failed")??;

    Ok(report)
}
