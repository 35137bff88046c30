// Runs bootstrap steps against the real database, filesystem and listener

use async_trait::async_trait;

use crate::commands;
use crate::config::state::AppState;
use crate::core::server;
use crate::staticfiles::{CollectOptions, CollectReport};

use super::{Step, StepRunner};

pub struct LiveRunner {
    state: AppState,
}

impl LiveRunner {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl StepRunner for LiveRunner {
    async fn run(&self, step: Step) -> anyhow::Result<()> {
        match step {
            Step::Migrate => commands::migrate(&self.state, false).await,
            Step::CollectStatic => {
                // Pipelines never prompt
                let report: CollectReport =
                    commands::collectstatic(&self.state.environment, CollectOptions::noinput()).await?;
                tracing::debug!("collectstatic report: {:?}", report);
                Ok(())
            }
            Step::Serve => server::run(self.state.clone()).await,
        }
    }
}
