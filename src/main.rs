// Start of file: src/main.rs

use anyhow::Result;
use clap::Parser;

use learnflow_ai::bootstrap::{Bootstrap, BootstrapLayout, LiveRunner};
use learnflow_ai::cli::{Cli, Commands};
use learnflow_ai::commands;
use learnflow_ai::config::state::AppState;
use learnflow_ai::core::{logging::init_tracing, server};
use learnflow_ai::staticfiles::CollectOptions;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli: Cli = Cli::parse();
    let state: &'static AppState = AppState::instance()?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => server::run(state.clone()).await?,

        Commands::Migrate { plan } => {
            let result = commands::migrate(state, plan).await;
            state.shutdown().await;
            result?;
        }

        Commands::Collectstatic { noinput, clear } => {
            let options = CollectOptions { interactive: !noinput, clear };
            commands::collectstatic(&state.environment, options).await?;
        }

        Commands::Bootstrap { phase, layout } => {
            let layout: BootstrapLayout = layout.unwrap_or(state.environment.bootstrap_layout);
            let bootstrap = Bootstrap::new(layout, LiveRunner::new(state.clone()));
            let result = bootstrap.run(phase).await;
            state.shutdown().await;
            result?;
        }

        Commands::Createadmin => {
            let result = commands::createadmin(state).await;
            state.shutdown().await;
            result?;
        }
    }

    Ok(())
}

// End of file: src/main.rs
