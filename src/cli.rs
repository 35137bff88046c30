use clap::{Parser, Subcommand};

use crate::bootstrap::{BootstrapLayout, Phase};

#[derive(Parser)]
#[command(name = "learnflow-ai")]
#[command(about = "LearnFlow AI web service and its management commands")]
#[command(version)]
pub struct Cli {
    /// Defaults to `serve`
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Bind HOST:PORT and serve the application
    Serve,

    /// Apply pending database migrations
    Migrate {
        /// List pending migrations without applying them
        #[arg(long)]
        plan: bool,
    },

    /// Collect static files into STATIC_ROOT
    Collectstatic {
        /// Never prompt for confirmation
        #[arg(long)]
        noinput: bool,

        /// Remove existing files from STATIC_ROOT first
        #[arg(long)]
        clear: bool,
    },

    /// Run the container pipeline for one phase
    Bootstrap {
        /// build (image build) or start (container entry point)
        #[arg(long)]
        phase: Phase,

        /// Overrides BOOTSTRAP_LAYOUT (build, start or split)
        #[arg(long)]
        layout: Option<BootstrapLayout>,
    },

    /// Create the superuser from ADMIN_USERNAME, ADMIN_EMAIL and ADMIN_PASSWORD
    Createadmin,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["learnflow-ai"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_bootstrap_flags() {
        let cli = Cli::try_parse_from(["learnflow-ai", "bootstrap", "--phase", "start", "--layout", "build"]).unwrap();
        match cli.command {
            Some(Commands::Bootstrap { phase, layout }) => {
                assert_eq!(phase, Phase::Start);
                assert_eq!(layout, Some(BootstrapLayout::Build));
            }
            _ => panic!("expected bootstrap"),
        }
    }

    #[test]
    fn parses_collectstatic_flags() {
        let cli = Cli::try_parse_from(["learnflow-ai", "collectstatic", "--noinput"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Collectstatic { noinput: true, clear: false })));
    }

    #[test]
    fn rejects_unknown_phase() {
        assert!(Cli::try_parse_from(["learnflow-ai", "bootstrap", "--phase", "deploy"]).is_err());
    }
}
