//! docsentry - self-healing documentation-header enforcement for git commits.

use clap::{Parser, Subcommand};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use docsentry::hook::HookMode;
use docsentry::{cli, Error};

#[derive(Parser)]
#[command(name = "docsentry")]
#[command(about = "docsentry - documentation-header enforcement at commit time")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize docsentry for this project
    Init {
        /// Skip installing the pre-commit hook
        #[arg(long)]
        no_hooks: bool,
    },

    /// Install or update the pre-commit hook
    Install {
        /// Hook behavior mode
        #[arg(long, value_enum, default_value_t = HookMode::Warn)]
        mode: HookMode,

        /// Replace an unrelated pre-existing hook
        #[arg(long)]
        force: bool,
    },

    /// Remove the pre-commit hook
    Uninstall,

    /// Show hook installation status
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show hook health and self-healing state
    Health {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Reset hook health after a downgrade
    Reset,

    /// Show recent enforcement events
    Events {
        /// Maximum events to show
        #[arg(long, default_value_t = 50)]
        limit: usize,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Internal: hook entry points (used by the installed artifact)
    #[command(name = "_internal", hide = true)]
    Internal {
        #[command(subcommand)]
        command: InternalCommands,
    },
}

#[derive(Subcommand)]
enum InternalCommands {
    /// Pre-commit enforcement pass
    PreCommit,
}

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env().add_directive("docsentry=info".parse().unwrap()))
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => {
            // Show help when no command provided
            use clap::CommandFactory;
            Cli::command().print_help().unwrap();
            println!();
        }
        Some(Commands::Init { no_hooks }) => {
            cli::init::run(no_hooks).await?;
        }
        Some(Commands::Install { mode, force }) => {
            cli::install::run(mode, force).await?;
        }
        Some(Commands::Uninstall) => {
            cli::uninstall::run().await?;
        }
        Some(Commands::Status { json }) => {
            cli::status::run(json).await?;
        }
        Some(Commands::Health { json }) => {
            cli::health::run(json).await?;
        }
        Some(Commands::Reset) => {
            cli::reset::run().await?;
        }
        Some(Commands::Events { limit, json }) => {
            cli::events::run(limit, json).await?;
        }
        Some(Commands::Internal { command }) => match command {
            InternalCommands::PreCommit => {
                let exit_code = cli::internal::pre_commit().await?;
                if exit_code != 0 {
                    std::process::exit(exit_code);
                }
            }
        },
    }

    Ok(())
}
