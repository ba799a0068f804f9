//! Retainer CLI - retention policy for GHCR container images.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;

use commands::{Cli, Commands, RunStatus};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "retainer=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Prune(args) => commands::prune::execute(args).await,
        Commands::Plan(args) => commands::plan::execute(args).await,
        Commands::Version => {
            println!("retainer {}", env!("CARGO_PKG_VERSION"));
            Ok(RunStatus::Completed)
        }
    };

    match result {
        Ok(status) => status.into(),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
