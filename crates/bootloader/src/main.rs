//! Bootloader - keeps a managed application binary up to date
//!
//! This is the main entry point for the bootloader command-line interface.

mod cli;
mod commands;
mod output;
mod version;

use anyhow::Result;
use bootloader_core::SettingsLoader;
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::warn;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize rustls crypto provider (required for rustls 0.23+)
    // This must be done before any TLS operations
    let _ = rustls::crypto::aws_lc_rs::default_provider().install_default();

    // Parse CLI args
    let cli = Cli::parse();

    // Initialize tracing
    init_tracing(cli.verbose, cli.quiet);

    let loader = SettingsLoader::new(cli.config.clone()).with_overrides(cli.overrides());
    let cancel = cancel_on_ctrl_c();

    // Run command
    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => commands::run::run(&loader, &cancel).await,
        Commands::Check => commands::check::run(&loader, &cancel).await,
        Commands::Version(args) => commands::version::run(args, &loader),
    }
}

/// Cancellation token fired by Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();

    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling update");
            trigger.cancel();
        }
    });

    cancel
}

/// Initialize tracing with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();
}
