mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use beacon_relay_core::{bootstrap, logging, Relay};
use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::cli::{write_usage, Cli, Command, RunArgs, VERSION};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.version {
        println!("{}", *VERSION);
        return ExitCode::SUCCESS;
    }

    let Some(Command::Run(args)) = cli.command else {
        // No subcommand: behave like --help
        if let Err(e) = write_usage(&mut std::io::stdout()) {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
        return ExitCode::SUCCESS;
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: RunArgs) -> Result<()> {
    let mut config = bootstrap::load_config(args.config.as_deref())?;
    args.apply(&mut config);
    bootstrap::validate_config(&config)?;

    logging::init_logging(&config.logging)?;
    info!("{}", *VERSION);

    let publisher = bootstrap::build_publisher(&config.twitter)?;
    let source = bootstrap::build_round_source(&config.beacon).await?;

    let cancel = CancellationToken::new();
    let signal_token = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        signal_token.cancel();
    });

    let relay = Relay::new(Arc::new(source), Arc::new(publisher), &config.relay);
    relay.run(cancel).await;

    info!("Relay stopped");
    Ok(())
}

/// Resolves on SIGINT or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => { info!("Received Ctrl+C, shutting down"); }
        () = terminate => { info!("Received SIGTERM, shutting down"); }
    }
}
