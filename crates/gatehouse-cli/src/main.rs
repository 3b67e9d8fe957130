//! gatehouse - command-line front desk for the Gatehouse visitor service.
//!
//! A thin wrapper over the `gatehouse` library. The session is kept in the
//! user's data directory so tokens refreshed by one command are used by the
//! next.

mod cli;
mod commands;
mod output;
mod reporter;
mod session;

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match commands::handle(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            print_failure(&e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbosity: u8, json: bool) {
    let filter = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}

fn print_failure(err: &anyhow::Error) {
    match err.downcast_ref::<gatehouse::Error>() {
        Some(api) if api.is_session_expired() => {
            if let Err(e) = session::storage::clear_profile() {
                tracing::warn!(error = %e, "Failed to clear stored profile");
            }
            output::error("Session expired. Run 'gatehouse login' to sign in again.");
        }
        // Already shown by the console reporter.
        Some(api) if api.is_reportable() && reporter::was_reported(&api.user_message()) => {}
        _ => output::error(&format!("{err:#}")),
    }
}
