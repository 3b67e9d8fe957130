//! Subcommand implementations.

pub mod auth;
pub mod premises;
pub mod stats;
pub mod visitors;

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use gatehouse::{ApiClient, ApiUrl, ClientConfig};

use crate::cli::{ApiArgs, Cli, Commands};
use crate::reporter::ConsoleReporter;
use crate::session::FileCredentialStore;

pub async fn handle(cli: Cli) -> Result<()> {
    let api = cli.api;
    match cli.command {
        Commands::Login(args) => auth::login::run(args, &api).await,
        Commands::Logout(args) => auth::logout::run(args, &api).await,
        Commands::Signup(args) => auth::signup::run(args, &api).await,
        Commands::Whoami(args) => auth::whoami::run(args, &api).await,
        Commands::Premises(cmd) => premises::handle(cmd, &api).await,
        Commands::Visitors(cmd) => visitors::handle(cmd, &api).await,
        Commands::Stats(args) => stats::run(args, &api).await,
    }
}

/// Build a client over the persisted session.
pub fn connect(api: &ApiArgs) -> Result<ApiClient> {
    let base = ApiUrl::new(&api.api_url).context("Invalid API URL")?;
    let store = FileCredentialStore::open_default().context("Failed to open session store")?;

    let config = ClientConfig {
        user_agent: concat!("gatehouse-cli/", env!("GATEHOUSE_VERSION")).to_string(),
        ..ClientConfig::default()
    };

    Ok(ApiClient::builder(base)
        .config(config)
        .timeout(Duration::from_secs(api.timeout))
        .store(Arc::new(store))
        .reporter(Arc::new(ConsoleReporter))
        .build()?)
}

/// Build a client and fail early when nobody is signed in.
pub fn connect_signed_in(api: &ApiArgs) -> Result<ApiClient> {
    let client = connect(api)?;
    if !client.is_authenticated()? {
        anyhow::bail!("No active session. Run 'gatehouse login' first.");
    }
    Ok(client)
}
