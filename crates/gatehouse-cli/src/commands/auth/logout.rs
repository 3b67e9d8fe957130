//! Logout command implementation.

use anyhow::Result;
use clap::Args;

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LogoutArgs {}

pub async fn run(_args: LogoutArgs, api: &ApiArgs) -> Result<()> {
    let client = commands::connect(api)?;

    client.auth().logout().await?;
    storage::clear_profile()?;

    output::success("Signed out");
    Ok(())
}
