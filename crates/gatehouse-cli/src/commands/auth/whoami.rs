//! Whoami command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct WhoamiArgs {}

pub async fn run(_args: WhoamiArgs, api: &ApiArgs) -> Result<()> {
    let client = commands::connect_signed_in(api)?;

    let user = storage::load_profile()
        .context("Failed to load profile")?
        .context("No active session. Run 'gatehouse login' first.")?;

    output::field("User", &user.display_name());
    output::field("Username", &user.username);
    if !user.email.is_empty() {
        output::field("Email", &user.email);
    }
    output::field("API", client.base_url().as_str());

    Ok(())
}
