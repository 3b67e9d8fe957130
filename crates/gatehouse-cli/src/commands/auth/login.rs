//! Login command implementation.

use anyhow::{Context, Result};
use clap::Args;
use gatehouse::Credentials;

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;
use crate::session::storage;

#[derive(Args, Debug)]
pub struct LoginArgs {
    /// Staff username
    #[arg(long)]
    pub username: String,

    /// Account password
    #[arg(long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(args: LoginArgs, api: &ApiArgs) -> Result<()> {
    let client = commands::connect(api)?;

    output::note("Signing in...");

    let user = client
        .auth()
        .signin(Credentials::new(&args.username, &args.password))
        .await?;

    storage::save_profile(&user).context("Failed to save profile")?;

    output::success("Signed in successfully");
    println!();
    output::field("User", &user.display_name());
    output::field("API", client.base_url().as_str());

    Ok(())
}
