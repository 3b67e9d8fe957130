//! Signup command implementation.

use anyhow::Result;
use clap::Args;
use gatehouse::api::SignupRequest;

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;

#[derive(Args, Debug)]
pub struct SignupArgs {
    /// Username for the new account
    pub username: String,

    /// Contact email
    #[arg(long)]
    pub email: String,

    /// Account password
    #[arg(long, env = "GATEHOUSE_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Name of the first premise
    #[arg(long)]
    pub premise_name: String,

    /// Address of the first premise
    #[arg(long)]
    pub premise_address: Option<String>,

    #[arg(long)]
    pub first_name: Option<String>,

    #[arg(long)]
    pub last_name: Option<String>,
}

pub async fn run(args: SignupArgs, api: &ApiArgs) -> Result<()> {
    let client = commands::connect(api)?;

    let request = SignupRequest {
        username: args.username,
        email: args.email,
        confirm_password: args.password.clone(),
        password: args.password,
        premise_name: args.premise_name,
        premise_address: args.premise_address,
        first_name: args.first_name,
        last_name: args.last_name,
    };

    let user = client.auth().signup(&request).await?;

    output::field("User", &user.username);
    output::field("Email", &user.email);
    output::success("Account created. Run 'gatehouse login' to sign in.");

    Ok(())
}
