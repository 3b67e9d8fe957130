//! CLI argument definitions.

use clap::{Args, Parser, Subcommand};
use gatehouse::types::DEFAULT_API_URL;

use crate::commands::auth::{LoginArgs, LogoutArgs, SignupArgs, WhoamiArgs};
use crate::commands::premises::PremisesCommand;
use crate::commands::stats::StatsArgs;
use crate::commands::visitors::VisitorsCommand;

/// Front desk tool for the Gatehouse visitor service.
#[derive(Parser, Debug)]
#[command(name = "gatehouse")]
#[command(author, version = env!("GATEHOUSE_VERSION"), about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(flatten)]
    pub api: ApiArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Where the service lives.
#[derive(Args, Debug, Clone)]
pub struct ApiArgs {
    /// API base URL
    #[arg(long, env = "GATEHOUSE_API_URL", default_value = DEFAULT_API_URL, global = true)]
    pub api_url: String,

    /// Base URL of the visitor kiosk pages, used for QR sign-in links
    #[arg(
        long,
        env = "GATEHOUSE_FRONTEND_URL",
        default_value = "http://localhost:8080",
        global = true
    )]
    pub frontend_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "GATEHOUSE_TIMEOUT", default_value_t = 30, global = true)]
    pub timeout: u64,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session
    Login(LoginArgs),

    /// Sign out and forget the session
    Logout(LogoutArgs),

    /// Register a new account and its first premise
    Signup(SignupArgs),

    /// Display the signed-in user
    Whoami(WhoamiArgs),

    /// Premises management
    Premises(PremisesCommand),

    /// Visitor records and kiosk actions
    Visitors(VisitorsCommand),

    /// Dashboard statistics
    Stats(StatsArgs),
}
