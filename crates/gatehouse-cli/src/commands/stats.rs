//! Dashboard statistics command.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use gatehouse::types::ActivityType;

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;

#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Print JSON instead of a summary
    #[arg(long)]
    pub json: bool,
}

pub async fn run(args: StatsArgs, api: &ApiArgs) -> Result<()> {
    let client = commands::connect_signed_in(api)?;
    let stats = client.stats().dashboard().await?;

    if args.json {
        return output::json_pretty(&stats);
    }

    output::field("Total visitors", &stats.total_visitors.to_string());
    output::field("On site", &stats.active_visitors.to_string());
    output::field("Average visit", &stats.average_duration);
    output::field("Recent sign-ins", &stats.recent_sign_ins.to_string());
    output::field("Recent sign-outs", &stats.recent_sign_outs.to_string());

    if !stats.sign_ins_by_premise.is_empty() {
        println!();
        println!("{}", "Sign-ins by premise".bold());
        for entry in &stats.sign_ins_by_premise {
            println!("  {:<24} {}", entry.name, entry.value);
        }
    }

    if !stats.recent_activity.is_empty() {
        println!();
        println!("{}", "Recent activity".bold());
        for activity in &stats.recent_activity {
            let verb = match activity.activity_type {
                ActivityType::SignIn => "signed in".green(),
                ActivityType::SignOut => "signed out".yellow(),
            };
            println!(
                "  {}  {} {} {}",
                activity.timestamp.format("%Y-%m-%d %H:%M").to_string().dimmed(),
                activity.visitor_name,
                verb,
                activity.premise.as_deref().unwrap_or_default()
            );
        }
    }

    Ok(())
}
