//! Premises commands.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use gatehouse::qr;
use gatehouse::types::{NewPremise, Premise, PremiseUpdate};
use gatehouse::PremiseId;

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;

#[derive(Args, Debug)]
pub struct PremisesCommand {
    #[command(subcommand)]
    pub command: PremisesSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum PremisesSubcommand {
    /// List premises
    List {
        /// Include the number of visitors currently on site
        #[arg(long)]
        occupancy: bool,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one premise
    Get { id: PremiseId },

    /// Create a premise
    Create {
        #[arg(long)]
        name: String,

        #[arg(long, default_value = "")]
        address: String,
    },

    /// Rename or move a premise
    Update {
        id: PremiseId,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        address: Option<String>,
    },

    /// Delete a premise
    Delete { id: PremiseId },

    /// Print the QR image URL and the kiosk sign-in link
    Qr { id: PremiseId },

    /// Save the QR image to a file
    DownloadQr {
        id: PremiseId,

        /// Output path (defaults to visitor-signin-qrcode-<id>.png)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

pub async fn handle(cmd: PremisesCommand, api: &ApiArgs) -> Result<()> {
    let client = commands::connect_signed_in(api)?;
    let premises = client.premises();

    match cmd.command {
        PremisesSubcommand::List { occupancy, json } => {
            let list = if occupancy {
                premises.list_with_occupancy().await?
            } else {
                premises.list().await?
            };

            if json {
                return output::json_pretty(&list);
            }
            if list.is_empty() {
                output::note("No premises found.");
                return Ok(());
            }
            for premise in &list {
                print_row(premise);
            }
        }
        PremisesSubcommand::Get { id } => {
            let premise = premises.get(&id).await?;
            print_details(&premise);
        }
        PremisesSubcommand::Create { name, address } => {
            let premise = premises.create(&NewPremise { name, address }).await?;
            output::success("Premise created");
            print_details(&premise);
        }
        PremisesSubcommand::Update { id, name, address } => {
            let premise = premises
                .update(&id, &PremiseUpdate { name, address })
                .await?;
            output::success("Premise updated");
            print_details(&premise);
        }
        PremisesSubcommand::Delete { id } => {
            premises.delete(&id).await?;
            output::success(&format!("Premise {id} deleted"));
        }
        PremisesSubcommand::Qr { id } => {
            let premise = premises.get(&id).await?;
            let image = premises.qr_image_url(&id).await?;
            let sign_in = qr::visitor_sign_in_url(&api.frontend_url, &id, &premise.name)?;

            output::field("Premise", &premise.name);
            output::field("QR image", &image);
            output::field("Sign-in page", &sign_in);
        }
        PremisesSubcommand::DownloadQr { id, output: path } => {
            let bytes = premises.download_qr_code(&id).await?;
            let path = path.unwrap_or_else(|| PathBuf::from(qr::download_file_name(&id)));

            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::success(&format!("QR code saved to {}", path.display()));
        }
    }

    Ok(())
}

fn print_row(premise: &Premise) {
    let occupancy = premise
        .current_visitors
        .map(|n| format!("  {} on site", n).dimmed().to_string())
        .unwrap_or_default();
    println!(
        "{:>4}  {}  {}{}",
        premise.id.as_str().bold(),
        premise.name,
        premise.address.dimmed(),
        occupancy
    );
}

fn print_details(premise: &Premise) {
    output::field("ID", premise.id.as_str());
    output::field("Name", &premise.name);
    if !premise.address.is_empty() {
        output::field("Address", &premise.address);
    }
    if let Some(ref person) = premise.contact_person {
        output::field("Contact", person);
    }
    if let Some(capacity) = premise.capacity {
        output::field("Capacity", &capacity.to_string());
    }
    output::field("Created", &output::time(premise.created_at));
}
