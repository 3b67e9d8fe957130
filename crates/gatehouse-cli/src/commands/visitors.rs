//! Visitor commands.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use colored::Colorize;
use gatehouse::types::{
    IdPhoto, Visitor, VisitorFilter, VisitorSignIn, VisitorSignOut, VisitorStatus,
};
use gatehouse::{PremiseId, VisitorId};

use crate::cli::ApiArgs;
use crate::commands;
use crate::output;

#[derive(Args, Debug)]
pub struct VisitorsCommand {
    #[command(subcommand)]
    pub command: VisitorsSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum VisitorsSubcommand {
    /// List visitors
    List {
        /// Only visitors in this state (pending, signed_in, rejected, signed_out)
        #[arg(long)]
        status: Option<VisitorStatus>,

        /// Only visitors at this premise
        #[arg(long)]
        premise: Option<PremiseId>,

        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Show one visitor
    Get { id: VisitorId },

    /// Let a pending visitor in
    Approve { id: VisitorId },

    /// Turn a pending visitor away
    Reject { id: VisitorId },

    /// Submit the kiosk sign-in form
    SignIn(SignInArgs),

    /// Sign out from a premise
    SignOut {
        #[arg(long)]
        premise: PremiseId,
    },
}

#[derive(Args, Debug)]
pub struct SignInArgs {
    #[arg(long)]
    pub premise: PremiseId,

    #[arg(long)]
    pub first_name: String,

    #[arg(long)]
    pub second_name: String,

    #[arg(long)]
    pub phone: String,

    #[arg(long)]
    pub reason: String,

    #[arg(long, default_value = "")]
    pub person_visiting: String,

    #[arg(long, default_value = "")]
    pub room: String,

    /// Photo of an ID document
    #[arg(long)]
    pub id_photo: Option<PathBuf>,
}

pub async fn handle(cmd: VisitorsCommand, api: &ApiArgs) -> Result<()> {
    match cmd.command {
        // Kiosk actions work without a staff session.
        VisitorsSubcommand::SignIn(args) => {
            let client = commands::connect(api)?;
            let form = sign_in_form(args)?;
            let visitor = client.visitors().sign_in(&form).await?;
            output::success("Signed in; waiting for approval");
            print_details(&visitor);
        }
        VisitorsSubcommand::SignOut { premise } => {
            let client = commands::connect(api)?;
            let request = VisitorSignOut {
                premise,
                sign_out_time: None,
            };
            let visitor = client.visitors().sign_out(&request).await?;
            output::success(&format!("Goodbye, {}", visitor.full_name()));
        }
        VisitorsSubcommand::List {
            status,
            premise,
            json,
        } => {
            let client = commands::connect_signed_in(api)?;
            let filter = VisitorFilter {
                status,
                premise,
            };
            let visitors = client.visitors().list(&filter).await?;

            if json {
                return output::json_pretty(&visitors);
            }
            if visitors.is_empty() {
                output::note("No visitors found.");
                return Ok(());
            }
            for visitor in &visitors {
                print_row(visitor);
            }
        }
        VisitorsSubcommand::Get { id } => {
            let client = commands::connect_signed_in(api)?;
            print_details(&client.visitors().get(id).await?);
        }
        VisitorsSubcommand::Approve { id } => {
            let client = commands::connect_signed_in(api)?;
            let visitor = client
                .visitors()
                .approve(id, Some(chrono::Utc::now()))
                .await?;
            output::success(&format!("{} approved", visitor.full_name()));
        }
        VisitorsSubcommand::Reject { id } => {
            let client = commands::connect_signed_in(api)?;
            let visitor = client
                .visitors()
                .reject(id, Some(chrono::Utc::now()))
                .await?;
            output::success(&format!("{} rejected", visitor.full_name()));
        }
    }

    Ok(())
}

fn sign_in_form(args: SignInArgs) -> Result<VisitorSignIn> {
    let id_photo = args.id_photo.as_deref().map(read_photo).transpose()?;

    Ok(VisitorSignIn {
        premise: args.premise,
        first_name: args.first_name,
        second_name: args.second_name,
        phone_number: args.phone,
        person_visiting: args.person_visiting,
        room_number: args.room,
        reason: args.reason,
        id_photo,
    })
}

fn read_photo(path: &Path) -> Result<IdPhoto> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "id_photo".to_string());
    let content_type = match path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("jpg" | "jpeg") => Some("image/jpeg".to_string()),
        Some("png") => Some("image/png".to_string()),
        Some("webp") => Some("image/webp".to_string()),
        _ => None,
    };

    Ok(IdPhoto {
        file_name,
        content_type,
        bytes,
    })
}

fn print_row(visitor: &Visitor) {
    let status = visitor
        .status
        .map(|s| s.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:>5}  {:<24}  {:<10}  premise {}  {}",
        visitor.id.to_string().bold(),
        visitor.full_name(),
        status,
        visitor.premise,
        output::time(visitor.sign_in_time).dimmed()
    );
}

fn print_details(visitor: &Visitor) {
    output::field("ID", &visitor.id.to_string());
    output::field("Name", &visitor.full_name());
    output::field("Phone", &visitor.phone_number);
    output::field("Premise", visitor.premise.as_str());
    if !visitor.person_visiting.is_empty() {
        output::field("Visiting", &visitor.person_visiting);
    }
    if !visitor.room_number.is_empty() {
        output::field("Room", &visitor.room_number);
    }
    output::field("Reason", &visitor.reason);
    if let Some(status) = visitor.status {
        output::field("Status", status.as_str());
    }
    output::field("Signed in", &output::time(visitor.sign_in_time));
    output::field("Signed out", &output::time(visitor.sign_out_time));
}
