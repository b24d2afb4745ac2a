//! Fitment Forge CLI - Database migrations and role management.
//!
//! # Usage
//!
//! ```bash
//! # Run storefront database migrations
//! ff-cli migrate
//!
//! # Grant a role to a user
//! ff-cli role assign --user-id 6f1c2a9e-0d4b-4a57-9a43-3f1f0e8c2b11 --role admin
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `role assign` - Assign a role (no-op if the user already has one)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "ff-cli")]
#[command(author, version, about = "Fitment Forge CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run storefront database migrations
    Migrate,
    /// Manage user roles
    Role {
        #[command(subcommand)]
        action: RoleAction,
    },
}

#[derive(Subcommand)]
enum RoleAction {
    /// Assign a role to a user
    Assign {
        /// User ID (UUID)
        #[arg(short, long)]
        user_id: String,

        /// Role (`admin` or `user`)
        #[arg(short, long, default_value = "user")]
        role: String,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Role { action } => match action {
            RoleAction::Assign { user_id, role } => {
                commands::role::assign(&user_id, &role).await?;
            }
        },
    }
    Ok(())
}
