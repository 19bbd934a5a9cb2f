//! Shopdesk CLI - database migrations and shop account administration.
//!
//! # Usage
//!
//! ```bash
//! # Apply database migrations (including the session table)
//! shopdesk migrate
//!
//! # Create a shop account
//! shopdesk shop create -e owner@corner.shop -s "Corner Shop" -o "Asha Rao" -p 'long-password'
//!
//! # Review accounts awaiting approval
//! shopdesk shop list
//! shopdesk shop approve owner@corner.shop
//! ```
//!
//! # Environment Variables
//!
//! - `SHOP_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

use shopdesk_core::AccountStatus;

mod commands;

#[derive(Parser)]
#[command(name = "shopdesk")]
#[command(author, version, about = "Shopdesk CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage shop accounts
    Shop {
        #[command(subcommand)]
        action: ShopAction,
    },
}

#[derive(Subcommand)]
enum ShopAction {
    /// Create an active shop account
    Create {
        /// Owner's login email
        #[arg(short, long)]
        email: String,

        /// Shop display name
        #[arg(short, long)]
        shop_name: String,

        /// Owner's name
        #[arg(short, long)]
        owner_name: String,

        /// Initial password (at least 8 characters)
        #[arg(short, long, env = "SHOP_INITIAL_PASSWORD")]
        password: String,
    },
    /// List all shop accounts
    List,
    /// Approve a pending account
    Approve { email: String },
    /// Freeze an account; sign-in is refused until it is approved again
    Freeze { email: String },
    /// Reject a pending account
    Reject { email: String },
    /// Clear failed sign-in attempts and any temporary lock
    Unlock { email: String },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Shop { action } => match action {
            ShopAction::Create {
                email,
                shop_name,
                owner_name,
                password,
            } => {
                commands::shop::create(&email, &shop_name, &owner_name, &password).await?;
            }
            ShopAction::List => commands::shop::list().await?,
            ShopAction::Approve { email } => {
                commands::shop::set_status(&email, AccountStatus::Active).await?;
            }
            ShopAction::Freeze { email } => {
                commands::shop::set_status(&email, AccountStatus::Frozen).await?;
            }
            ShopAction::Reject { email } => {
                commands::shop::set_status(&email, AccountStatus::Rejected).await?;
            }
            ShopAction::Unlock { email } => commands::shop::unlock(&email).await?,
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parses_status_commands() {
        let cli = Cli::try_parse_from(["shopdesk", "shop", "freeze", "owner@corner.shop"]);
        assert!(matches!(
            cli.map(|c| c.command),
            Ok(Commands::Shop {
                action: ShopAction::Freeze { .. }
            })
        ));
    }
}
