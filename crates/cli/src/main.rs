//! EasyVol CLI - Database migrations and management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations (includes the session table)
//! easyvol-cli migrate
//!
//! # Create a user account (seeded with the default password)
//! easyvol-cli user create -u mario.rossi -e mario@example.org -n "Mario Rossi"
//!
//! # Export database-stored print templates to JSON files
//! easyvol-cli templates export -d ./print-templates
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create user accounts
//! - `templates export` - Move legacy database print templates to files

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "easyvol-cli")]
#[command(author, version, about = "EasyVol CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Manage print templates
    Templates {
        #[command(subcommand)]
        action: TemplatesAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user account with the default password
    Create {
        /// Login username
        #[arg(short, long)]
        username: String,

        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short = 'n', long)]
        full_name: Option<String>,

        /// Role name to assign (e.g. "Amministratore")
        #[arg(short, long)]
        role: Option<String>,
    },
}

#[derive(Subcommand)]
enum TemplatesAction {
    /// Export database-stored templates to JSON files and deactivate them
    Export {
        /// Destination directory, one subdirectory per entity type
        #[arg(short, long, default_value = "print-templates")]
        dir: std::path::PathBuf,
    },
}

#[tokio::main]
async fn main() {
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
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                email,
                full_name,
                role,
            } => {
                commands::user::create(&username, &email, full_name.as_deref(), role.as_deref())
                    .await?;
            }
        },
        Commands::Templates { action } => match action {
            TemplatesAction::Export { dir } => commands::templates::export(&dir).await?,
        },
    }
    Ok(())
}
