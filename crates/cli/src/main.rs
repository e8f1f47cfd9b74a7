//! Homegrid CLI - database migrations and catalog maintenance.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! hg-cli migrate
//!
//! # Seed the reference catalog, a starter kit and a guide
//! hg-cli seed
//!
//! # Run a maintenance pass (prices | stock | availability | full)
//! hg-cli update full
//! hg-cli update stock --simulate
//!
//! # Create an admin user
//! hg-cli admin create -e admin@example.com -p <password>
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "hg-cli")]
#[command(author, version, about = "Homegrid CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Seed the database with the reference catalog
    Seed,
    /// Run a catalog maintenance pass
    Update {
        /// What to update: prices, stock, availability or full
        update_type: String,

        /// Apply randomized drift (demo environments only)
        #[arg(long)]
        simulate: bool,
    },
    /// Manage admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum AdminAction {
    /// Create a new admin user
    Create {
        /// Admin email address
        #[arg(short, long)]
        email: String,

        /// Admin password
        #[arg(short, long)]
        password: String,
    },
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
        Commands::Seed => commands::seed::run().await?,
        Commands::Update {
            update_type,
            simulate,
        } => commands::update::run(&update_type, simulate).await?,
        Commands::Admin { action } => match action {
            AdminAction::Create { email, password } => {
                commands::admin::create_user(&email, &password).await?;
            }
        },
    }
    Ok(())
}
