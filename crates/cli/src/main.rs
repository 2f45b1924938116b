//! Atelier CLI - Database migrations and catalog management tools.
//!
//! # Usage
//!
//! ```bash
//! # Run database migrations
//! atelier-cli migrate
//!
//! # Import works from a YAML file
//! atelier-cli works import catalog.yaml
//!
//! # List the catalog
//! atelier-cli works list
//!
//! # Move an order along its lifecycle
//! atelier-cli orders status 42 shipped
//! ```
//!
//! All commands read `ATELIER_DATABASE_URL` (or `DATABASE_URL`) from the
//! environment or a `.env` file.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use atelier_core::OrderId;

mod commands;

#[derive(Parser)]
#[command(name = "atelier-cli")]
#[command(author, version, about = "Atelier CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage catalog works
    Works {
        #[command(subcommand)]
        action: WorksAction,
    },
    /// Manage orders
    Orders {
        #[command(subcommand)]
        action: OrdersAction,
    },
}

#[derive(Subcommand)]
enum WorksAction {
    /// Import works from a YAML file
    Import {
        /// Path to the YAML catalog file
        file: PathBuf,

        /// Validate the file without writing anything
        #[arg(long)]
        dry_run: bool,
    },
    /// List all works, oldest first
    List,
}

#[derive(Subcommand)]
enum OrdersAction {
    /// Change an order's status
    Status {
        /// Order ID
        order_id: OrderId,

        /// New status (`processing`, `shipped`, `delivered`, `cancelled`, `deleted`)
        status: String,
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
        Commands::Works { action } => match action {
            WorksAction::Import { file, dry_run } => {
                commands::works::import(&file, dry_run).await?;
            }
            WorksAction::List => commands::works::list().await?,
        },
        Commands::Orders { action } => match action {
            OrdersAction::Status { order_id, status } => {
                commands::orders::set_status(order_id, &status).await?;
            }
        },
    }
    Ok(())
}
