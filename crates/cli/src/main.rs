//! Shopfront CLI - Catalog seeding and cart inspection tools.
//!
//! # Usage
//!
//! ```bash
//! # List the built-in catalog
//! shop-cli catalog list
//!
//! # Upsert the built-in catalog into the hosted backend
//! shop-cli catalog seed
//!
//! # Inspect file-backed carts
//! shop-cli cart list --dir data/carts
//! shop-cli cart show -c <client-key>
//! shop-cli cart clear -c <client-key>
//! ```
//!
//! # Commands
//!
//! - `catalog` - Built-in catalog listing and backend seeding
//! - `cart` - Persisted cart inspection and cleanup

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "shop-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Catalog tools
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect persisted carts
    Cart {
        /// Cart directory (defaults to `STOREFRONT_CART_DIR` or data/carts)
        #[arg(short, long, global = true)]
        dir: Option<PathBuf>,

        #[command(subcommand)]
        action: CartAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List the built-in products
    List,
    /// Upsert the built-in products into the hosted backend
    Seed,
}

#[derive(Subcommand)]
enum CartAction {
    /// List clients with a saved cart
    List,
    /// Show one client's cart
    Show {
        /// Client key (UUID)
        #[arg(short, long)]
        client: String,
    },
    /// Empty one client's cart
    Clear {
        /// Client key (UUID)
        #[arg(short, long)]
        client: String,
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
        Commands::Catalog { action } => match action {
            CatalogAction::List => commands::catalog::list(),
            CatalogAction::Seed => {
                commands::catalog::seed().await?;
            }
        },
        Commands::Cart { dir, action } => {
            let dir = commands::cart::resolve_dir(dir)?;
            match action {
                CartAction::List => {
                    commands::cart::list(&dir)?;
                }
                CartAction::Show { client } => commands::cart::show(&dir, &client)?,
                CartAction::Clear { client } => commands::cart::clear(&dir, &client)?,
            }
        }
    }
    Ok(())
}
