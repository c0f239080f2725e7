//! Pineapple POS CLI - Catalog browsing, cart quotes and device listing.
//!
//! # Usage
//!
//! ```bash
//! # List category facets from a catalog file
//! pos-cli --catalog catalog.yaml catalog categories
//!
//! # Search the catalog
//! pos-cli --catalog catalog.yaml catalog search "cola"
//!
//! # Page through the configured database catalog
//! pos-cli catalog page --page 2 --limit 10 --sort-by price --order desc
//!
//! # Price a cart
//! pos-cli --catalog catalog.yaml cart quote p1:2 p7
//!
//! # List printers
//! pos-cli devices list --kind printer
//! ```
//!
//! # Commands
//!
//! - `catalog` - Category facets, search and paginated browsing
//! - `cart quote` - Build a cart from product ids and print its totals
//! - `devices list` - Peripheral devices from the configured provider

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use pineapple_pos_core::CategoryId;
use pineapple_pos_engine::device::DeviceKind;
use pineapple_pos_engine::{EngineConfig, QueryParams, SortBy, SortOrder};

mod commands;

#[derive(Parser)]
#[command(name = "pos-cli")]
#[command(author, version, about = "Pineapple POS CLI tools")]
struct Cli {
    /// Catalog file (YAML or JSON). Without it the configured database is used.
    #[arg(long, global = true)]
    catalog: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Work with carts
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Peripheral devices
    Devices {
        #[command(subcommand)]
        action: DeviceAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// List categories with product counts
    Categories,
    /// Search products by name, brand or category
    Search {
        /// Search text
        query: String,
    },
    /// Fetch one page of products
    Page {
        /// Page number (1-indexed)
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Page size (defaults to `POS_PAGE_SIZE`)
        #[arg(long)]
        limit: Option<u32>,

        /// Sort field (`name`, `price`, `category`, `id`)
        #[arg(long, default_value = "name")]
        sort_by: SortBy,

        /// Sort direction (`asc`, `desc`)
        #[arg(long, default_value = "asc")]
        order: SortOrder,

        /// Search text
        #[arg(short, long)]
        query: Option<String>,

        /// Category id (`all` for no filter)
        #[arg(short, long)]
        category: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Add products to a cart and print the totals
    Quote {
        /// Items as `product_id[:quantity]`
        #[arg(required = true)]
        items: Vec<String>,

        /// Cart snapshot file to resume from and save to
        #[arg(long)]
        snapshot: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum DeviceAction {
    /// List devices
    List {
        /// Only devices of this kind (`printer`, `scanner`, `cloud_sync`)
        #[arg(short, long)]
        kind: Option<DeviceKind>,
    },
}

/// Log filter used when `RUST_LOG` is unset. Directives match by target
/// prefix: `pineapple_pos` covers the library crates, `pos_cli` this binary.
const DEFAULT_LOG_FILTER: &str = "pineapple_pos=info,pos_cli=info";

#[tokio::main]
async fn main() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());

    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = EngineConfig::from_env()?;

    match cli.command {
        Commands::Catalog { action } => {
            let backend = commands::CatalogBackend::open(cli.catalog.as_deref(), &config).await?;
            match action {
                CatalogAction::Categories => commands::catalog::categories(&backend)?,
                CatalogAction::Search { query } => {
                    commands::catalog::search(backend, &query, &config).await?;
                }
                CatalogAction::Page {
                    page,
                    limit,
                    sort_by,
                    order,
                    query,
                    category,
                } => {
                    let params = QueryParams {
                        page,
                        limit: limit.unwrap_or(config.page_size),
                        sort_by,
                        sort_order: order,
                        query,
                        category: category.map(CategoryId::from),
                    };
                    commands::catalog::page(backend, &params, &config).await?;
                }
            }
        }
        Commands::Cart { action } => match action {
            CartAction::Quote { items, snapshot } => {
                let backend =
                    commands::CatalogBackend::open(cli.catalog.as_deref(), &config).await?;
                commands::cart::quote(&backend, &items, snapshot.as_deref(), &config).await?;
            }
        },
        Commands::Devices { action } => match action {
            DeviceAction::List { kind } => commands::devices::list(&config, kind)?,
        },
    }
    Ok(())
}
