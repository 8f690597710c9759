//! Corner Shop CLI - cart, wishlist and catalog from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Browse the catalog
//! shop products list --category Electronics --sort asc
//! shop products search phone
//!
//! # Fill the cart
//! shop cart add 4 --quantity 2
//! shop cart list
//! shop cart total
//!
//! # Save for later
//! shop wishlist toggle 5
//! shop wishlist to-cart 5
//! ```
//!
//! # Commands
//!
//! - `cart` - List, add, remove and total cart entries
//! - `wishlist` - Manage saved products
//! - `products` - Query the catalog
//! - `categories` - List categories and subcategories
//!
//! The cart and wishlist are stored under `STOREFRONT_DATA_DIR`; catalog
//! commands need `CATALOG_GRAPHQL_URL`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use cornershop_core::{Price, ProductId};
use cornershop_storefront::catalog::PriceOrder;
use cornershop_storefront::config::StorefrontConfig;
use cornershop_storefront::error::{AppError, Result};
use cornershop_storefront::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "shop")]
#[command(author, version, about = "Corner Shop storefront")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Query the product catalog
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// List categories and their subcategories
    Categories,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show cart lines and the total
    List,
    /// Add a product by id
    Add {
        /// Product id
        id: ProductId,

        /// Number of copies to add
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove every copy of a product
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Show the cart total
    Total,
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show saved products
    List,
    /// Save a product by id
    Add {
        /// Product id
        id: ProductId,
    },
    /// Remove a saved product
    Remove {
        /// Product id
        id: ProductId,
    },
    /// Save a product, or remove it if already saved
    Toggle {
        /// Product id
        id: ProductId,
    },
    /// Add a saved product to the cart, keeping it saved
    ToCart {
        /// Product id
        id: ProductId,
    },
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List products
    List {
        /// Only products in this category
        #[arg(short, long)]
        category: Option<String>,

        /// Order by price (`asc` or `desc`)
        #[arg(short, long)]
        sort: Option<PriceOrder>,
    },
    /// Products whose name contains the text
    Search {
        /// Text to look for, case-insensitive
        text: String,
    },
    /// Products within a price range (inclusive)
    Price {
        /// Lowest price
        from: Price,
        /// Highest price
        to: Price,
    },
    /// Show one product
    Get {
        /// Product id
        id: ProductId,
    },
    /// Products in any of the given subcategories
    Filter {
        /// Subcategory names; none means every product
        subcategories: Vec<String>,
    },
    /// Suggested products
    Suggested,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            let err = AppError::from(e);
            err.report();
            return ExitCode::from(err.exit_code());
        }
    };

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "cornershop_storefront=info,cornershop_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    match run(cli, config).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            e.report();
            ExitCode::from(e.exit_code())
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<()> {
    let state = AppState::new(config)?;

    match cli.command {
        Commands::Cart { action } => match action {
            CartAction::List => commands::cart::list(&state),
            CartAction::Add { id, quantity } => commands::cart::add(&state, id, quantity).await?,
            CartAction::Remove { id } => commands::cart::remove(&state, id)?,
            CartAction::Total => commands::cart::total(&state),
            CartAction::Clear => commands::cart::clear(&state)?,
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::List => commands::wishlist::list(&state),
            WishlistAction::Add { id } => commands::wishlist::add(&state, id).await?,
            WishlistAction::Remove { id } => commands::wishlist::remove(&state, id)?,
            WishlistAction::Toggle { id } => commands::wishlist::toggle(&state, id).await?,
            WishlistAction::ToCart { id } => commands::wishlist::to_cart(&state, id)?,
        },
        Commands::Products { action } => match action {
            ProductsAction::List { category, sort } => {
                commands::products::list(&state, sort, category.as_deref()).await?;
            }
            ProductsAction::Search { text } => commands::products::search(&state, &text).await?,
            ProductsAction::Price { from, to } => {
                commands::products::by_price(&state, from, to).await?;
            }
            ProductsAction::Get { id } => commands::products::get(&state, id).await?,
            ProductsAction::Filter { subcategories } => {
                commands::products::filter(&state, &subcategories).await?;
            }
            ProductsAction::Suggested => commands::products::suggested(&state).await?,
        },
        Commands::Categories => commands::products::categories(&state).await?,
    }
    Ok(())
}
