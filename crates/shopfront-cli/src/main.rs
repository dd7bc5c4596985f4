mod cart;
mod products;

use clap::{Parser, Subcommand};
use shopfront_client::StoreClient;
use shopfront_core::SortDirection;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "shopfront")]
#[command(about = "Browse the storefront catalog and manage the shopping cart")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// List products, optionally filtered by category and sorted by price
    Products {
        /// Category to filter by; omit for all categories
        #[arg(long, default_value = "")]
        category: String,
        /// Price ordering: asc or desc
        #[arg(long, default_value = "asc")]
        sort: SortDirection,
        /// Number of additional pages to load after the first
        #[arg(long, default_value_t = 0)]
        more: usize,
    },
    /// Inspect or change the shopping cart
    Cart {
        #[command(subcommand)]
        command: CartCommands,
    },
}

#[derive(Debug, Subcommand)]
enum CartCommands {
    /// Show cart contents and totals
    List,
    /// Add a product with quantity 1
    Add { product_id: u64 },
    /// Set the quantity of a cart item
    Update { cart_item_id: u64, quantity: u32 },
    /// Remove a cart item
    Remove { cart_item_id: u64 },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("shopfront: run with --help to see available commands");
        return Ok(());
    };

    let config = shopfront_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();
    tracing::debug!(env = %config.env, base_url = %config.api_base_url, "configuration loaded");

    let client = StoreClient::from_config(&config)?;

    match command {
        Commands::Products {
            category,
            sort,
            more,
        } => products::run_products(client, &config, &category, sort, more).await,
        Commands::Cart { command } => cart::run_cart(client, &config, command).await,
    }
}
