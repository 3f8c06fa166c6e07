//! Scheduled folder transfer bot - entry point.

use alloy::primitives::{Address, U256};
use anyhow::Result;
use bundl_orderbook::OrderbookStatus;
use clap::{Parser, Subcommand};
use tracing::info;

/// Scheduled folder transfer bot
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via BUNDL_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the fill loop
    Run,
    /// Run a single polling pass and exit
    Tick,
    /// Create, sign and publish a scheduled transfer order
    Create {
        /// Folder token id to transfer
        #[arg(long)]
        token_id: U256,
        /// Recipient of the folder token
        #[arg(long)]
        to: Address,
        /// Delay before the transfer becomes fillable (seconds);
        /// defaults to the configured transfer delay
        #[arg(long)]
        delay_secs: Option<u64>,
    },
    /// Ask the orderbook to stop serving an order
    Cancel {
        order_hash: String,
    },
    /// Show an order's status
    Status {
        order_hash: String,
    },
    /// List orders for a maker (defaults to the signing key's address)
    List {
        #[arg(long)]
        maker: Option<Address>,
        /// Restrict to one status (pending/active/filled/cancelled/expired)
        #[arg(long)]
        status: Option<OrderbookStatus>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    bundl_bot::logging::init_logging();

    info!("Starting bundl-bot v{}", env!("CARGO_PKG_VERSION"));

    let config = match args.config {
        Some(path) => bundl_bot::AppConfig::from_file(&path)?,
        None => bundl_bot::AppConfig::load()?,
    };
    info!(
        network_id = config.network_id,
        orderbook_url = %config.orderbook_url,
        "Configuration loaded"
    );

    let app = bundl_bot::Application::new(config);

    match args.command {
        Command::Run => app.run().await?,
        Command::Tick => app.run_once().await?,
        Command::Create {
            token_id,
            to,
            delay_secs,
        } => {
            let order_hash = app.create_order(to, token_id, delay_secs).await?;
            println!("{order_hash}");
        }
        Command::Cancel { order_hash } => app.cancel_order(&order_hash).await?,
        Command::Status { order_hash } => app.order_status(&order_hash).await?,
        Command::List { maker, status } => app.list_orders(maker, status).await?,
    }

    Ok(())
}
