//! GRUHA CLI - Main entry point

use clap::{Parser, Subcommand};
use gruha_rpc::{commands, AppContext};
use rust_decimal::Decimal;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "gruha")]
#[command(about = "GRUHA - Disaster relief token wallet", long_about = None)]
struct Cli {
    /// Data directory path
    #[arg(short, long, default_value = "./data")]
    data: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Allocate tokens to an MSME (authority operation)
    Allocate {
        /// Receiving MSME ID
        msme: String,
        /// Disaster event ID
        disaster: String,
        /// Token type code (0 = RESILIENCE_CREDIT, 1 = RELIEF_TOKEN)
        #[arg(long, default_value = "1")]
        token: u8,
        /// Amount to allocate
        amount: Decimal,
        /// Days until expiry (1..=365)
        #[arg(long, default_value = "90")]
        validity: i64,
        /// Permitted category codes, comma separated (0..=6)
        #[arg(long, value_delimiter = ',', required = true)]
        categories: Vec<u8>,
        /// Allocating authority ID
        #[arg(long, default_value = "authority")]
        by: String,
    },

    /// Spend tokens from an MSME wallet to a vendor
    Spend {
        /// Spending MSME ID
        msme: String,
        /// Receiving vendor ID
        vendor: String,
        /// Amount to spend
        amount: Decimal,
        /// Token type code (0 = RESILIENCE_CREDIT, 1 = RELIEF_TOKEN)
        #[arg(long, default_value = "1")]
        token: u8,
        /// Spending category code (0..=6)
        #[arg(long)]
        category: u8,
        /// Optional booking correlation ID
        #[arg(long)]
        booking: Option<String>,
    },

    /// Show an MSME's balance and active allocations
    Balance {
        /// MSME ID
        msme: String,
    },

    /// List an MSME's recent transactions
    Transactions {
        /// MSME ID
        msme: String,
        /// Maximum number of transactions to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// List transactions awaiting authority review
    Flagged,

    /// Approve a flagged transaction (debits the wallet)
    Approve {
        /// Transaction ID (TXN-XXXXXXXX)
        txn: String,
    },

    /// Reject a flagged transaction (no debit)
    Reject {
        /// Transaction ID (TXN-XXXXXXXX)
        txn: String,
    },

    /// Summarize allocations for a disaster
    Disaster {
        /// Disaster event ID
        disaster: String,
    },

    /// Bind an external chain address to an MSME wallet
    BindAddress {
        /// MSME ID
        msme: String,
        /// Chain address
        address: String,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let ctx = AppContext::new(&cli.data)?;

    match cli.command {
        Commands::Allocate {
            msme,
            disaster,
            token,
            amount,
            validity,
            categories,
            by,
        } => {
            commands::allocate(
                &ctx, &msme, &disaster, token, amount, validity, &categories, &by,
            )?;
        }

        Commands::Spend {
            msme,
            vendor,
            amount,
            token,
            category,
            booking,
        } => {
            commands::spend(&ctx, &msme, &vendor, token, category, amount, booking)?;
        }

        Commands::Balance { msme } => {
            commands::balance(&ctx, &msme)?;
        }

        Commands::Transactions { msme, limit } => {
            commands::transactions(&ctx, &msme, limit)?;
        }

        Commands::Flagged => {
            commands::flagged(&ctx)?;
        }

        Commands::Approve { txn } => {
            commands::approve(&ctx, &txn)?;
        }

        Commands::Reject { txn } => {
            commands::reject(&ctx, &txn)?;
        }

        Commands::Disaster { disaster } => {
            commands::disaster(&ctx, &disaster)?;
        }

        Commands::BindAddress { msme, address } => {
            commands::bind_address(&ctx, &msme, &address)?;
        }
    }

    Ok(())
}
