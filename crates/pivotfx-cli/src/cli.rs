//! CLI argument definitions for pivotfx.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `rate` | Rate from one currency to another on a day |
//! | `convert` | Convert an amount on a day |
//! | `history` | Daily rates over an inclusive date range |
//! | `stores` | Snapshot store diagnostics |
//!
//! # Examples
//!
//! ```bash
//! pivotfx --fiat-live live.json rate USD INR
//! pivotfx --fiat-history history.json history EUR INR --from 2024-01-01 --to 2024-01-07
//! pivotfx --fiat-live live.json --crypto-live crypto.json convert 250 INR BTC --pretty
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Point-in-time fiat and crypto exchange rates from USD-pivot snapshots.
#[derive(Debug, Parser)]
#[command(name = "pivotfx", author, version, about = "USD-pivot exchange rate lookups")]
pub struct Cli {
    /// Live fiat payload (`{"quotes": {"USDINR": 83.0}}`), stored as today.
    #[arg(long, global = true, env = "PIVOTFX_FIAT_LIVE")]
    pub fiat_live: Option<PathBuf>,

    /// Historical fiat payload (`{"quotes": {"2024-01-01": {...}}}`).
    #[arg(long, global = true, env = "PIVOTFX_FIAT_HISTORY")]
    pub fiat_history: Option<PathBuf>,

    /// Live crypto payload in USD per unit (`{"rates": {"BTC": 30000.0}}`).
    #[arg(long, global = true, env = "PIVOTFX_CRYPTO_LIVE")]
    pub crypto_live: Option<PathBuf>,

    /// Day to store live payloads under instead of today (YYYY-MM-DD).
    #[arg(long, global = true)]
    pub live_date: Option<String>,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Emit logs to stderr as JSON lines.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Rate converting one unit of BASE into TARGET.
    Rate(RateArgs),
    /// Convert AMOUNT of BASE into TARGET.
    Convert(ConvertArgs),
    /// One rate per day over an inclusive range.
    History(HistoryArgs),
    /// Entry counts and configuration of the snapshot stores.
    Stores,
}

#[derive(Debug, Args)]
pub struct RateArgs {
    pub base: String,
    pub target: String,
    /// Day to resolve (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    #[arg(allow_negative_numbers = true)]
    pub amount: f64,
    pub base: String,
    pub target: String,
    /// Day to resolve (YYYY-MM-DD); defaults to today.
    #[arg(long)]
    pub date: Option<String>,
}

#[derive(Debug, Args)]
pub struct HistoryArgs {
    pub base: String,
    pub target: String,
    #[arg(long)]
    pub from: String,
    #[arg(long)]
    pub to: String,
}
