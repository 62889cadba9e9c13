//! # Pivotfx Core
//!
//! Point-in-time fiat and crypto exchange rates served from per-day
//! snapshots quoted against USD.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`cache`] | Generic TTL store with lazy expiry and a background sweeper |
//! | [`config`] | TTLs, sweep cadence and allow-lists from the environment |
//! | [`domain`] | Currency codes, allow-lists, date keys, rate snapshots |
//! | [`error`] | Validation, resolution, ingestion and config errors |
//! | [`ingest`] | Provider payloads to stored snapshots |
//! | [`resolver`] | Cross-rate resolution through the USD pivot |
//! | [`stores`] | The fiat/crypto snapshot store pair |
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! use pivotfx_core::{CurrencyUniverse, RateResolver, RateSnapshot, RateStores, StoreConfig};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), pivotfx_core::ResolveError> {
//! let stores = RateStores::new(&StoreConfig::default());
//! let snapshot: RateSnapshot = [("USDINR".to_string(), 83.0)].into_iter().collect();
//! stores.fiat.set("2024-01-01", snapshot, Duration::from_secs(60)).await;
//!
//! let resolver = RateResolver::new(stores, Arc::new(CurrencyUniverse::default()));
//! let rate = resolver.resolve("USD", "INR", Some("2024-01-01")).await?;
//! assert_eq!(rate, 83.0);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use pivotfx_core::ResolveError;
//!
//! fn describe(error: &ResolveError) -> &'static str {
//!     if error.retryable() {
//!         "no data yet, try after the next fetch"
//!     } else {
//!         "request or data is invalid"
//!     }
//! }
//! ```

pub mod cache;
pub mod config;
pub mod domain;
pub mod error;
pub mod ingest;
pub mod resolver;
pub mod stores;

// Caching
pub use cache::{StoreStats, SweeperHandle, TtlStore};

// Configuration
pub use config::{ServiceConfig, StoreConfig, DEFAULT_MAX_HISTORY_DAYS};

// Domain models
pub use domain::{
    is_usable_rate, pair_code, AssetClass, CurrencyCode, CurrencyUniverse, DateKey, RateSnapshot,
    PIVOT,
};

// Error types
pub use error::{ConfigError, IngestError, ResolveError, ValidationError};

// Ingestion
pub use ingest::{CryptoRatesPayload, HistoricalQuotesPayload, LiveQuotesPayload, SnapshotIngestor};

// Resolution
pub use resolver::RateResolver;
pub use stores::{RateStores, SnapshotStore, StoreSweepers};
