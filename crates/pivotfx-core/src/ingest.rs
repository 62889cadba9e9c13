//! Turning already-fetched provider payloads into stored snapshots.
//!
//! The HTTP fetch and its schedule live outside this crate. Callers hand the
//! decoded payloads to [`SnapshotIngestor`], which normalizes them into
//! [`RateSnapshot`]s keyed by day and writes them with the configured TTLs.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, warn};

use crate::stores::RateStores;
use crate::{
    pair_code, AssetClass, CurrencyUniverse, DateKey, IngestError, RateSnapshot, StoreConfig,
};

/// Live fiat quotes: `{"quotes": {"USDINR": 83.0, ...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LiveQuotesPayload {
    pub quotes: HashMap<String, f64>,
}

/// Historical fiat quotes keyed by day: `{"quotes": {"2024-01-01": {...}}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct HistoricalQuotesPayload {
    pub quotes: BTreeMap<String, HashMap<String, f64>>,
}

/// Live crypto prices in USD per unit: `{"rates": {"BTC": 30000.0, ...}}`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct CryptoRatesPayload {
    pub rates: HashMap<String, f64>,
}

macro_rules! from_json {
    ($ty:ty) => {
        impl $ty {
            pub fn from_json(bytes: &[u8]) -> Result<Self, IngestError> {
                Ok(serde_json::from_slice(bytes)?)
            }
        }
    };
}

from_json!(LiveQuotesPayload);
from_json!(HistoricalQuotesPayload);
from_json!(CryptoRatesPayload);

/// Writes provider payloads into the fiat and crypto stores.
#[derive(Debug, Clone)]
pub struct SnapshotIngestor {
    stores: RateStores,
    universe: Arc<CurrencyUniverse>,
    config: StoreConfig,
}

impl SnapshotIngestor {
    pub fn new(stores: RateStores, universe: Arc<CurrencyUniverse>, config: StoreConfig) -> Self {
        Self {
            stores,
            universe,
            config,
        }
    }

    /// Days a historical fetch should cover: `[today - lookback, today - 1]`.
    pub fn lookback_window(&self, today: DateKey) -> Option<(DateKey, DateKey)> {
        if self.config.lookback_days == 0 {
            return None;
        }
        let from = today.days_before(self.config.lookback_days)?;
        let to = today.days_before(1)?;
        Some((from, to))
    }

    /// Fiat snapshot with a zero placeholder for every allowed non-USD code,
    /// overlaid with the provider's quotes. Pair keys are trimmed and
    /// upper-cased to match [`pair_code`].
    pub fn fiat_snapshot(&self, quotes: HashMap<String, f64>) -> RateSnapshot {
        let mut rates: HashMap<String, f64> = self
            .universe
            .fiat()
            .filter(|code| !code.is_pivot())
            .map(|code| (pair_code(AssetClass::Fiat, code), 0.0))
            .collect();
        rates.extend(
            quotes
                .into_iter()
                .map(|(pair, rate)| (pair.trim().to_ascii_uppercase(), rate)),
        );
        RateSnapshot::new(rates)
    }

    /// Crypto snapshot keyed `{X}USD`, restricted to allowed crypto codes.
    pub fn crypto_snapshot(&self, prices: HashMap<String, f64>) -> RateSnapshot {
        let mut rates: HashMap<String, f64> = self
            .universe
            .crypto()
            .map(|code| (pair_code(AssetClass::Crypto, code), 0.0))
            .collect();

        for (raw, price) in prices {
            match self.universe.classify(&raw) {
                Ok((code, AssetClass::Crypto)) => {
                    rates.insert(pair_code(AssetClass::Crypto, &code), price);
                }
                _ => warn!(code = %raw, "ignoring price for non-crypto or unlisted code"),
            }
        }
        RateSnapshot::new(rates)
    }

    /// Store today's live fiat quotes under `day` with the live TTL.
    pub async fn ingest_live_fiat(
        &self,
        payload: LiveQuotesPayload,
        day: DateKey,
    ) -> Result<usize, IngestError> {
        if payload.quotes.is_empty() {
            return Err(IngestError::EmptyPayload {
                payload: "live fiat",
            });
        }

        let snapshot = self.fiat_snapshot(payload.quotes);
        let pairs = snapshot.len();
        self.stores
            .fiat
            .set(day.format_key(), snapshot, self.config.live_ttl)
            .await;
        info!(%day, pairs, "live fiat rates cached");
        Ok(pairs)
    }

    /// Store one snapshot per historical day with the historical TTL.
    ///
    /// Every date is validated before anything is written.
    pub async fn ingest_historical_fiat(
        &self,
        payload: HistoricalQuotesPayload,
    ) -> Result<usize, IngestError> {
        if payload.quotes.is_empty() {
            return Err(IngestError::EmptyPayload {
                payload: "historical fiat",
            });
        }

        let days = payload
            .quotes
            .into_iter()
            .map(|(date, quotes)| -> Result<_, IngestError> {
                Ok((DateKey::parse(&date)?, quotes))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let count = days.len();
        for (day, quotes) in days {
            let snapshot = self.fiat_snapshot(quotes);
            self.stores
                .fiat
                .set(day.format_key(), snapshot, self.config.historical_ttl)
                .await;
        }
        info!(days = count, "historical fiat rates cached");
        Ok(count)
    }

    /// Store today's crypto prices under `day` with the live TTL.
    pub async fn ingest_crypto(
        &self,
        payload: CryptoRatesPayload,
        day: DateKey,
    ) -> Result<usize, IngestError> {
        if payload.rates.is_empty() {
            return Err(IngestError::EmptyPayload { payload: "crypto" });
        }

        let snapshot = self.crypto_snapshot(payload.rates);
        let pairs = snapshot.len();
        self.stores
            .crypto
            .set(day.format_key(), snapshot, self.config.live_ttl)
            .await;
        info!(%day, pairs, "crypto rates cached");
        Ok(pairs)
    }
}
