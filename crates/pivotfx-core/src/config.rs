//! Store and currency configuration, read from the environment.

use std::env;
use std::time::Duration;

use crate::{ConfigError, CurrencyUniverse};

pub const ENV_LIVE_TTL_SECS: &str = "PIVOTFX_LIVE_TTL_SECS";
pub const ENV_HISTORICAL_TTL_SECS: &str = "PIVOTFX_HISTORICAL_TTL_SECS";
pub const ENV_SWEEP_INTERVAL_SECS: &str = "PIVOTFX_SWEEP_INTERVAL_SECS";
pub const ENV_LOOKBACK_DAYS: &str = "PIVOTFX_LOOKBACK_DAYS";
pub const ENV_MAX_HISTORY_DAYS: &str = "PIVOTFX_MAX_HISTORY_DAYS";
pub const ENV_FIAT_CURRENCIES: &str = "PIVOTFX_FIAT_CURRENCIES";
pub const ENV_CRYPTO_CURRENCIES: &str = "PIVOTFX_CRYPTO_CURRENCIES";

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

/// Longest range a single history request may cover.
pub const DEFAULT_MAX_HISTORY_DAYS: u32 = 366;

/// TTL and eviction cadence for the snapshot stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StoreConfig {
    /// TTL for the current day's snapshot, rewritten on every live refresh.
    pub live_ttl: Duration,
    /// TTL for past days' snapshots.
    pub historical_ttl: Duration,
    /// Tick of the background sweep.
    pub sweep_interval: Duration,
    /// How many past days the historical fetch should cover.
    pub lookback_days: u32,
    /// Upper bound on the days one history request may span.
    pub max_history_days: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            live_ttl: DAY,
            historical_ttl: DAY * 90,
            sweep_interval: Duration::from_secs(10 * 60),
            lookback_days: 90,
            max_history_days: DEFAULT_MAX_HISTORY_DAYS,
        }
    }
}

impl StoreConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; absent values keep defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let live_ttl = read_secs(&lookup, ENV_LIVE_TTL_SECS)?.unwrap_or(defaults.live_ttl);
        let historical_ttl =
            read_secs(&lookup, ENV_HISTORICAL_TTL_SECS)?.unwrap_or(defaults.historical_ttl);
        let sweep_interval =
            read_secs(&lookup, ENV_SWEEP_INTERVAL_SECS)?.unwrap_or(defaults.sweep_interval);
        let lookback_days =
            read_number::<u32, _>(&lookup, ENV_LOOKBACK_DAYS)?.unwrap_or(defaults.lookback_days);
        let max_history_days = read_number::<u32, _>(&lookup, ENV_MAX_HISTORY_DAYS)?
            .unwrap_or(defaults.max_history_days);

        if sweep_interval.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: ENV_SWEEP_INTERVAL_SECS,
                value: "0".to_string(),
            });
        }
        if max_history_days == 0 {
            return Err(ConfigError::InvalidValue {
                name: ENV_MAX_HISTORY_DAYS,
                value: "0".to_string(),
            });
        }

        Ok(Self {
            live_ttl,
            historical_ttl,
            sweep_interval,
            lookback_days,
            max_history_days,
        })
    }
}

/// Everything the core needs at construction.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ServiceConfig {
    pub stores: StoreConfig,
    pub universe: CurrencyUniverse,
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let stores = StoreConfig::from_lookup(&lookup)?;

        let fiat = read_list(&lookup, ENV_FIAT_CURRENCIES);
        let crypto = read_list(&lookup, ENV_CRYPTO_CURRENCIES);
        let universe = match (fiat, crypto) {
            (None, None) => CurrencyUniverse::default(),
            (fiat, crypto) => {
                let defaults = CurrencyUniverse::default();
                let fiat = fiat.unwrap_or_else(|| codes(defaults.fiat()));
                let crypto = crypto.unwrap_or_else(|| codes(defaults.crypto()));
                CurrencyUniverse::new(fiat, crypto)?
            }
        };

        Ok(Self { stores, universe })
    }
}

fn codes<'a>(iter: impl Iterator<Item = &'a crate::CurrencyCode>) -> Vec<String> {
    iter.map(ToString::to_string).collect()
}

fn read_secs<F>(lookup: &F, name: &'static str) -> Result<Option<Duration>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    Ok(read_number::<u64, _>(lookup, name)?.map(Duration::from_secs))
}

fn read_number<T, F>(lookup: &F, name: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(name) else {
        return Ok(None);
    };
    raw.trim()
        .parse()
        .map(Some)
        .map_err(|_| ConfigError::InvalidValue { name, value: raw })
}

fn read_list<F>(lookup: &F, name: &str) -> Option<Vec<String>>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name).map(|raw| {
        raw.split(',')
            .map(str::trim)
            .filter(|code| !code.is_empty())
            .map(str::to_string)
            .collect()
    })
}
