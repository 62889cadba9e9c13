//! # Domain Models
//!
//! Currency, date and snapshot types shared by the store and the resolver.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`CurrencyCode`] | Normalized uppercase currency code |
//! | [`CurrencyUniverse`] | Injected fiat and crypto allow-lists |
//! | [`AssetClass`] | Fiat or crypto |
//! | [`DateKey`] | `YYYY-MM-DD` snapshot key |
//! | [`RateSnapshot`] | One day's pair rates for one asset class |
//!
//! ## Pair orientation
//!
//! Fiat snapshots hold `USD{X}` (units of X per USD). Crypto snapshots hold
//! `{X}USD` (USD per unit of X). See [`pair_code`].

mod currency;
mod date;
mod snapshot;

pub use currency::{AssetClass, CurrencyCode, CurrencyUniverse, PIVOT};
pub use date::DateKey;
pub use snapshot::{is_usable_rate, pair_code, RateSnapshot};
