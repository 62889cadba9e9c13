use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::currency::{AssetClass, CurrencyCode, PIVOT};

/// Pair code under which `code`'s USD rate is stored for `class`.
///
/// Fiat rates are stored as `USD{code}` (units of `code` per USD), crypto
/// rates as `{code}USD` (USD per unit of `code`).
pub fn pair_code(class: AssetClass, code: &CurrencyCode) -> String {
    match class {
        AssetClass::Fiat => format!("{PIVOT}{code}"),
        AssetClass::Crypto => format!("{code}{PIVOT}"),
    }
}

/// One day's pair rates for a single asset class.
///
/// Snapshots are never mutated once stored; clones share the same map.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateSnapshot(Arc<HashMap<String, f64>>);

impl RateSnapshot {
    pub fn new(rates: HashMap<String, f64>) -> Self {
        Self(Arc::new(rates))
    }

    /// Raw stored value for `pair`, including zero placeholders.
    pub fn get(&self, pair: &str) -> Option<f64> {
        self.0.get(pair).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, f64)> for RateSnapshot {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Zero, negative and non-finite values are placeholders, never rates.
pub fn is_usable_rate(rate: f64) -> bool {
    rate.is_finite() && rate > 0.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_orientation_follows_asset_class() {
        let inr = CurrencyCode::parse("INR").expect("valid");
        let btc = CurrencyCode::parse("BTC").expect("valid");
        assert_eq!(pair_code(AssetClass::Fiat, &inr), "USDINR");
        assert_eq!(pair_code(AssetClass::Crypto, &btc), "BTCUSD");
    }

    #[test]
    fn placeholders_are_not_usable() {
        let snapshot: RateSnapshot = [
            ("USDINR".to_string(), 83.0),
            ("USDJPY".to_string(), 0.0),
            ("USDGBP".to_string(), f64::NAN),
        ]
        .into_iter()
        .collect();

        let usable = |pair: &str| snapshot.get(pair).filter(|rate| is_usable_rate(*rate));
        assert_eq!(usable("USDINR"), Some(83.0));
        assert_eq!(snapshot.get("USDJPY"), Some(0.0));
        assert_eq!(usable("USDJPY"), None);
        assert_eq!(usable("USDGBP"), None);
        assert!(!is_usable_rate(-1.0));
        assert_eq!(snapshot.get("USDEUR"), None);
    }

    #[test]
    fn deserializes_from_plain_map() {
        let snapshot: RateSnapshot =
            serde_json::from_str(r#"{"BTCUSD": 30000.0}"#).expect("valid json");
        assert_eq!(snapshot.get("BTCUSD"), Some(30000.0));
        assert_eq!(snapshot.len(), 1);
    }
}
