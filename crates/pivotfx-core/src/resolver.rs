//! Cross-rate resolution through the USD pivot.
//!
//! Fiat snapshots store `USD{X}` (units of X per USD) and crypto snapshots
//! store `{X}USD` (USD per unit of X). A rate from `base` to `target` is the
//! number of `target` units one `base` unit buys:
//!
//! | base   | target | rate |
//! |--------|--------|------|
//! | fiat   | fiat   | `fiat[USD{target}] / fiat[USD{base}]` |
//! | crypto | crypto | `crypto[{base}USD] / crypto[{target}USD]` |
//! | fiat   | crypto | `1 / (fiat[USD{base}] * crypto[{target}USD])` |
//! | crypto | fiat   | `crypto[{base}USD] * fiat[USD{target}]` |
//!
//! `fiat[USDUSD]` is taken as `1` and never read from a snapshot.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

use tracing::debug;

use crate::stores::RateStores;
use crate::{
    is_usable_rate, pair_code, AssetClass, CurrencyCode, CurrencyUniverse, DateKey, RateSnapshot,
    ResolveError, DEFAULT_MAX_HISTORY_DAYS,
};

#[derive(Debug, Clone)]
struct Leg {
    code: CurrencyCode,
    class: AssetClass,
}

/// Stateless rate resolver over the fiat and crypto snapshot stores.
#[derive(Debug, Clone)]
pub struct RateResolver {
    stores: RateStores,
    universe: Arc<CurrencyUniverse>,
    max_history_days: u32,
}

impl RateResolver {
    pub fn new(stores: RateStores, universe: Arc<CurrencyUniverse>) -> Self {
        Self {
            stores,
            universe,
            max_history_days: DEFAULT_MAX_HISTORY_DAYS,
        }
    }

    /// Cap the number of days a single [`history`](Self::history) call may span.
    pub fn with_max_history_days(mut self, days: u32) -> Self {
        self.max_history_days = days;
        self
    }

    pub fn max_history_days(&self) -> u32 {
        self.max_history_days
    }

    pub fn stores(&self) -> &RateStores {
        &self.stores
    }

    pub fn universe(&self) -> &CurrencyUniverse {
        &self.universe
    }

    /// Rate converting one unit of `base` into `target` on `date`.
    ///
    /// `date` defaults to the current UTC day. Requests where both codes are
    /// the same return `1.0` without reading any snapshot.
    pub async fn resolve(
        &self,
        base: &str,
        target: &str,
        date: Option<&str>,
    ) -> Result<f64, ResolveError> {
        let started = Instant::now();
        let (base, target) = self.validate_pair(base, target)?;
        let date = DateKey::parse_or_today(date).map_err(ResolveError::InvalidDateRange)?;

        let result = self.resolve_validated(&base, &target, date).await;
        log_outcome("resolve", &base, &target, date, &result, started);
        result
    }

    /// `amount` of `base` expressed in `target` on `date`.
    pub async fn convert(
        &self,
        amount: f64,
        base: &str,
        target: &str,
        date: Option<&str>,
    ) -> Result<f64, ResolveError> {
        if !amount.is_finite() {
            return Err(ResolveError::InvalidAmount { amount });
        }
        let rate = self.resolve(base, target, date).await?;
        Ok(amount * rate)
    }

    /// One rate per day in `[from, to]`; fails as a whole if any day fails.
    ///
    /// Ranges longer than the configured maximum are rejected up front, same
    /// currency pairs included.
    pub async fn history(
        &self,
        base: &str,
        target: &str,
        from: &str,
        to: &str,
    ) -> Result<BTreeMap<String, f64>, ResolveError> {
        let started = Instant::now();
        let (base, target) = self.validate_pair(base, target)?;
        let from = DateKey::parse(from).map_err(ResolveError::InvalidDateRange)?;
        let to = DateKey::parse(to).map_err(ResolveError::InvalidDateRange)?;
        let days = DateKey::range_inclusive(from, to, self.max_history_days)
            .map_err(ResolveError::InvalidDateRange)?;

        let mut rates = BTreeMap::new();
        for day in days {
            let result = self.resolve_validated(&base, &target, day).await;
            if result.is_err() {
                log_outcome("history", &base, &target, day, &result, started);
            }
            rates.insert(day.format_key(), result?);
        }

        debug!(
            base = %base.code,
            target = %target.code,
            %from,
            %to,
            days = rates.len(),
            took_us = started.elapsed().as_micros() as u64,
            "history resolved"
        );
        Ok(rates)
    }

    fn validate_pair(&self, base: &str, target: &str) -> Result<(Leg, Leg), ResolveError> {
        let base_leg = self.classify(base);
        let target_leg = self.classify(target);

        match (base_leg, target_leg) {
            (Some(base), Some(target)) => Ok((base, target)),
            (base_leg, target_leg) => {
                let mut codes = Vec::new();
                if base_leg.is_none() {
                    codes.push(base.trim().to_string());
                }
                if target_leg.is_none() {
                    codes.push(target.trim().to_string());
                }
                Err(ResolveError::InvalidCurrency { codes })
            }
        }
    }

    fn classify(&self, input: &str) -> Option<Leg> {
        self.universe
            .classify(input)
            .ok()
            .map(|(code, class)| Leg { code, class })
    }

    async fn resolve_validated(
        &self,
        base: &Leg,
        target: &Leg,
        date: DateKey,
    ) -> Result<f64, ResolveError> {
        if base.code == target.code {
            return Ok(1.0);
        }

        let rates = self.load_day(base, target, date).await;
        match (base.class, target.class) {
            (AssetClass::Fiat, AssetClass::Fiat) => {
                let target_per_usd = rates.fiat_per_usd(target)?;
                let base_per_usd = rates.fiat_per_usd(base)?;
                Ok(target_per_usd / base_per_usd)
            }
            (AssetClass::Crypto, AssetClass::Crypto) => {
                let base_usd = rates.usd_per_crypto(base)?;
                let target_usd = rates.usd_per_crypto(target)?;
                Ok(base_usd / target_usd)
            }
            (AssetClass::Fiat, AssetClass::Crypto) => {
                let base_per_usd = rates.fiat_per_usd(base)?;
                let target_usd = rates.usd_per_crypto(target)?;
                Ok(1.0 / (base_per_usd * target_usd))
            }
            (AssetClass::Crypto, AssetClass::Fiat) => {
                let base_usd = rates.usd_per_crypto(base)?;
                let target_per_usd = rates.fiat_per_usd(target)?;
                Ok(base_usd * target_per_usd)
            }
        }
    }

    /// Read each snapshot the pair needs exactly once.
    async fn load_day<'a>(&self, base: &'a Leg, target: &'a Leg, date: DateKey) -> DayRates<'a> {
        let needs = |class: AssetClass| {
            [base, target]
                .iter()
                .any(|leg| leg.class == class && !leg.code.is_pivot())
        };
        let key = date.format_key();

        let fiat = if needs(AssetClass::Fiat) {
            self.stores.fiat.get(&key).await
        } else {
            None
        };
        let crypto = if needs(AssetClass::Crypto) {
            self.stores.crypto.get(&key).await
        } else {
            None
        };

        DayRates {
            base,
            target,
            date,
            fiat,
            crypto,
        }
    }
}

/// Snapshots for one day, scoped to a single base/target request.
struct DayRates<'a> {
    base: &'a Leg,
    target: &'a Leg,
    date: DateKey,
    fiat: Option<RateSnapshot>,
    crypto: Option<RateSnapshot>,
}

impl DayRates<'_> {
    /// Units of a fiat currency per USD.
    fn fiat_per_usd(&self, leg: &Leg) -> Result<f64, ResolveError> {
        if leg.code.is_pivot() {
            return Ok(1.0);
        }
        self.lookup(self.fiat.as_ref(), leg)
    }

    /// USD per unit of a crypto currency.
    fn usd_per_crypto(&self, leg: &Leg) -> Result<f64, ResolveError> {
        self.lookup(self.crypto.as_ref(), leg)
    }

    fn lookup(&self, snapshot: Option<&RateSnapshot>, leg: &Leg) -> Result<f64, ResolveError> {
        let pair = pair_code(leg.class, &leg.code);
        let rate = snapshot
            .and_then(|snapshot| snapshot.get(&pair))
            .ok_or_else(|| self.not_found())?;

        if !is_usable_rate(rate) {
            return Err(ResolveError::InvalidRate {
                pair,
                date: self.date.format_key(),
            });
        }
        Ok(rate)
    }

    fn not_found(&self) -> ResolveError {
        ResolveError::RateNotFound {
            base: self.base.code.to_string(),
            target: self.target.code.to_string(),
            date: self.date.format_key(),
        }
    }
}

fn log_outcome(
    method: &'static str,
    base: &Leg,
    target: &Leg,
    date: DateKey,
    result: &Result<f64, ResolveError>,
    started: Instant,
) {
    let took_us = started.elapsed().as_micros() as u64;
    match result {
        Ok(rate) => debug!(
            method,
            base = %base.code,
            target = %target.code,
            %date,
            rate,
            took_us,
            "rate resolved"
        ),
        Err(error) => debug!(
            method,
            base = %base.code,
            target = %target.code,
            %date,
            code = error.code(),
            %error,
            took_us,
            "rate resolution failed"
        ),
    }
}
