mod convert;
mod history;
mod load;
mod rate;
mod stores;

use std::sync::Arc;

use pivotfx_core::{
    DateKey, RateResolver, RateStores, ResolveError, ServiceConfig, SnapshotIngestor,
    StoreSweepers,
};
use serde_json::Value;
use uuid::Uuid;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output::{Envelope, EnvelopeError, EnvelopeMeta};

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
        }
    }

    pub fn failed(error: &ResolveError) -> Self {
        Self {
            data: Value::Null,
            warnings: Vec::new(),
            errors: vec![EnvelopeError::from(error)],
        }
    }

    pub fn from_result<T>(
        result: Result<T, ResolveError>,
        to_data: impl FnOnce(T) -> Value,
    ) -> Self {
        match result {
            Ok(value) => Self::ok(to_data(value)),
            Err(error) => Self::failed(&error),
        }
    }
}

/// Day a dated command resolved against, for echoing back in output.
fn resolved_date(date: Option<&str>) -> Option<String> {
    DateKey::parse_or_today(date).ok().map(DateKey::format_key)
}

/// Stores, ingestor and resolver for one invocation, with sweepers running.
struct Services {
    config: ServiceConfig,
    ingestor: SnapshotIngestor,
    resolver: RateResolver,
    sweepers: StoreSweepers,
}

impl Services {
    fn start(config: ServiceConfig) -> Self {
        let universe = Arc::new(config.universe.clone());
        let stores = RateStores::new(&config.stores);
        let sweepers = stores.spawn_sweepers(&config.stores);

        let ingestor = SnapshotIngestor::new(stores.clone(), Arc::clone(&universe), config.stores);
        let resolver = RateResolver::new(stores, universe)
            .with_max_history_days(config.stores.max_history_days);

        Self {
            config,
            ingestor,
            resolver,
            sweepers,
        }
    }

    async fn stop(self) {
        self.sweepers.shutdown().await;
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    run_with_config(cli, ServiceConfig::from_env()?).await
}

async fn run_with_config(cli: &Cli, config: ServiceConfig) -> Result<Envelope, CliError> {
    let services = Services::start(config);
    let outcome = dispatch(cli, &services).await;
    services.stop().await;

    let CommandResult {
        data,
        warnings,
        errors,
    } = outcome?;

    Ok(Envelope {
        meta: EnvelopeMeta::new(Uuid::new_v4().to_string(), warnings),
        data,
        errors,
    })
}

async fn dispatch(cli: &Cli, services: &Services) -> Result<CommandResult, CliError> {
    let Services {
        config,
        ingestor,
        resolver,
        ..
    } = services;

    let mut warnings = load::run(cli, ingestor).await?;
    let mut result = match &cli.command {
        Command::Rate(args) => rate::run(args, resolver).await,
        Command::Convert(args) => convert::run(args, resolver).await,
        Command::History(args) => history::run(args, resolver).await,
        Command::Stores => stores::run(resolver, ingestor, config).await,
    };
    warnings.append(&mut result.warnings);
    result.warnings = warnings;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use clap::Parser;
    use pivotfx_core::{RateSnapshot, StoreConfig};
    use tempfile::NamedTempFile;

    use super::*;

    const LIVE_FIAT: &[u8] = br#"{"quotes":{"USDINR":83.0,"USDEUR":0.91}}"#;
    const LIVE_CRYPTO: &[u8] = br#"{"rates":{"BTC":30000.0,"ETH":1800.0}}"#;
    const HISTORY_FIAT: &[u8] =
        br#"{"quotes":{"2023-12-30":{"USDINR":82.8},"2023-12-31":{"USDINR":82.9}}}"#;

    fn payload(bytes: &[u8]) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("temp file");
        file.write_all(bytes).expect("write payload");
        file
    }

    fn path(file: &NamedTempFile) -> String {
        file.path().to_string_lossy().to_string()
    }

    async fn invoke(args: &[&str]) -> Envelope {
        let cli = Cli::try_parse_from(args.iter().copied()).expect("valid arguments");
        run_with_config(&cli, ServiceConfig::default())
            .await
            .expect("command runs")
    }

    // ========================================================================
    // Rate and convert
    // ========================================================================

    #[tokio::test]
    async fn rate_resolves_against_the_live_date() {
        // Given: a live fiat payload stored under 2024-01-01
        let fiat = payload(LIVE_FIAT);
        let fiat_path = path(&fiat);

        // When: the user asks for EUR to INR on that day
        let envelope = invoke(&[
            "pivotfx",
            "--fiat-live",
            fiat_path.as_str(),
            "--live-date",
            "2024-01-01",
            "rate",
            "eur",
            "INR",
            "--date",
            "2024-01-01",
        ])
        .await;

        // Then: the envelope carries the pivoted rate and no errors
        assert!(envelope.errors.is_empty());
        assert!(envelope.meta.warnings.is_empty());
        assert_eq!(envelope.exit_code(), 0);
        assert_eq!(envelope.data["base"], "EUR");
        assert_eq!(envelope.data["target"], "INR");
        assert_eq!(envelope.data["date"], "2024-01-01");
        let rate = envelope.data["rate"].as_f64().expect("numeric rate");
        assert!((rate - 83.0 / 0.91).abs() < 1e-9);
        assert!(!envelope.meta.request_id.is_empty());
    }

    #[tokio::test]
    async fn convert_crosses_fiat_and_crypto_payloads() {
        let fiat = payload(LIVE_FIAT);
        let crypto = payload(LIVE_CRYPTO);
        let (fiat_path, crypto_path) = (path(&fiat), path(&crypto));

        let envelope = invoke(&[
            "pivotfx",
            "--fiat-live",
            fiat_path.as_str(),
            "--crypto-live",
            crypto_path.as_str(),
            "--live-date",
            "2024-01-01",
            "convert",
            "0.5",
            "BTC",
            "INR",
            "--date",
            "2024-01-01",
        ])
        .await;

        assert!(envelope.errors.is_empty());
        assert_eq!(envelope.data["amount"], 0.5);
        let converted = envelope.data["converted_amount"]
            .as_f64()
            .expect("numeric amount");
        assert!((converted - 0.5 * 30000.0 * 83.0).abs() < 1e-6);
    }

    #[tokio::test]
    async fn missing_day_is_reported_in_the_envelope_with_exit_code_3() {
        // Given: live rates for 2024-01-01 only
        let fiat = payload(LIVE_FIAT);
        let fiat_path = path(&fiat);

        // When: asking for a day with no snapshot
        let envelope = invoke(&[
            "pivotfx",
            "--fiat-live",
            fiat_path.as_str(),
            "--live-date",
            "2024-01-01",
            "rate",
            "USD",
            "INR",
            "--date",
            "2099-01-01",
        ])
        .await;

        // Then: the failure is data, not a process error
        assert_eq!(envelope.data, Value::Null);
        assert_eq!(envelope.errors.len(), 1);
        assert_eq!(envelope.errors[0].code, "rate_not_found");
        assert!(envelope.errors[0].retryable);
        assert_eq!(envelope.exit_code(), 3);
    }

    #[tokio::test]
    async fn unknown_currency_and_missing_payloads_warn_and_fail() {
        let envelope = invoke(&["pivotfx", "rate", "USD", "XYZ"]).await;

        assert_eq!(envelope.errors[0].code, "invalid_currency");
        assert!(!envelope.errors[0].retryable);
        assert_eq!(envelope.meta.warnings.len(), 1);
        assert_eq!(envelope.exit_code(), 3);
    }

    // ========================================================================
    // History and diagnostics
    // ========================================================================

    #[tokio::test]
    async fn history_reads_the_historical_payload() {
        let history = payload(HISTORY_FIAT);
        let history_path = path(&history);

        let envelope = invoke(&[
            "pivotfx",
            "--fiat-history",
            history_path.as_str(),
            "history",
            "USD",
            "INR",
            "--from",
            "2023-12-30",
            "--to",
            "2023-12-31",
        ])
        .await;

        assert!(envelope.errors.is_empty());
        assert_eq!(envelope.data["rates"]["2023-12-30"], 82.8);
        assert_eq!(envelope.data["rates"]["2023-12-31"], 82.9);
        assert_eq!(envelope.data["from"], "2023-12-30");
    }

    #[tokio::test]
    async fn history_beyond_the_span_limit_is_an_envelope_error() {
        let envelope = invoke(&[
            "pivotfx", "history", "USD", "USD", "--from", "2000-01-01", "--to", "2024-01-01",
        ])
        .await;

        assert_eq!(envelope.errors[0].code, "invalid_date_range");
        assert_eq!(envelope.exit_code(), 3);
    }

    #[tokio::test]
    async fn stores_reports_counts_and_limits() {
        let fiat = payload(LIVE_FIAT);
        let fiat_path = path(&fiat);

        let envelope = invoke(&["pivotfx", "--fiat-live", fiat_path.as_str(), "stores"]).await;

        assert_eq!(envelope.data["fiat"]["label"], "fiat");
        assert_eq!(envelope.data["fiat"]["live_entries"], 1);
        assert_eq!(envelope.data["crypto"]["total_entries"], 0);
        assert_eq!(envelope.data["crypto"]["default_ttl_secs"], 24 * 60 * 60);
        assert_eq!(envelope.data["config"]["max_history_days"], 366);
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    #[tokio::test(start_paused = true)]
    async fn stopping_services_halts_the_sweepers() {
        // Given: running services with a one second sweep
        let config = ServiceConfig {
            stores: StoreConfig {
                sweep_interval: Duration::from_secs(1),
                ..StoreConfig::default()
            },
            ..ServiceConfig::default()
        };
        let services = Services::start(config);
        let fiat = services.resolver.stores().fiat.clone();

        // When: an expired entry exists while they run
        fiat.set("2024-01-01", RateSnapshot::default(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_secs(2)).await;

        // Then: it is swept
        assert!(fiat.is_empty().await);

        // When: services stop and another entry expires
        services.stop().await;
        fiat.set("2024-01-02", RateSnapshot::default(), Duration::from_millis(10))
            .await;
        tokio::time::sleep(Duration::from_secs(5)).await;

        // Then: nothing sweeps it any more
        assert_eq!(fiat.len().await, 1);
    }

    #[tokio::test]
    async fn unreadable_payload_is_a_process_error() {
        let cli = Cli::try_parse_from([
            "pivotfx",
            "--fiat-live",
            "/nonexistent/pivotfx/live.json",
            "stores",
        ])
        .expect("valid arguments");

        let err = run_with_config(&cli, ServiceConfig::default())
            .await
            .expect_err("must fail");

        assert!(matches!(err, CliError::ReadPayload { .. }));
        assert_eq!(err.exit_code(), 10);
    }
}
