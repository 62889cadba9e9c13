//! Provider payloads flowing through ingestion into resolution.

use pivotfx_core::{CryptoRatesPayload, HistoricalQuotesPayload, IngestError, LiveQuotesPayload};
use pivotfx_tests::*;

struct Harness {
    config: StoreConfig,
    ingestor: SnapshotIngestor,
    resolver: RateResolver,
}

fn harness(config: StoreConfig) -> Harness {
    let stores = RateStores::new(&config);
    let universe = Arc::new(CurrencyUniverse::default());
    Harness {
        config,
        ingestor: SnapshotIngestor::new(stores.clone(), Arc::clone(&universe), config),
        resolver: RateResolver::new(stores, universe),
    }
}

fn day(raw: &str) -> DateKey {
    DateKey::parse(raw).expect("valid date")
}

// ============================================================================
// Live fiat
// ============================================================================

#[tokio::test]
async fn live_quotes_become_resolvable_for_the_day() {
    // Given: a live quotes payload as the provider sends it
    let h = harness(StoreConfig::default());
    let payload =
        LiveQuotesPayload::from_json(br#"{"quotes":{"USDINR":83.0,"USDEUR":0.91}}"#)
            .expect("decodes");

    // When: it is ingested for 2024-01-01
    let pairs = h
        .ingestor
        .ingest_live_fiat(payload, day("2024-01-01"))
        .await
        .expect("ingested");

    // Then: every allowed non-USD fiat has a slot and the quotes resolve
    assert_eq!(pairs, 4);
    let rate = h
        .resolver
        .resolve("EUR", "INR", Some("2024-01-01"))
        .await
        .expect("rate");
    assert!((rate - 83.0 / 0.91).abs() < 1e-9);
}

#[tokio::test]
async fn missing_quotes_stay_as_invalid_placeholders() {
    // Given: a live payload that omits JPY
    let h = harness(StoreConfig::default());
    let payload = LiveQuotesPayload::from_json(br#"{"quotes":{"USDINR":83.0}}"#).expect("decodes");
    h.ingestor
        .ingest_live_fiat(payload, day("2024-01-01"))
        .await
        .expect("ingested");

    // When: resolving a pair that needs JPY
    let err = h
        .resolver
        .resolve("USD", "JPY", Some("2024-01-01"))
        .await
        .expect_err("must fail");

    // Then: the placeholder is reported as an invalid rate, not a missing one
    assert_eq!(err.code(), "invalid_rate");
}

#[tokio::test]
async fn lowercase_provider_pairs_still_resolve() {
    // Given: a provider that sends pair keys in lowercase
    let h = harness(StoreConfig::default());
    let payload = LiveQuotesPayload::from_json(br#"{"quotes":{"usdinr":83.0,"usdEUR":0.91}}"#)
        .expect("decodes");

    // When: ingested
    h.ingestor
        .ingest_live_fiat(payload, day("2024-01-01"))
        .await
        .expect("ingested");

    // Then: the quotes are found under their canonical pair codes
    let rate = h
        .resolver
        .resolve("EUR", "INR", Some("2024-01-01"))
        .await
        .expect("rate");
    assert!((rate - 83.0 / 0.91).abs() < 1e-9);
}

#[tokio::test(start_paused = true)]
async fn live_snapshot_expires_with_the_live_ttl() {
    // Given: a one minute live TTL
    let h = harness(StoreConfig {
        live_ttl: Duration::from_secs(60),
        ..StoreConfig::default()
    });
    let payload = LiveQuotesPayload::from_json(br#"{"quotes":{"USDINR":83.0}}"#).expect("decodes");
    h.ingestor
        .ingest_live_fiat(payload, day("2024-01-01"))
        .await
        .expect("ingested");

    // When: more than a minute passes
    tokio::time::advance(h.config.live_ttl + Duration::from_secs(1)).await;

    // Then: the rate is gone
    let err = h
        .resolver
        .resolve("USD", "INR", Some("2024-01-01"))
        .await
        .expect_err("must fail");
    assert!(err.retryable());
}

// ============================================================================
// Historical fiat
// ============================================================================

#[tokio::test]
async fn historical_payload_feeds_history() {
    // Given: three days of historical quotes
    let h = harness(StoreConfig::default());
    let payload = HistoricalQuotesPayload::from_json(
        br#"{"quotes":{
            "2024-01-01":{"USDINR":83.0},
            "2024-01-02":{"USDINR":83.2},
            "2024-01-03":{"USDINR":83.1}
        }}"#,
    )
    .expect("decodes");

    // When: ingested
    let days = h
        .ingestor
        .ingest_historical_fiat(payload)
        .await
        .expect("ingested");

    // Then: the whole range resolves in date order
    assert_eq!(days, 3);
    let history = h
        .resolver
        .history("USD", "INR", "2024-01-01", "2024-01-03")
        .await
        .expect("history");
    let values: Vec<f64> = history.values().copied().collect();
    assert_eq!(values, vec![83.0, 83.2, 83.1]);
}

#[tokio::test(start_paused = true)]
async fn historical_snapshots_outlive_live_ones() {
    // Given: live TTL of a minute and historical TTL of an hour
    let h = harness(StoreConfig {
        live_ttl: Duration::from_secs(60),
        historical_ttl: Duration::from_secs(3600),
        ..StoreConfig::default()
    });
    let history =
        HistoricalQuotesPayload::from_json(br#"{"quotes":{"2024-01-01":{"USDINR":83.0}}}"#)
            .expect("decodes");
    let live = LiveQuotesPayload::from_json(br#"{"quotes":{"USDINR":84.0}}"#).expect("decodes");
    h.ingestor
        .ingest_historical_fiat(history)
        .await
        .expect("historical");
    h.ingestor
        .ingest_live_fiat(live, day("2024-01-02"))
        .await
        .expect("live");

    // When: ten minutes pass
    tokio::time::advance(Duration::from_secs(600)).await;

    // Then: only the historical day is still cached
    let past = h.resolver.resolve("USD", "INR", Some("2024-01-01")).await;
    let today = h.resolver.resolve("USD", "INR", Some("2024-01-02")).await;
    assert_eq!(past, Ok(83.0));
    assert!(today.is_err());
}

#[tokio::test]
async fn malformed_historical_date_rejects_the_batch() {
    let h = harness(StoreConfig::default());
    let payload = HistoricalQuotesPayload::from_json(
        br#"{"quotes":{"2024-01-01":{"USDINR":83.0},"yesterday":{"USDINR":83.1}}}"#,
    )
    .expect("decodes");

    let err = h
        .ingestor
        .ingest_historical_fiat(payload)
        .await
        .expect_err("must fail");

    assert!(matches!(err, IngestError::Validation(_)));
    assert!(h.resolver.stores().fiat.is_empty().await);
}

// ============================================================================
// Crypto
// ============================================================================

#[tokio::test]
async fn crypto_prices_are_stored_as_usd_per_unit() {
    // Given: a crypto payload with one unlisted coin
    let h = harness(StoreConfig::default());
    let payload = CryptoRatesPayload::from_json(
        br#"{"rates":{"BTC":30000.0,"ETH":1800.0,"USDT":1.0,"DOGE":0.08}}"#,
    )
    .expect("decodes");

    // When: ingested
    let pairs = h
        .ingestor
        .ingest_crypto(payload, day("2024-01-01"))
        .await
        .expect("ingested");

    // Then: only allowed coins are stored and they cross correctly
    assert_eq!(pairs, 3);
    let snapshot = h
        .resolver
        .stores()
        .crypto
        .get("2024-01-01")
        .await
        .expect("snapshot");
    assert_eq!(snapshot.get("DOGEUSD"), None);

    let rate = h
        .resolver
        .resolve("BTC", "ETH", Some("2024-01-01"))
        .await
        .expect("rate");
    assert!((rate - 30000.0 / 1800.0).abs() < 1e-9);
}

#[tokio::test]
async fn fiat_and_crypto_ingest_together_for_cross_rates() {
    let h = harness(StoreConfig::default());
    let fiat = LiveQuotesPayload::from_json(br#"{"quotes":{"USDINR":83.0}}"#).expect("decodes");
    let crypto = CryptoRatesPayload::from_json(br#"{"rates":{"BTC":30000.0}}"#).expect("decodes");
    h.ingestor
        .ingest_live_fiat(fiat, day("2024-01-01"))
        .await
        .expect("fiat");
    h.ingestor
        .ingest_crypto(crypto, day("2024-01-01"))
        .await
        .expect("crypto");

    let btc_in_inr = h
        .resolver
        .convert(0.5, "BTC", "INR", Some("2024-01-01"))
        .await
        .expect("converted");

    assert!((btc_in_inr - 0.5 * 30000.0 * 83.0).abs() < 1e-6);
}

// ============================================================================
// Rejected payloads
// ============================================================================

#[tokio::test]
async fn empty_and_malformed_payloads_are_rejected() {
    let h = harness(StoreConfig::default());

    let empty = CryptoRatesPayload::from_json(br#"{"rates":{}}"#).expect("decodes");
    let err = h
        .ingestor
        .ingest_crypto(empty, day("2024-01-01"))
        .await
        .expect_err("must fail");
    assert!(matches!(err, IngestError::EmptyPayload { .. }));

    let err = LiveQuotesPayload::from_json(b"not json").expect_err("must fail");
    assert!(matches!(err, IngestError::Decode(_)));

    assert!(h.resolver.stores().crypto.is_empty().await);
}

#[test]
fn lookback_window_covers_the_configured_days() {
    let h = harness(StoreConfig {
        lookback_days: 7,
        ..StoreConfig::default()
    });

    let (from, to) = h
        .ingestor
        .lookback_window(day("2024-03-01"))
        .expect("window");

    assert_eq!(from.format_key(), "2024-02-23");
    assert_eq!(to.format_key(), "2024-02-29");
}
