use pivotfx_core::{DateKey, RateResolver, ServiceConfig, SnapshotIngestor, SnapshotStore};
use serde_json::{json, Value};

use super::CommandResult;

pub async fn run(
    resolver: &RateResolver,
    ingestor: &SnapshotIngestor,
    config: &ServiceConfig,
) -> CommandResult {
    let stores = resolver.stores();
    let universe = resolver.universe();
    let window = ingestor
        .lookback_window(DateKey::today())
        .map(|(from, to)| json!({ "from": from, "to": to }));

    CommandResult::ok(json!({
        "fiat": store_summary(&stores.fiat).await,
        "crypto": store_summary(&stores.crypto).await,
        "currencies": {
            "fiat": universe.fiat().collect::<Vec<_>>(),
            "crypto": universe.crypto().collect::<Vec<_>>(),
        },
        "config": {
            "live_ttl_secs": config.stores.live_ttl.as_secs(),
            "historical_ttl_secs": config.stores.historical_ttl.as_secs(),
            "sweep_interval_secs": config.stores.sweep_interval.as_secs(),
            "lookback_days": config.stores.lookback_days,
            "max_history_days": resolver.max_history_days(),
        },
        "lookback_window": window,
    }))
}

async fn store_summary(store: &SnapshotStore) -> Value {
    let stats = store.stats().await;
    json!({
        "label": store.label(),
        "default_ttl_secs": store.default_ttl().as_secs(),
        "total_entries": stats.total_entries,
        "live_entries": stats.live_entries,
        "expired_entries": stats.expired_entries,
    })
}
