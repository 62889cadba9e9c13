//! The pair of snapshot stores the resolver reads from.

use crate::cache::{SweeperHandle, TtlStore};
use crate::{RateSnapshot, StoreConfig};

/// TTL store holding one [`RateSnapshot`] per `YYYY-MM-DD` key.
pub type SnapshotStore = TtlStore<RateSnapshot>;

/// Fiat and crypto snapshot stores. They never share a lock.
#[derive(Debug, Clone)]
pub struct RateStores {
    pub fiat: SnapshotStore,
    pub crypto: SnapshotStore,
}

impl RateStores {
    pub fn new(config: &StoreConfig) -> Self {
        Self {
            fiat: SnapshotStore::new("fiat", config.live_ttl),
            crypto: SnapshotStore::new("crypto", config.live_ttl),
        }
    }

    /// Start one sweeper per store on the configured tick.
    pub fn spawn_sweepers(&self, config: &StoreConfig) -> StoreSweepers {
        StoreSweepers {
            fiat: self.fiat.spawn_sweeper(config.sweep_interval),
            crypto: self.crypto.spawn_sweeper(config.sweep_interval),
        }
    }
}

/// Running sweepers for both stores.
#[derive(Debug)]
pub struct StoreSweepers {
    fiat: SweeperHandle,
    crypto: SweeperHandle,
}

impl StoreSweepers {
    /// Stop both sweepers and wait for them to exit.
    pub async fn shutdown(self) {
        let Self { fiat, crypto } = self;
        tokio::join!(fiat.shutdown(), crypto.shutdown());
    }
}
