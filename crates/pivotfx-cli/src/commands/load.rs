use std::path::Path;

use pivotfx_core::{
    CryptoRatesPayload, DateKey, HistoricalQuotesPayload, IngestError, LiveQuotesPayload,
    SnapshotIngestor,
};
use tracing::info;

use crate::cli::Cli;
use crate::error::CliError;

/// Ingest every payload file named on the command line.
///
/// Returns warnings for the envelope.
pub async fn run(cli: &Cli, ingestor: &SnapshotIngestor) -> Result<Vec<String>, CliError> {
    let live_day = DateKey::parse_or_today(cli.live_date.as_deref())?;
    let mut loaded = 0usize;

    if let Some(path) = &cli.fiat_history {
        let payload = read(path, HistoricalQuotesPayload::from_json)?;
        let days = ingestor
            .ingest_historical_fiat(payload)
            .await
            .map_err(|source| ingest_error(path, source))?;
        info!(path = %path.display(), days, "loaded historical fiat payload");
        loaded += 1;
    }

    if let Some(path) = &cli.fiat_live {
        let payload = read(path, LiveQuotesPayload::from_json)?;
        ingestor
            .ingest_live_fiat(payload, live_day)
            .await
            .map_err(|source| ingest_error(path, source))?;
        loaded += 1;
    }

    if let Some(path) = &cli.crypto_live {
        let payload = read(path, CryptoRatesPayload::from_json)?;
        ingestor
            .ingest_crypto(payload, live_day)
            .await
            .map_err(|source| ingest_error(path, source))?;
        loaded += 1;
    }

    let mut warnings = Vec::new();
    if loaded == 0 {
        warnings.push(String::from(
            "no rate payloads were loaded; lookups will report rate_not_found",
        ));
    }
    Ok(warnings)
}

fn read<T>(
    path: &Path,
    decode: impl FnOnce(&[u8]) -> Result<T, IngestError>,
) -> Result<T, CliError> {
    let bytes = std::fs::read(path).map_err(|source| CliError::ReadPayload {
        path: path.to_path_buf(),
        source,
    })?;
    decode(&bytes).map_err(|source| ingest_error(path, source))
}

fn ingest_error(path: &Path, source: IngestError) -> CliError {
    CliError::Ingest {
        path: path.to_path_buf(),
        source,
    }
}
