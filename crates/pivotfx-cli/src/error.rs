use std::path::PathBuf;

use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] pivotfx_core::ValidationError),

    #[error(transparent)]
    Config(#[from] pivotfx_core::ConfigError),

    #[error("failed to load {}: {source}", .path.display())]
    Ingest {
        path: PathBuf,
        #[source]
        source: pivotfx_core::IngestError,
    },

    #[error("failed to read {}: {source}", .path.display())]
    ReadPayload {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) | Self::Config(_) => 2,
            Self::Ingest { .. } | Self::ReadPayload { .. } | Self::Serialization(_) => 10,
        }
    }
}
