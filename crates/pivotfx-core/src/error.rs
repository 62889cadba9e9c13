use thiserror::Error;

/// Boundary validation errors exposed by `pivotfx-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("currency code cannot be empty")]
    EmptyCurrency,
    #[error("currency length {len} exceeds max {max}")]
    CurrencyTooLong { len: usize, max: usize },
    #[error("currency contains invalid character '{ch}' at index {index}")]
    CurrencyInvalidChar { ch: char, index: usize },
    #[error("currency '{value}' is not in the fiat or crypto allow-list")]
    CurrencyNotAllowed { value: String },

    #[error("date must be formatted YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("date range start {from} is after end {to}")]
    InvalidDateRange { from: String, to: String },
    #[error("date range spans {days} days, max is {max}")]
    DateRangeTooLong { days: i64, max: u32 },

    #[error("{class} allow-list cannot be empty")]
    EmptyAllowList { class: &'static str },
    #[error("currency '{value}' appears in both fiat and crypto allow-lists")]
    OverlappingAllowLists { value: String },
    #[error("pivot currency USD must be in the fiat allow-list")]
    MissingPivot,
}

/// Failures surfaced by [`crate::RateResolver`].
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ResolveError {
    #[error("invalid currency: {}", .codes.join(", "))]
    InvalidCurrency { codes: Vec<String> },

    #[error(transparent)]
    InvalidDateRange(ValidationError),

    #[error("rate not found for {base} to {target} on {date}")]
    RateNotFound {
        base: String,
        target: String,
        date: String,
    },

    #[error("rate for {pair} on {date} is not a positive finite number")]
    InvalidRate { pair: String, date: String },

    #[error("amount must be finite, got {amount}")]
    InvalidAmount { amount: f64 },
}

impl ResolveError {
    /// Stable machine-readable code for envelopes and logs.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidCurrency { .. } => "invalid_currency",
            Self::InvalidDateRange(_) => "invalid_date_range",
            Self::RateNotFound { .. } => "rate_not_found",
            Self::InvalidRate { .. } => "invalid_rate",
            Self::InvalidAmount { .. } => "invalid_amount",
        }
    }

    /// Only missing data may resolve itself after a later fetch.
    pub const fn retryable(&self) -> bool {
        matches!(self, Self::RateNotFound { .. })
    }
}

/// Failures while turning provider payloads into snapshots.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("{payload} payload contained no rates")]
    EmptyPayload { payload: &'static str },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("payload decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Malformed configuration values.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("environment variable {name} has invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
