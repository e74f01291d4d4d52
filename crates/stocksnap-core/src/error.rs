use thiserror::Error;

use crate::http_client::HttpError;

/// Validation and contract errors exposed by `stocksnap-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol contains whitespace or control character {ch:?} at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },

    #[error("snapshot must contain at least one record")]
    EmptySnapshot,

    #[error("config field '{field}' must be greater than zero")]
    ZeroConfigValue { field: &'static str },
    #[error("config field '{field}' has invalid value '{value}'")]
    InvalidConfigValue { field: &'static str, value: String },
}

/// Record-level failure raised by the normalizer. The offending record is
/// skipped; the rest of the page survives.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NormalizationError {
    #[error("record {index} has no symbol")]
    MissingSymbol { index: usize },
    #[error("record {index} has an invalid symbol: {source}")]
    InvalidSymbol {
        index: usize,
        #[source]
        source: ValidationError,
    },
    #[error("record {index} does not match the upstream schema: {message}")]
    Malformed { index: usize, message: String },
}

impl NormalizationError {
    pub const fn index(&self) -> usize {
        match self {
            Self::MissingSymbol { index }
            | Self::InvalidSymbol { index, .. }
            | Self::Malformed { index, .. } => *index,
        }
    }
}

/// Page-level failure inside the fetcher. Recovered locally: the page
/// contributes zero records.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PageError {
    #[error("page {page} transport error: {source}")]
    Transport {
        page: u32,
        #[source]
        source: HttpError,
    },
    #[error("page {page} timed out after {timeout_ms}ms")]
    Timeout { page: u32, timeout_ms: u64 },
    #[error("page {page} upstream returned status {status}")]
    Status { page: u32, status: u16 },
    #[error("page {page} payload is not valid JSON: {message}")]
    Decode { page: u32, message: String },
    #[error("page {page} payload is missing the stock list")]
    MissingData { page: u32 },
}

impl PageError {
    pub const fn page(&self) -> u32 {
        match self {
            Self::Transport { page, .. }
            | Self::Timeout { page, .. }
            | Self::Status { page, .. }
            | Self::Decode { page, .. }
            | Self::MissingData { page } => *page,
        }
    }
}

/// Errors surfaced by the refresh coordinator and the query surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SnapshotError {
    #[error("upstream fetch produced no records ({pages_failed} of {pages} pages failed)")]
    EmptyFetch { pages: u32, pages_failed: u32 },

    #[error("stock data temporarily unavailable")]
    ColdStartUnavailable,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("feed failure: {0}")]
    Feed(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl SnapshotError {
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest(message.into())
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::EmptyFetch { .. } => "snapshot.empty_fetch",
            Self::ColdStartUnavailable => "snapshot.cold_start_unavailable",
            Self::InvalidRequest(_) => "snapshot.invalid_request",
            Self::Feed(_) => "snapshot.feed",
            Self::Validation(_) => "snapshot.validation",
        }
    }

    /// Whether a later attempt may succeed without caller changes.
    pub const fn retryable(&self) -> bool {
        matches!(
            self,
            Self::EmptyFetch { .. } | Self::ColdStartUnavailable | Self::Feed(_)
        )
    }
}
