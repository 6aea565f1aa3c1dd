use std::path::PathBuf;

use thiserror::Error;
use time::Date;

use crate::data_source::SourceError;

/// Validation and contract errors raised while constructing domain values.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter, digit or '^': '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("invalid source '{value}', expected yahoo")]
    InvalidSource { value: String },

    #[error("currency must be a 3-letter uppercase ISO code: '{value}'")]
    InvalidCurrency { value: String },
    #[error("instrument type cannot be empty")]
    EmptyInstrumentType,

    #[error("date must be formatted as YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("price must be finite and greater than zero, got {value} on {date}")]
    InvalidPrice { date: Date, value: f64 },
    #[error("price series cannot be empty")]
    EmptySeries,
    #[error("price series has no priced observation")]
    SeriesWithoutPrice,
    #[error("price series dates must be strictly increasing: {previous} then {next}")]
    UnorderedSeries { previous: Date, next: Date },

    #[error("invalid configuration for {key}: '{value}'")]
    InvalidConfig { key: &'static str, value: String },
}

/// Failures raised by the price analytics engine.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AnalyticsError {
    #[error("no price available on or before {reference}")]
    NoPriceAvailable { reference: Date },

    #[error("invalid date range {start}..{end}: {reason}")]
    InvalidRange {
        start: Date,
        end: Date,
        reason: &'static str,
    },

    #[error("chart dimensions must be at least 1x1, got height={height} length={length}")]
    InvalidDimensions { height: usize, length: usize },

    #[error("chart window between {start} and {end} has no priced observation")]
    InsufficientData { start: Date, end: Date },

    #[error("instruments can only be compared with an instrument or a symbol, got {type_name}")]
    InvalidComparison { type_name: &'static str },
}

/// Errors raised while reading or writing the watchlist file.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("watchlist file must have a .csv extension: {path}")]
    UnsupportedFileType { path: PathBuf },

    #[error("watchlist io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("watchlist csv error: {0}")]
    Csv(#[from] csv::Error),
}

/// Top-level error type for tracker operations.
#[derive(Debug, Error)]
pub enum TrackerError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("{symbol} is already tracked")]
    AlreadyTracked { symbol: String },

    #[error("{symbol} is not tracked")]
    NotTracked { symbol: String },
}
