//! History source trait and request types.
//!
//! This module defines the contract (`HistorySource`) every price history
//! provider implements, along with the structured [`SourceError`] returned on
//! failure.
//!
//! # Example
//!
//! ```rust,ignore
//! use fundtrack_core::{HistoryRequest, HistorySource, SourceError, Symbol, YahooAdapter};
//! use time::macros::date;
//!
//! async fn latest(adapter: &YahooAdapter) -> Result<(), SourceError> {
//!     let request = HistoryRequest::new(
//!         Symbol::parse("FXAIX").expect("valid symbol"),
//!         date!(2024 - 01 - 01),
//!         date!(2024 - 06 - 30),
//!     )?;
//!     let history = adapter.history(request).await?;
//!     println!("{} observations", history.series.len());
//!     Ok(())
//! }
//! ```

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use time::Date;

use crate::{PriceHistory, ProviderId, Symbol};

/// Adapter-level error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    Unavailable,
    Timeout,
    InvalidRequest,
    NotFound,
    Internal,
}

/// Structured source error used by the fetch policy to decide on retries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Unavailable,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Timeout,
            message: message.into(),
            retryable: true,
        }
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::InvalidRequest,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::NotFound,
            message: message.into(),
            retryable: false,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            kind: SourceErrorKind::Internal,
            message: message.into(),
            retryable: false,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::Unavailable => "source.unavailable",
            SourceErrorKind::Timeout => "source.timeout",
            SourceErrorKind::InvalidRequest => "source.invalid_request",
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Internal => "source.internal",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// Request payload for daily price history between two dates, inclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRequest {
    pub symbol: Symbol,
    pub start: Date,
    pub end: Date,
}

impl HistoryRequest {
    pub fn new(symbol: Symbol, start: Date, end: Date) -> Result<Self, SourceError> {
        if start > end {
            return Err(SourceError::invalid_request(format!(
                "history request start {start} is after end {end}"
            )));
        }
        Ok(Self { symbol, start, end })
    }
}

/// Price history provider contract.
///
/// Implementations must be `Send + Sync` as the tracker shares one source
/// across concurrent refresh tasks.
pub trait HistorySource: Send + Sync {
    /// Returns the unique provider identifier.
    fn id(&self) -> ProviderId;

    /// Fetches daily closes for the requested symbol and date range.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if:
    /// - The symbol is unknown to the provider
    /// - The provider is unavailable or times out
    /// - The payload cannot be turned into a valid price series
    fn history<'a>(
        &'a self,
        req: HistoryRequest,
    ) -> Pin<Box<dyn Future<Output = Result<PriceHistory, SourceError>> + Send + 'a>>;
}
