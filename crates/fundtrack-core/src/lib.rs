//! # Fundtrack Core
//!
//! Price history analytics and watchlist tracking for mutual funds, ETFs and
//! equities.
//!
//! ## Overview
//!
//! - **Domain models** for symbols, price observations and instruments
//! - **Analytics** for nearest-price resolution, performance and ASCII charts
//! - **History source trait** with a Yahoo Finance adapter
//! - **Fetch policy** with per-attempt timeout and retry backoff
//! - **Watchlist storage** as a CSV file
//! - **Tracker service** that refreshes instruments concurrently
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapters`] | History providers (Yahoo) |
//! | [`analytics`] | Resolver, performance calculator, chart renderer, summaries |
//! | [`config`] | Tracker configuration and environment overrides |
//! | [`data_source`] | History source trait and request types |
//! | [`domain`] | Domain models (Symbol, PriceSeries, Instrument) |
//! | [`error`] | Error types per layer |
//! | [`fetch_policy`] | Timeout and retry around fetches |
//! | [`http_client`] | HTTP client abstraction |
//! | [`source`] | Provider identifiers |
//! | [`storage`] | Watchlist CSV persistence |
//! | [`tracker`] | The `FundTracker` application service |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//!
//! use fundtrack_core::{today_utc, FundTracker, SummaryOptions, TrackerConfig, YahooAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TrackerConfig::from_env()?;
//!     let mut tracker = FundTracker::open(config, Arc::new(YahooAdapter::live()))?;
//!
//!     tracker.refresh(today_utc()).await?;
//!     println!("{}", tracker.summary_report(&SummaryOptions::default()));
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / User     │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  FundTracker    │────▶│ Watchlist (CSV)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Fetch Policy    │────▶│ History Source   │
//! │ (timeout/retry) │     │ (Yahoo adapter)  │
//! └─────────────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │   Analytics     │
//! └─────────────────┘
//! ```

pub mod adapters;
pub mod analytics;
pub mod config;
pub mod data_source;
pub mod domain;
pub mod error;
pub mod fetch_policy;
pub mod http_client;
pub mod source;
pub mod storage;
pub mod tracker;

pub use adapters::{YahooAdapter, YahooAuthManager};
pub use analytics::{
    anchor, custom_range_performance, format_signed_percent, format_summary, nearest_on_or_before,
    percent_change, relative_performance, render, render_summary, summarize, ChartDimensions,
    PerformanceSummary, RangePerformance, Span, SummaryOptions,
};
pub use config::TrackerConfig;
pub use data_source::{HistoryRequest, HistorySource, SourceError, SourceErrorKind};
pub use domain::{
    format_date, parse_date, today_utc, Instrument, Observation, PriceHistory, PricePoint,
    PriceSeries, Symbol,
};
pub use error::{AnalyticsError, StorageError, TrackerError, ValidationError};
pub use fetch_policy::{Backoff, FetchPolicy};
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, NoopHttpClient, ReqwestHttpClient,
};
pub use source::ProviderId;
pub use storage::{WatchlistEntry, WatchlistStore};
pub use tracker::{
    render_report, CustomRangeReport, FundTracker, RefreshFailure, RefreshReport, SummaryEntry,
    TrackerErrorMessage, REPORT_SEPARATOR,
};
