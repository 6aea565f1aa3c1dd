//! # Domain Models
//!
//! Canonical domain types for tracked instruments and their price history.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Symbol`] | Validated ticker symbol |
//! | [`Observation`] | One dated, possibly missing, price sample |
//! | [`PricePoint`] | A resolved date/price pair |
//! | [`PriceSeries`] | Sorted observations for one instrument |
//! | [`PriceHistory`] | Provider payload for one symbol |
//! | [`Instrument`] | Symbol, currency, type, optional name and series |
//!
//! All types validate their invariants at construction time:
//!
//! ```rust
//! use fundtrack_core::{PriceSeries, ValidationError};
//!
//! let err = PriceSeries::from_raw(&[("2024-01-02", Some(1.0)), ("2024-01-01", Some(2.0))])
//!     .unwrap_err();
//! assert!(matches!(err, ValidationError::UnorderedSeries { .. }));
//! ```

mod models;
mod series;
mod symbol;
pub mod trade_date;

pub use models::{normalize_instrument_type, validate_currency_code, Instrument, PriceHistory};
pub use series::{Observation, PricePoint, PriceSeries};
pub use symbol::Symbol;
pub use trade_date::{format_date, parse_date, today_utc};
