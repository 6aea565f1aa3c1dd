use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::{Date, Duration};
use tracing::debug;

use crate::analytics::resolver::{anchor, clamp_range_end, clamp_range_start, nearest_on_or_before};
use crate::domain::trade_date::iso_date;
use crate::{AnalyticsError, Instrument, ValidationError};

/// Look-back window for relative performance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Span {
    Day,
    Week,
    Year,
}

impl Span {
    pub const ALL: [Self; 3] = [Self::Day, Self::Week, Self::Year];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Day => "day",
            Self::Week => "week",
            Self::Year => "year",
        }
    }

    /// Calendar distance between the anchor and the baseline target.
    pub const fn lookback(self) -> Duration {
        match self {
            Self::Day => Duration::days(1),
            Self::Week => Duration::days(7),
            Self::Year => Duration::days(364),
        }
    }

    /// Human label used in performance summaries.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Day => "Previous 24 hours",
            Self::Week => "Previous week",
            Self::Year => "Previous year",
        }
    }
}

impl Display for Span {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Span {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "day" | "1d" => Ok(Self::Day),
            "week" | "1w" => Ok(Self::Week),
            "year" | "1y" => Ok(Self::Year),
            other => Err(ValidationError::InvalidConfig {
                key: "span",
                value: other.to_owned(),
            }),
        }
    }
}

/// Percentage change between two prices.
///
/// The denominator is always the larger of the two prices, so a move from
/// 100 to 110 is `+9.09` and a move from 110 to 100 is `-9.09`.
pub fn percent_change(base_price: f64, latest_price: f64) -> f64 {
    if base_price == latest_price {
        return 0.0;
    }

    let hi = base_price.max(latest_price);
    let lo = base_price.min(latest_price);
    let magnitude = (hi - lo) / hi * 100.0;

    if latest_price > base_price {
        magnitude
    } else {
        -magnitude
    }
}

/// Change between the anchor price and the price one `span` earlier.
pub fn relative_performance(instrument: &Instrument, span: Span) -> Result<f64, AnalyticsError> {
    let series = instrument.series();
    let latest = anchor(series)?;
    let target = latest
        .date
        .checked_sub(span.lookback())
        .ok_or(AnalyticsError::NoPriceAvailable {
            reference: latest.date,
        })?;
    let baseline = nearest_on_or_before(series, Some(target))?;

    let change = percent_change(baseline.price, latest.price);
    debug!(
        symbol = %instrument.symbol(),
        %span,
        baseline_date = %baseline.date,
        anchor_date = %latest.date,
        change,
        "relative performance"
    );
    Ok(change)
}

/// Result of a custom range query, with the dates that were actually used.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangePerformance {
    pub percent: f64,
    #[serde(with = "iso_date")]
    pub start: Date,
    #[serde(with = "iso_date")]
    pub end: Date,
}

/// Reject ranges that end before they start or end after `today`.
pub fn validate_range(start: Date, end: Date, today: Date) -> Result<(), AnalyticsError> {
    if end <= start {
        return Err(AnalyticsError::InvalidRange {
            start,
            end,
            reason: "end date must be after start date",
        });
    }
    if end > today {
        return Err(AnalyticsError::InvalidRange {
            start,
            end,
            reason: "end date cannot be in the future",
        });
    }
    Ok(())
}

/// Change between the nearest valid prices around `start` and `end`.
pub fn custom_range_performance(
    instrument: &Instrument,
    start: Date,
    end: Date,
    today: Date,
) -> Result<RangePerformance, AnalyticsError> {
    validate_range(start, end, today)?;

    let series = instrument.series();
    let effective_end = clamp_range_end(series, end)?;
    let effective_start = clamp_range_start(series, start)?;

    // No observation inside the range: the first one at or after `start` is already past `end`.
    if effective_start.date > effective_end.date {
        return Err(AnalyticsError::NoPriceAvailable { reference: start });
    }

    let percent = percent_change(effective_start.price, effective_end.price);
    debug!(
        symbol = %instrument.symbol(),
        requested_start = %start,
        requested_end = %end,
        effective_start = %effective_start.date,
        effective_end = %effective_end.date,
        percent,
        "custom range performance"
    );

    Ok(RangePerformance {
        percent,
        start: effective_start.date,
        end: effective_end.date,
    })
}
