use serde::{Deserialize, Serialize};
use time::Date;

use crate::domain::trade_date::{iso_date, parse_date};
use crate::ValidationError;

/// One dated price sample. `price` is `None` when nothing was reported for the date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub price: Option<f64>,
}

impl Observation {
    pub fn new(date: Date, price: Option<f64>) -> Result<Self, ValidationError> {
        if let Some(value) = price {
            if !value.is_finite() || value <= 0.0 {
                return Err(ValidationError::InvalidPrice { date, value });
            }
        }
        Ok(Self { date, price })
    }

    pub fn priced(&self) -> Option<PricePoint> {
        self.price.map(|price| PricePoint {
            date: self.date,
            price,
        })
    }
}

/// A resolved date/price pair. The date may precede the date that was asked for.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    #[serde(with = "iso_date")]
    pub date: Date,
    pub price: f64,
}

/// Chronological price history for a single instrument.
///
/// Dates are unique and strictly increasing and at least one observation
/// carries a price. The series is never mutated after construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct PriceSeries {
    observations: Vec<Observation>,
}

impl PriceSeries {
    pub fn new(observations: Vec<Observation>) -> Result<Self, ValidationError> {
        if observations.is_empty() {
            return Err(ValidationError::EmptySeries);
        }

        for pair in observations.windows(2) {
            if pair[0].date >= pair[1].date {
                return Err(ValidationError::UnorderedSeries {
                    previous: pair[0].date,
                    next: pair[1].date,
                });
            }
        }

        if observations.iter().all(|observation| observation.price.is_none()) {
            return Err(ValidationError::SeriesWithoutPrice);
        }

        Ok(Self { observations })
    }

    /// Build a series from raw `(YYYY-MM-DD, price)` rows as returned by providers.
    pub fn from_raw<S>(rows: &[(S, Option<f64>)]) -> Result<Self, ValidationError>
    where
        S: AsRef<str>,
    {
        let observations = rows
            .iter()
            .map(|(date, price)| Observation::new(parse_date(date.as_ref())?, *price))
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(observations)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Date {
        self.observations[0].date
    }

    pub fn last_date(&self) -> Date {
        self.observations[self.observations.len() - 1].date
    }

    /// Number of observations dated on or before `date`.
    ///
    /// The index of the last such observation is this value minus one.
    pub fn count_on_or_before(&self, date: Date) -> usize {
        self.observations
            .partition_point(|observation| observation.date <= date)
    }

    /// Index of the first observation dated on or after `date`.
    pub fn index_on_or_after(&self, date: Date) -> Option<usize> {
        let index = self
            .observations
            .partition_point(|observation| observation.date < date);
        (index < self.observations.len()).then_some(index)
    }

    /// Observations dated within `[start, end]`, inclusive on both ends.
    pub fn window(&self, start: Date, end: Date) -> &[Observation] {
        if start > end {
            return &[];
        }
        let from = self
            .observations
            .partition_point(|observation| observation.date < start);
        let to = self.count_on_or_before(end);
        &self.observations[from..to]
    }
}

impl<'de> Deserialize<'de> for PriceSeries {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let observations = Vec::<Observation>::deserialize(deserializer)?;
        Self::new(observations).map_err(serde::de::Error::custom)
    }
}
