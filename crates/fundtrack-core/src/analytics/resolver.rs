//! Nearest-valid-price lookups over a [`PriceSeries`].
//!
//! Real price histories skip weekends and holidays and often lag the market
//! close by a day, so exact date matches are the exception. Every lookup here
//! resolves to the closest earlier observation that actually has a price.

use time::Date;

use crate::{AnalyticsError, Observation, PricePoint, PriceSeries};

/// Most recent priced observation dated on or before `reference`.
///
/// `reference` defaults to the last date in the series. The returned date may
/// be earlier than the reference when the matching entries have no price.
pub fn nearest_on_or_before(
    series: &PriceSeries,
    reference: Option<Date>,
) -> Result<PricePoint, AnalyticsError> {
    let reference = reference.unwrap_or_else(|| series.last_date());
    let count = series.count_on_or_before(reference);

    series.observations()[..count]
        .iter()
        .rev()
        .find_map(Observation::priced)
        .ok_or(AnalyticsError::NoPriceAvailable { reference })
}

/// The anchor: the latest priced observation in the series.
pub fn anchor(series: &PriceSeries) -> Result<PricePoint, AnalyticsError> {
    nearest_on_or_before(series, None)
}

/// Resolve the start of a requested range.
///
/// Takes the first observation dated on or after `start` and, if it has no
/// price, steps back to the nearest earlier priced observation.
pub fn clamp_range_start(series: &PriceSeries, start: Date) -> Result<PricePoint, AnalyticsError> {
    let index = series
        .index_on_or_after(start)
        .ok_or(AnalyticsError::NoPriceAvailable { reference: start })?;

    series.observations()[..=index]
        .iter()
        .rev()
        .find_map(Observation::priced)
        .ok_or(AnalyticsError::NoPriceAvailable { reference: start })
}

/// Resolve the end of a requested range: the last priced observation on or before `end`.
pub fn clamp_range_end(series: &PriceSeries, end: Date) -> Result<PricePoint, AnalyticsError> {
    nearest_on_or_before(series, Some(end))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn gappy() -> PriceSeries {
        PriceSeries::from_raw(&[
            ("2024-01-01", Some(100.0)),
            ("2024-01-02", None),
            ("2024-01-03", Some(102.0)),
            ("2024-01-08", Some(103.0)),
            ("2024-01-09", None),
        ])
        .expect("valid series")
    }

    #[test]
    fn exact_priced_date_resolves_to_itself() {
        let point = nearest_on_or_before(&gappy(), Some(date!(2024 - 01 - 03))).expect("price");
        assert_eq!(point.date, date!(2024 - 01 - 03));
        assert_eq!(point.price, 102.0);
    }

    #[test]
    fn null_price_falls_back_to_previous_entry() {
        let point = nearest_on_or_before(&gappy(), Some(date!(2024 - 01 - 02))).expect("price");
        assert_eq!(point.date, date!(2024 - 01 - 01));
        assert_eq!(point.price, 100.0);
    }

    #[test]
    fn date_inside_gap_uses_last_earlier_entry() {
        let point = nearest_on_or_before(&gappy(), Some(date!(2024 - 01 - 06))).expect("price");
        assert_eq!(point.date, date!(2024 - 01 - 03));
    }

    #[test]
    fn default_reference_skips_unreported_suffix() {
        let point = anchor(&gappy()).expect("anchor");
        assert_eq!(point.date, date!(2024 - 01 - 08));
        assert_eq!(point.price, 103.0);
    }

    #[test]
    fn reference_before_series_fails() {
        let err = nearest_on_or_before(&gappy(), Some(date!(2023 - 12 - 31))).expect_err("must fail");
        assert_eq!(
            err,
            AnalyticsError::NoPriceAvailable {
                reference: date!(2023 - 12 - 31)
            }
        );
    }

    #[test]
    fn leading_nulls_exhaust_the_search() {
        let series = PriceSeries::from_raw(&[("2024-01-01", None), ("2024-01-02", Some(5.0))])
            .expect("valid series");
        let err = nearest_on_or_before(&series, Some(date!(2024 - 01 - 01))).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::NoPriceAvailable { .. }));
    }

    #[test]
    fn range_start_moves_forward_to_next_entry() {
        let point = clamp_range_start(&gappy(), date!(2024 - 01 - 04)).expect("start");
        assert_eq!(point.date, date!(2024 - 01 - 08));
    }

    #[test]
    fn range_start_on_null_entry_steps_back() {
        let point = clamp_range_start(&gappy(), date!(2024 - 01 - 02)).expect("start");
        assert_eq!(point.date, date!(2024 - 01 - 01));
    }

    #[test]
    fn range_start_after_series_fails() {
        let err = clamp_range_start(&gappy(), date!(2024 - 02 - 01)).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::NoPriceAvailable { .. }));
    }

    #[test]
    fn range_end_drops_future_and_unpriced_entries() {
        let point = clamp_range_end(&gappy(), date!(2024 - 01 - 09)).expect("end");
        assert_eq!(point.date, date!(2024 - 01 - 08));
    }
}
