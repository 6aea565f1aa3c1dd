//! Behavior-driven tests for the price analytics engine
//!
//! These tests verify HOW prices are resolved across gaps, how performance is
//! measured over relative spans and custom ranges, and how summaries and
//! charts are rendered.

use fundtrack_core::{
    analytics::{clamp_range_end, clamp_range_start},
    custom_range_performance, format_summary, nearest_on_or_before, percent_change,
    relative_performance, render, AnalyticsError, ChartDimensions, Instrument, PriceSeries, Span,
    SummaryOptions, ValidationError,
};
use time::macros::date;

fn instrument(rows: &[(&str, Option<f64>)]) -> Instrument {
    Instrument::from_raw("fxaix", "usd", "mutualfund", rows, Some(String::from("Index")))
        .expect("valid instrument")
}

/// One year of history with a reporting gap at the end.
fn yearly() -> Instrument {
    instrument(&[
        ("2023-01-10", Some(100.0)),
        ("2024-01-02", Some(110.0)),
        ("2024-01-08", Some(121.0)),
        ("2024-01-09", Some(110.0)),
        ("2024-01-10", None),
    ])
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

// =============================================================================
// Price Resolution
// =============================================================================

#[test]
fn when_latest_close_is_missing_the_anchor_falls_back_to_last_reported_price() {
    // Given: A series whose most recent day has not been reported yet
    let series = yearly();

    // When: The nearest price to the end of the series is resolved
    let point = nearest_on_or_before(series.series(), None).expect("price");

    // Then: The last reported close is used
    assert_eq!(point.date, date!(2024 - 01 - 09));
    assert_eq!(point.price, 110.0);
}

#[test]
fn when_reference_precedes_history_resolution_fails_explicitly() {
    // Given: A series starting in 2023
    let series = yearly();

    // When: A price before the first observation is requested
    let err = nearest_on_or_before(series.series(), Some(date!(2022 - 12 - 31)))
        .expect_err("must fail");

    // Then: The failure names the requested date
    assert_eq!(
        err,
        AnalyticsError::NoPriceAvailable {
            reference: date!(2022 - 12 - 31)
        }
    );
}

#[test]
fn when_dates_are_out_of_order_the_series_is_rejected() {
    // Given: Rows where a later date comes first
    let rows = [("2024-01-02", Some(1.0)), ("2024-01-01", Some(2.0))];

    // When: A series is constructed
    let err = PriceSeries::from_raw(&rows).expect_err("must fail");

    // Then: Construction fails fast
    assert!(matches!(err, ValidationError::UnorderedSeries { .. }));
}

// =============================================================================
// Relative Performance
// =============================================================================

#[test]
fn when_price_rises_and_falls_by_the_same_amount_the_magnitude_is_symmetric() {
    // Given/When: Equal moves in both directions
    let up = percent_change(100.0, 110.0);
    let down = percent_change(110.0, 100.0);

    // Then: Both divide by the larger price
    assert_close(up, 100.0 / 11.0);
    assert_close(down, -100.0 / 11.0);
    assert_eq!(percent_change(100.0, 100.0), 0.0);
}

#[test]
fn when_every_span_has_a_baseline_each_change_is_measured_from_the_anchor() {
    // Given: Baselines exactly one day, one week and 364 days before the anchor
    let fund = yearly();

    // When/Then: Each span compares against its own baseline
    assert_close(relative_performance(&fund, Span::Day).expect("day"), -100.0 / 11.0);
    assert_close(relative_performance(&fund, Span::Week).expect("week"), 0.0);
    assert_close(relative_performance(&fund, Span::Year).expect("year"), 100.0 / 11.0);
}

#[test]
fn when_baseline_falls_on_a_weekend_the_previous_trading_day_is_used() {
    // Given: A week target landing on a Sunday with Friday as the last close
    let fund = instrument(&[
        ("2024-01-05", Some(50.0)),
        ("2024-01-08", Some(60.0)),
        ("2024-01-14", Some(55.0)),
    ]);

    // When: Weekly performance is computed
    let change = relative_performance(&fund, Span::Week).expect("week");

    // Then: Friday's close is the baseline
    assert_close(change, percent_change(50.0, 55.0));
}

#[test]
fn when_history_is_shorter_than_the_span_no_zero_is_invented() {
    // Given: Three days of history
    let fund = instrument(&[
        ("2024-01-08", Some(10.0)),
        ("2024-01-09", Some(11.0)),
        ("2024-01-10", Some(12.0)),
    ]);

    // When: Yearly performance is requested
    let err = relative_performance(&fund, Span::Year).expect_err("must fail");

    // Then: The missing baseline is an error
    assert!(matches!(err, AnalyticsError::NoPriceAvailable { .. }));
}

// =============================================================================
// Custom Ranges
// =============================================================================

#[test]
fn when_range_bounds_fall_in_gaps_they_clamp_to_reported_prices() {
    // Given: A gap at the start bound and a null at the end bound
    let fund = instrument(&[
        ("2024-01-01", Some(100.0)),
        ("2024-01-02", None),
        ("2024-01-03", Some(102.0)),
        ("2024-01-04", Some(104.0)),
        ("2024-01-05", None),
    ]);
    let today = date!(2024 - 01 - 31);

    // When: Performance over 01-02..01-05 is computed
    let range = custom_range_performance(&fund, date!(2024 - 01 - 02), date!(2024 - 01 - 05), today)
        .expect("range");

    // Then: The start steps back to 01-01 and the end steps back to 01-04
    assert_eq!(range.start, date!(2024 - 01 - 01));
    assert_eq!(range.end, date!(2024 - 01 - 04));
    assert_close(range.percent, percent_change(100.0, 104.0));

    let start = clamp_range_start(fund.series(), date!(2024 - 01 - 02)).expect("start");
    let end = clamp_range_end(fund.series(), date!(2024 - 01 - 05)).expect("end");
    assert_eq!((start.date, end.date), (range.start, range.end));
}

#[test]
fn when_range_is_illogical_it_is_rejected_before_any_lookup() {
    // Given: Any instrument
    let fund = yearly();
    let today = date!(2024 - 01 - 10);

    // When: The end is in the future, or not after the start
    let future = custom_range_performance(&fund, date!(2024 - 01 - 02), date!(2024 - 02 - 01), today);
    let inverted = custom_range_performance(&fund, date!(2024 - 01 - 09), date!(2024 - 01 - 02), today);
    let empty = custom_range_performance(&fund, date!(2024 - 01 - 09), date!(2024 - 01 - 09), today);

    // Then: Each is an invalid range
    for result in [future, inverted, empty] {
        assert!(matches!(result, Err(AnalyticsError::InvalidRange { .. })));
    }
}

#[test]
fn when_range_starts_after_all_history_no_price_is_available() {
    // Given: History ending on 2024-01-10
    let fund = yearly();

    // When: The range starts after the last observation
    let err = custom_range_performance(
        &fund,
        date!(2024 - 01 - 11),
        date!(2024 - 01 - 20),
        date!(2024 - 01 - 31),
    )
    .expect_err("must fail");

    // Then: No start price can be resolved
    assert_eq!(
        err,
        AnalyticsError::NoPriceAvailable {
            reference: date!(2024 - 01 - 11)
        }
    );
}

// =============================================================================
// Summaries and Charts
// =============================================================================

#[test]
fn when_summary_omits_a_span_and_requests_a_chart_both_are_honored() {
    // Given: A fund and options without the daily line but with a small chart
    let fund = yearly();
    let options = SummaryOptions {
        day: false,
        chart: Some(ChartDimensions::new(2, 4)),
        ..SummaryOptions::default()
    };

    // When: The summary is formatted
    let summary = format_summary(&fund, &options).expect("summary");

    // Then: Lines appear in order with signed percentages and the chart last
    assert_eq!(
        summary,
        "FXAIX - Index\n\
         USD - MUTUALFUND\n\
         Latest price: 2024-01-09 - $110.00\n\
         Previous week: +0.00%\n\
         Previous year: +9.09%\n  \
         * |121.00\n\
         ** *|100.00\n\
         ____"
    );
}

#[test]
fn when_prices_never_move_every_point_sits_on_the_bottom_row() {
    // Given: Two identical closes
    let series = PriceSeries::from_raw(&[("2024-01-01", Some(50.0)), ("2024-01-02", Some(50.0))])
        .expect("series");

    // When: A three row chart is drawn
    let chart = render(&series, 3, 2).expect("chart");

    // Then: Only the bottom row holds points
    let rows = chart.lines().collect::<Vec<_>>();
    assert_eq!(rows, vec!["  |50.00", "  |", "**|50.00", "__"]);
}

#[test]
fn when_chart_has_no_area_it_is_rejected() {
    // Given: Any series
    let fund = yearly();

    // When/Then: Zero height or zero length fails
    for (height, length) in [(0, 10), (10, 0)] {
        assert_eq!(
            render(fund.series(), height, length).expect_err("must fail"),
            AnalyticsError::InvalidDimensions { height, length }
        );
    }
}

#[test]
fn when_compared_with_an_unsupported_type_equality_is_a_contract_violation() {
    // Given: An instrument
    let fund = yearly();

    // When/Then: Symbols and strings compare, other types fail
    assert!(fund.matches(&"FXAIX").expect("str"));
    assert!(!fund.matches(&String::from("VTSAX")).expect("string"));
    assert!(matches!(
        fund.matches(&42_u32),
        Err(AnalyticsError::InvalidComparison { .. })
    ));
}
