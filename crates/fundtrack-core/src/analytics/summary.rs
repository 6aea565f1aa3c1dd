use serde::Serialize;

use crate::analytics::chart::{render, ChartDimensions};
use crate::analytics::performance::{relative_performance, Span};
use crate::analytics::resolver::anchor;
use crate::domain::format_date;
use crate::{AnalyticsError, Instrument, PricePoint};

/// Which sections a performance summary includes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    pub day: bool,
    pub week: bool,
    pub year: bool,
    pub chart: Option<ChartDimensions>,
}

impl SummaryOptions {
    pub fn includes(&self, span: Span) -> bool {
        match span {
            Span::Day => self.day,
            Span::Week => self.week,
            Span::Year => self.year,
        }
    }
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            day: true,
            week: true,
            year: true,
            chart: None,
        }
    }
}

/// Computed figures behind a summary, in a serializable shape.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub symbol: String,
    pub name: Option<String>,
    pub currency: String,
    pub instrument_type: String,
    pub latest: PricePoint,
    pub day: Option<f64>,
    pub week: Option<f64>,
    pub year: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chart: Option<String>,
}

impl PerformanceSummary {
    pub fn change(&self, span: Span) -> Option<f64> {
        match span {
            Span::Day => self.day,
            Span::Week => self.week,
            Span::Year => self.year,
        }
    }
}

pub fn summarize(
    instrument: &Instrument,
    options: &SummaryOptions,
) -> Result<PerformanceSummary, AnalyticsError> {
    let latest = anchor(instrument.series())?;
    let span_change = |span: Span| -> Result<Option<f64>, AnalyticsError> {
        if options.includes(span) {
            relative_performance(instrument, span).map(Some)
        } else {
            Ok(None)
        }
    };

    let chart = options
        .chart
        .map(|dims| render(instrument.series(), dims.height, dims.length))
        .transpose()?;

    Ok(PerformanceSummary {
        symbol: instrument.symbol().to_string(),
        name: instrument.name().map(str::to_owned),
        currency: instrument.currency().to_owned(),
        instrument_type: instrument.instrument_type().to_owned(),
        latest,
        day: span_change(Span::Day)?,
        week: span_change(Span::Week)?,
        year: span_change(Span::Year)?,
        chart,
    })
}

/// Multi-line text summary of an instrument's recent performance.
pub fn format_summary(
    instrument: &Instrument,
    options: &SummaryOptions,
) -> Result<String, AnalyticsError> {
    summarize(instrument, options).map(|summary| render_summary(&summary))
}

/// Text form of an already computed [`PerformanceSummary`].
pub fn render_summary(summary: &PerformanceSummary) -> String {
    let mut lines = vec![
        format!("{} - {}", summary.symbol, summary.name.as_deref().unwrap_or("")),
        format!("{} - {}", summary.currency, summary.instrument_type),
        format!(
            "Latest price: {} - ${:.2}",
            format_date(summary.latest.date),
            summary.latest.price
        ),
    ];

    for span in Span::ALL {
        if let Some(change) = summary.change(span) {
            lines.push(format!("{}: {}%", span.label(), format_signed_percent(change)));
        }
    }

    if let Some(chart) = &summary.chart {
        lines.push(chart.clone());
    }
    lines.join("\n")
}

/// Two-decimal rendering with a leading `+` unless the text already starts with `-`.
pub fn format_signed_percent(value: f64) -> String {
    let formatted = format!("{value:.2}");
    if formatted.starts_with('-') {
        formatted
    } else {
        format!("+{formatted}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fund(name: Option<&str>) -> Instrument {
        Instrument::from_raw(
            "fxaix",
            "usd",
            "mutualfund",
            &[
                ("2023-01-09", Some(100.0)),
                ("2024-01-01", Some(100.0)),
                ("2024-01-02", Some(110.0)),
                ("2024-01-08", Some(121.0)),
                ("2024-01-09", Some(110.0)),
                ("2024-01-10", None),
            ],
            name.map(str::to_owned),
        )
        .expect("valid instrument")
    }

    #[test]
    fn signs_positive_and_zero_values() {
        assert_eq!(format_signed_percent(9.0909), "+9.09");
        assert_eq!(format_signed_percent(0.0), "+0.00");
        assert_eq!(format_signed_percent(-9.0909), "-9.09");
    }

    #[test]
    fn full_summary_lists_every_span() {
        let text = format_summary(&fund(Some("Index")), &SummaryOptions::default()).expect("summary");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "FXAIX - Index");
        assert_eq!(lines[1], "USD - MUTUALFUND");
        assert_eq!(lines[2], "Latest price: 2024-01-09 - $110.00");
        assert_eq!(lines[3], "Previous 24 hours: -9.09%");
        assert_eq!(lines[4], "Previous week: +0.00%");
        assert_eq!(lines[5], "Previous year: +9.09%");
        assert_eq!(lines.len(), 6);
    }

    #[test]
    fn disabled_spans_are_omitted_and_missing_name_is_blank() {
        let options = SummaryOptions {
            day: false,
            week: true,
            year: false,
            chart: None,
        };
        let text = format_summary(&fund(None), &options).expect("summary");
        let lines = text.lines().collect::<Vec<_>>();

        assert_eq!(lines[0], "FXAIX - ");
        assert_eq!(lines[3], "Previous week: +0.00%");
        assert_eq!(lines.len(), 4);
    }

    #[test]
    fn chart_is_appended_when_requested() {
        let options = SummaryOptions {
            chart: Some(ChartDimensions::new(2, 4)),
            ..SummaryOptions::default()
        };
        let text = format_summary(&fund(None), &options).expect("summary");
        assert!(text.contains("____"));
    }

    #[test]
    fn missing_year_baseline_is_an_error() {
        let short = Instrument::from_raw(
            "F",
            "USD",
            "EQUITY",
            &[("2024-01-01", Some(10.0)), ("2024-01-02", Some(11.0))],
            None,
        )
        .expect("valid instrument");
        let err = format_summary(&short, &SummaryOptions::default()).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::NoPriceAvailable { .. }));
    }
}
