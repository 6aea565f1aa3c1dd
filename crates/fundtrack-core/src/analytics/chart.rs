//! Fixed-size ASCII line charts.
//!
//! Three daily closes of 100, 102 and 104 on a 3x3 grid:
//!
//! ```text
//!   *|104.00
//!  * |
//! *  |100.00
//! ___
//! ```

use serde::{Deserialize, Serialize};
use time::Duration;
use tracing::debug;

use crate::analytics::resolver::anchor;
use crate::domain::format_date;
use crate::{AnalyticsError, Observation, PricePoint, PriceSeries};

/// Default look-back covered by a chart.
pub const DEFAULT_WINDOW: Duration = Duration::weeks(52);

/// Grid size of a rendered chart: `height` rows by `length` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChartDimensions {
    pub height: usize,
    pub length: usize,
}

impl ChartDimensions {
    pub const fn new(height: usize, length: usize) -> Self {
        Self { height, length }
    }

    pub fn validate(self) -> Result<Self, AnalyticsError> {
        if self.height < 1 || self.length < 1 {
            return Err(AnalyticsError::InvalidDimensions {
                height: self.height,
                length: self.length,
            });
        }
        Ok(self)
    }
}

impl Default for ChartDimensions {
    fn default() -> Self {
        Self::new(10, 52)
    }
}

/// Render the last 52 weeks of `series` as a `height` x `length` chart.
pub fn render(series: &PriceSeries, height: usize, length: usize) -> Result<String, AnalyticsError> {
    render_window(series, height, length, DEFAULT_WINDOW)
}

/// Render observations in `[anchor - window, anchor]`.
pub fn render_window(
    series: &PriceSeries,
    height: usize,
    length: usize,
    window: Duration,
) -> Result<String, AnalyticsError> {
    let dims = ChartDimensions::new(height, length).validate()?;

    let end = anchor(series)?.date;
    let start = end.checked_sub(window).unwrap_or_else(|| series.first_date());
    let points = series
        .window(start, end)
        .iter()
        .filter_map(Observation::priced)
        .collect::<Vec<_>>();
    if points.is_empty() {
        return Err(AnalyticsError::InsufficientData { start, end });
    }

    let kept = downsample(&points, dims.length);
    debug!(
        window_points = points.len(),
        plotted = kept.len(),
        height = dims.height,
        length = dims.length,
        "render chart"
    );
    Ok(compose(&kept, dims))
}

/// Reduce `points` to at most `length` entries, always keeping both endpoints
/// while `length` allows.
pub fn downsample(points: &[PricePoint], length: usize) -> Vec<PricePoint> {
    let count = points.len();
    if count <= length {
        return points.to_vec();
    }

    let stride = (count / length).max(1);
    let last = count - 1;
    let mut kept = points
        .iter()
        .enumerate()
        .filter(|(index, _)| *index == 0 || *index == last || index % stride == 0)
        .map(|(_, point)| *point)
        .collect::<Vec<_>>();

    while kept.len() > length {
        kept.remove(kept.len() / 2);
    }
    kept
}

/// Row index in `[0, height - 1]` for each point; row 0 is the bottom.
fn bin_rows(points: &[PricePoint], height: usize) -> (Vec<usize>, f64, f64) {
    let hi = points.iter().map(|point| point.price).fold(f64::MIN, f64::max);
    let lo = points.iter().map(|point| point.price).fold(f64::MAX, f64::min);

    if hi == lo {
        return (vec![0; points.len()], hi, lo);
    }

    let bucket = (hi - lo) / height as f64;
    let top = height - 1;
    let rows = points
        .iter()
        .map(|point| {
            let row = ((point.price - lo) / bucket).floor();
            (row.max(0.0) as usize).min(top)
        })
        .collect();
    (rows, hi, lo)
}

fn compose(points: &[PricePoint], dims: ChartDimensions) -> String {
    let (rows, hi, lo) = bin_rows(points, dims.height);
    let top = dims.height - 1;
    let mut lines = Vec::with_capacity(dims.height + 2);

    for row in (0..dims.height).rev() {
        let mut line = rows
            .iter()
            .map(|point_row| if *point_row == row { '*' } else { ' ' })
            .collect::<String>();
        line.push('|');
        if row == top {
            line.push_str(&format!("{hi:.2}"));
        } else if row == 0 {
            line.push_str(&format!("{lo:.2}"));
        }
        lines.push(line);
    }

    lines.push("_".repeat(dims.length));
    if let Some(footer) = footer(points, dims.length) {
        lines.push(footer);
    }
    lines.join("\n")
}

fn footer(points: &[PricePoint], length: usize) -> Option<String> {
    let first = points.first()?.date;
    let last = points.last()?.date;
    let (left, right) = (format_date(first), format_date(last));
    let room = length.checked_sub(left.len() + right.len())?;
    (room > 3).then(|| format!("{left}{}{right}", " ".repeat(room)))
}
