//! # Price Analytics
//!
//! Pure, synchronous computations over an immutable [`PriceSeries`](crate::PriceSeries).
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`resolver`] | Nearest valid price and range clamping |
//! | [`performance`] | Percentage change, relative spans and custom ranges |
//! | [`chart`] | Downsampled ASCII line charts |
//! | [`summary`] | Text and structured performance summaries |

pub mod chart;
pub mod performance;
pub mod resolver;
pub mod summary;

pub use chart::{downsample, render, render_window, ChartDimensions, DEFAULT_WINDOW};
pub use performance::{
    custom_range_performance, percent_change, relative_performance, validate_range,
    RangePerformance, Span,
};
pub use resolver::{anchor, clamp_range_end, clamp_range_start, nearest_on_or_before};
pub use summary::{
    format_signed_percent, format_summary, render_summary, summarize, PerformanceSummary,
    SummaryOptions,
};
