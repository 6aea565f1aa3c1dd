//! Application service tying the watchlist, the history source and the analytics together.

use std::sync::Arc;

use serde::Serialize;
use time::{Date, Duration};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::analytics::{
    custom_range_performance, render, render_summary, summarize, validate_range, ChartDimensions,
    PerformanceSummary, RangePerformance, SummaryOptions,
};
use crate::data_source::{HistoryRequest, HistorySource, SourceError};
use crate::fetch_policy::FetchPolicy;
use crate::storage::{WatchlistEntry, WatchlistStore};
use crate::{AnalyticsError, Instrument, Symbol, TrackerConfig, TrackerError};

/// Line printed after every instrument block in a summary report.
pub const REPORT_SEPARATOR: &str = "**************************************************";

/// Extra days fetched before a custom range start so a gap at the start can be clamped.
const CUSTOM_RANGE_LEAD: Duration = Duration::days(7);

/// A symbol that could not be refreshed, with the reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshFailure {
    pub symbol: Symbol,
    pub code: &'static str,
    pub message: String,
}

/// Outcome of [`FundTracker::refresh`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RefreshReport {
    pub refreshed: Vec<Symbol>,
    pub failed: Vec<RefreshFailure>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Outcome of [`FundTracker::custom_range`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomRangeReport {
    pub symbol: Symbol,
    pub name: Option<String>,
    #[serde(with = "crate::domain::trade_date::iso_date")]
    pub requested_start: Date,
    #[serde(with = "crate::domain::trade_date::iso_date")]
    pub requested_end: Date,
    pub performance: RangePerformance,
}

/// Summary of one tracked symbol, or why it could not be produced.
#[derive(Debug, Clone)]
pub struct SummaryEntry {
    pub symbol: Symbol,
    pub outcome: Result<PerformanceSummary, TrackerErrorMessage>,
}

/// Display form of a per-instrument failure inside a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerErrorMessage {
    pub code: &'static str,
    pub message: String,
}

impl TrackerErrorMessage {
    fn analytics(error: &AnalyticsError) -> Self {
        Self {
            code: analytics_code(error),
            message: error.to_string(),
        }
    }

    fn not_loaded() -> Self {
        Self {
            code: "tracker.not_loaded",
            message: String::from("no price history loaded"),
        }
    }
}

/// Tracked instruments backed by a watchlist file and a history source.
///
/// The instrument list is replaced as a whole on refresh, so a snapshot taken
/// with [`FundTracker::snapshot`] never observes a partially updated set.
pub struct FundTracker {
    config: TrackerConfig,
    source: Arc<dyn HistorySource>,
    store: WatchlistStore,
    entries: Vec<WatchlistEntry>,
    instruments: Arc<[Instrument]>,
}

impl FundTracker {
    /// Open the watchlist. No prices are fetched until [`FundTracker::refresh`].
    pub fn open(config: TrackerConfig, source: Arc<dyn HistorySource>) -> Result<Self, TrackerError> {
        let store = WatchlistStore::open(config.data_file.clone())?;
        let entries = store.load()?;
        info!(
            path = %store.path().display(),
            tracked = entries.len(),
            provider = %source.id(),
            "opened watchlist"
        );

        Ok(Self {
            config,
            source,
            store,
            entries,
            instruments: Arc::from(Vec::new()),
        })
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn entries(&self) -> &[WatchlistEntry] {
        &self.entries
    }

    pub fn instruments(&self) -> &[Instrument] {
        &self.instruments
    }

    /// Shared handle to the current instrument set.
    pub fn snapshot(&self) -> Arc<[Instrument]> {
        Arc::clone(&self.instruments)
    }

    pub fn find(&self, symbol: &str) -> Option<&Instrument> {
        let symbol = Symbol::parse(symbol).ok()?;
        self.instruments
            .iter()
            .find(|instrument| *instrument == &symbol)
    }

    /// Write the watchlist back to disk.
    pub fn save(&self) -> Result<(), TrackerError> {
        self.store.save(&self.entries)?;
        Ok(())
    }

    /// Fetch every tracked symbol concurrently and swap in the results.
    pub async fn refresh(&mut self, today: Date) -> Result<RefreshReport, TrackerError> {
        let (start, end) = self.history_window(today)?;
        let policy = self.config.fetch;

        let mut tasks = JoinSet::new();
        for (index, entry) in self.entries.iter().cloned().enumerate() {
            let source = Arc::clone(&self.source);
            tasks.spawn(async move {
                (index, fetch_instrument(source, policy, &entry, start, end).await)
            });
        }

        let mut outcomes = (0..self.entries.len()).map(|_| None).collect::<Vec<_>>();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, outcome)) => outcomes[index] = Some(outcome),
                Err(error) => warn!(%error, "refresh task failed to complete"),
            }
        }

        let mut report = RefreshReport::default();
        let mut instruments = Vec::with_capacity(self.entries.len());
        for (entry, outcome) in self.entries.iter().zip(outcomes) {
            match outcome {
                Some(Ok(instrument)) => {
                    report.refreshed.push(entry.symbol.clone());
                    instruments.push(instrument);
                }
                Some(Err(error)) => {
                    warn!(symbol = %entry.symbol, %error, "refresh failed");
                    report.failed.push(RefreshFailure {
                        symbol: entry.symbol.clone(),
                        code: tracker_code(&error),
                        message: error.to_string(),
                    });
                }
                None => report.failed.push(RefreshFailure {
                    symbol: entry.symbol.clone(),
                    code: "tracker.task_failed",
                    message: String::from("refresh task did not complete"),
                }),
            }
        }

        self.instruments = instruments.into();
        info!(
            refreshed = report.refreshed.len(),
            failed = report.failed.len(),
            "refresh complete"
        );
        Ok(report)
    }

    /// Fetch `symbol` and start tracking it. The watchlist is not saved.
    pub async fn add(
        &mut self,
        symbol: &str,
        name: Option<String>,
        today: Date,
    ) -> Result<Instrument, TrackerError> {
        let symbol = Symbol::parse(symbol)?;
        if self.entries.iter().any(|entry| entry.symbol == symbol) {
            return Err(TrackerError::AlreadyTracked {
                symbol: symbol.to_string(),
            });
        }

        let (start, end) = self.history_window(today)?;
        let entry = WatchlistEntry::new(symbol, name);
        let instrument =
            fetch_instrument(Arc::clone(&self.source), self.config.fetch, &entry, start, end).await?;

        let mut instruments = self.instruments.to_vec();
        instruments.push(instrument.clone());
        self.instruments = instruments.into();
        info!(symbol = %entry.symbol, "added to watchlist");
        self.entries.push(entry);
        Ok(instrument)
    }

    /// Stop tracking `symbol`, returning its watchlist entry. The watchlist is not saved.
    pub fn delete(&mut self, symbol: &str) -> Result<WatchlistEntry, TrackerError> {
        let not_tracked = || TrackerError::NotTracked {
            symbol: symbol.trim().to_ascii_uppercase(),
        };
        let symbol = Symbol::parse(symbol).map_err(|_| not_tracked())?;
        let index = self
            .entries
            .iter()
            .position(|entry| entry.symbol == symbol)
            .ok_or_else(not_tracked)?;

        let removed = self.entries.remove(index);
        self.instruments = self
            .instruments
            .iter()
            .filter(|instrument| *instrument != &symbol)
            .cloned()
            .collect::<Vec<_>>()
            .into();
        info!(symbol = %removed.symbol, "removed from watchlist");
        Ok(removed)
    }

    /// Per-instrument summaries in watchlist order.
    pub fn summaries(&self, options: &SummaryOptions) -> Vec<SummaryEntry> {
        self.entries
            .iter()
            .map(|entry| {
                let outcome = match self.instruments.iter().find(|i| *i == &entry.symbol) {
                    Some(instrument) => summarize(instrument, options)
                        .map_err(|error| TrackerErrorMessage::analytics(&error)),
                    None => Err(TrackerErrorMessage::not_loaded()),
                };
                SummaryEntry {
                    symbol: entry.symbol.clone(),
                    outcome,
                }
            })
            .collect()
    }

    /// Text report of every tracked symbol, one block per symbol.
    ///
    /// A symbol whose summary cannot be computed gets an error line instead of
    /// aborting the whole report.
    pub fn summary_report(&self, options: &SummaryOptions) -> String {
        render_report(&self.summaries(options))
    }

    /// Performance of `symbol` between `start` and `end`, fetched on demand.
    pub async fn custom_range(
        &self,
        symbol: &str,
        start: Date,
        end: Date,
        today: Date,
    ) -> Result<CustomRangeReport, TrackerError> {
        validate_range(start, end, today)?;
        let symbol = Symbol::parse(symbol)?;
        let name = self
            .entries
            .iter()
            .find(|entry| entry.symbol == symbol)
            .and_then(|entry| entry.name.clone());

        let fetch_start = start
            .checked_sub(CUSTOM_RANGE_LEAD)
            .ok_or(AnalyticsError::InvalidRange {
                start,
                end,
                reason: "start date is out of range",
            })?;
        let entry = WatchlistEntry::new(symbol, name);
        let instrument = fetch_instrument(
            Arc::clone(&self.source),
            self.config.fetch,
            &entry,
            fetch_start,
            end,
        )
        .await?;
        let performance = custom_range_performance(&instrument, start, end, today)?;

        Ok(CustomRangeReport {
            symbol: entry.symbol,
            name: entry.name,
            requested_start: start,
            requested_end: end,
            performance,
        })
    }

    /// Chart of a tracked instrument's last 52 weeks.
    ///
    /// Uses the loaded history when there is one and otherwise fetches only
    /// `symbol`, so a provider failure surfaces as the source error.
    pub async fn chart(
        &self,
        symbol: &str,
        dimensions: ChartDimensions,
        today: Date,
    ) -> Result<String, TrackerError> {
        let dimensions = dimensions.validate()?;
        let not_tracked = || TrackerError::NotTracked {
            symbol: symbol.trim().to_ascii_uppercase(),
        };
        let symbol = Symbol::parse(symbol).map_err(|_| not_tracked())?;
        let entry = self
            .entries
            .iter()
            .find(|entry| entry.symbol == symbol)
            .ok_or_else(not_tracked)?;

        let fetched;
        let instrument = match self.instruments.iter().find(|i| *i == &symbol) {
            Some(instrument) => instrument,
            None => {
                let (start, end) = self.history_window(today)?;
                fetched = fetch_instrument(
                    Arc::clone(&self.source),
                    self.config.fetch,
                    entry,
                    start,
                    end,
                )
                .await?;
                &fetched
            }
        };
        Ok(render(
            instrument.series(),
            dimensions.height,
            dimensions.length,
        )?)
    }

    fn history_window(&self, today: Date) -> Result<(Date, Date), TrackerError> {
        let start = today
            .checked_sub(Duration::days(i64::from(self.config.history_days)))
            .ok_or(AnalyticsError::NoPriceAvailable { reference: today })?;
        Ok((start, today))
    }
}

/// Text form of already computed summaries, one block per entry.
pub fn render_report(entries: &[SummaryEntry]) -> String {
    let mut report = String::new();
    for entry in entries {
        let block = match &entry.outcome {
            Ok(summary) => render_summary(summary),
            Err(error) => format!("{} - error: {}", entry.symbol, error.message),
        };
        report.push('\n');
        report.push_str(&block);
        report.push('\n');
        report.push_str(REPORT_SEPARATOR);
    }
    report
}

async fn fetch_instrument(
    source: Arc<dyn HistorySource>,
    policy: FetchPolicy,
    entry: &WatchlistEntry,
    start: Date,
    end: Date,
) -> Result<Instrument, TrackerError> {
    let request = HistoryRequest::new(entry.symbol.clone(), start, end)?;
    debug!(symbol = %entry.symbol, %start, %end, "fetching history");

    let history = policy
        .run(|| {
            let source = Arc::clone(&source);
            let request = request.clone();
            async move { source.history(request).await }
        })
        .await?;

    if history.symbol != entry.symbol {
        return Err(SourceError::internal(format!(
            "provider returned {} for {}",
            history.symbol, entry.symbol
        ))
        .into());
    }
    Ok(Instrument::from_history(history, entry.name.clone())?)
}

fn analytics_code(error: &AnalyticsError) -> &'static str {
    match error {
        AnalyticsError::NoPriceAvailable { .. } => "analytics.no_price_available",
        AnalyticsError::InvalidRange { .. } => "analytics.invalid_range",
        AnalyticsError::InvalidDimensions { .. } => "analytics.invalid_dimensions",
        AnalyticsError::InsufficientData { .. } => "analytics.insufficient_data",
        AnalyticsError::InvalidComparison { .. } => "analytics.invalid_comparison",
    }
}

fn tracker_code(error: &TrackerError) -> &'static str {
    match error {
        TrackerError::Validation(_) => "validation",
        TrackerError::Analytics(error) => analytics_code(error),
        TrackerError::Source(error) => error.code(),
        TrackerError::Storage(_) => "storage",
        TrackerError::AlreadyTracked { .. } => "tracker.already_tracked",
        TrackerError::NotTracked { .. } => "tracker.not_tracked",
    }
}
