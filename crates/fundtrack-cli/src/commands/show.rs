use fundtrack_core::{render_report, FundTracker, PerformanceSummary, Symbol, TrackerErrorMessage};
use serde::Serialize;
use time::Date;

use crate::cli::ShowArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

use super::refresh_warnings;

#[derive(Debug, Serialize)]
struct ShowItem {
    symbol: Symbol,
    #[serde(skip_serializing_if = "Option::is_none")]
    summary: Option<PerformanceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<TrackerErrorMessage>,
}

pub async fn run(
    tracker: &mut FundTracker,
    args: &ShowArgs,
    today: Date,
) -> Result<CommandOutput, CliError> {
    let report = tracker.refresh(today).await?;
    let entries = tracker.summaries(&args.options());

    let text = if entries.is_empty() {
        format!("watchlist {} is empty", tracker.config().data_file.display())
    } else {
        render_report(&entries)
    };
    let items = entries
        .into_iter()
        .map(|entry| {
            let (summary, error) = match entry.outcome {
                Ok(summary) => (Some(summary), None),
                Err(error) => (None, Some(error)),
            };
            ShowItem {
                symbol: entry.symbol,
                summary,
                error,
            }
        })
        .collect::<Vec<_>>();

    Ok(CommandOutput::new(text, &items)?.with_warnings(refresh_warnings(&report)))
}
