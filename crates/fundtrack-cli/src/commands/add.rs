use fundtrack_core::{render_summary, summarize, FundTracker, SummaryOptions};
use time::Date;

use crate::cli::AddArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

/// Fetch the symbol, track it, then persist the watchlist.
pub async fn run(
    tracker: &mut FundTracker,
    args: &AddArgs,
    today: Date,
) -> Result<CommandOutput, CliError> {
    let instrument = tracker.add(&args.symbol, args.name.clone(), today).await?;
    tracker.save()?;

    let summary = summarize(&instrument, &SummaryOptions::default())?;
    let text = format!(
        "{} has been added.\n\n{}",
        instrument.symbol(),
        render_summary(&summary)
    );
    CommandOutput::new(text, &summary)
}
