use fundtrack_core::{format_date, format_signed_percent, FundTracker};
use time::Date;

use crate::cli::CustomArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

pub async fn run(
    tracker: &FundTracker,
    args: &CustomArgs,
    today: Date,
) -> Result<CommandOutput, CliError> {
    let report = tracker
        .custom_range(&args.symbol, args.start, args.end, today)
        .await?;
    let performance = report.performance;

    let mut lines = vec![
        format!("{} - {}", report.symbol, report.name.as_deref().unwrap_or("")),
        format!(
            "Custom range: {} to {}",
            format_date(performance.start),
            format_date(performance.end)
        ),
    ];
    if (performance.start, performance.end) != (report.requested_start, report.requested_end) {
        lines.push(format!(
            "Requested: {} to {}",
            format_date(report.requested_start),
            format_date(report.requested_end)
        ));
    }
    lines.push(format!(
        "Change: {}%",
        format_signed_percent(performance.percent)
    ));

    CommandOutput::new(lines.join("\n"), &report)
}
