use fundtrack_core::FundTracker;
use serde::Serialize;
use time::Date;

use crate::cli::ChartArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

#[derive(Debug, Serialize)]
struct ChartData<'a> {
    symbol: &'a str,
    height: usize,
    length: usize,
    chart: &'a str,
}

pub async fn run(
    tracker: &FundTracker,
    args: &ChartArgs,
    today: Date,
) -> Result<CommandOutput, CliError> {
    let dimensions = args.dimensions.dimensions().validate()?;
    let chart = tracker.chart(&args.symbol, dimensions, today).await?;

    let symbol = args.symbol.trim().to_ascii_uppercase();
    let data = ChartData {
        symbol: &symbol,
        height: dimensions.height,
        length: dimensions.length,
        chart: &chart,
    };
    CommandOutput::new(chart.clone(), &data)
}
