mod add;
mod chart;
mod custom;
mod delete;
mod interactive;
mod list;
mod show;

use std::io;
use std::sync::Arc;

use fundtrack_core::{
    today_utc, FundTracker, HistorySource, RefreshReport, TrackerConfig, YahooAdapter,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::output;

pub async fn run(cli: &Cli) -> Result<(), CliError> {
    let mut tracker = FundTracker::open(tracker_config(cli)?, history_source(cli.mock))?;
    let today = today_utc();

    let result = match &cli.command {
        Command::Show(args) => show::run(&mut tracker, args, today).await?,
        Command::Add(args) => add::run(&mut tracker, args, today).await?,
        Command::Delete(args) => delete::run(&mut tracker, args)?,
        Command::List => list::run(&tracker)?,
        Command::Custom(args) => custom::run(&tracker, args, today).await?,
        Command::Chart(args) => chart::run(&tracker, args, today).await?,
        Command::Interactive => {
            let stdin = io::stdin();
            return interactive::run(&mut tracker, today, stdin.lock(), io::stdout()).await;
        }
    };

    output::render(
        &result,
        cli.format,
        &mut io::stdout().lock(),
        &mut io::stderr().lock(),
    )
}

/// Environment configuration with command-line overrides applied on top.
fn tracker_config(cli: &Cli) -> Result<TrackerConfig, CliError> {
    let mut config = TrackerConfig::from_env()?;
    if let Some(path) = &cli.data_file {
        config = config.with_data_file(path.clone());
    }
    if let Some(timeout_ms) = cli.timeout_ms {
        config = config.with_timeout_ms(timeout_ms)?;
    }
    if let Some(retries) = cli.retries {
        config = config.with_max_retries(retries);
    }
    Ok(config)
}

fn history_source(mock: bool) -> Arc<dyn HistorySource> {
    if mock {
        Arc::new(YahooAdapter::default())
    } else {
        Arc::new(YahooAdapter::live())
    }
}

fn refresh_warnings(report: &RefreshReport) -> Vec<String> {
    report
        .failed
        .iter()
        .map(|failure| format!("{}: {} ({})", failure.symbol, failure.message, failure.code))
        .collect()
}
