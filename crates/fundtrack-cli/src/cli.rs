//! Command-line arguments for `fundtrack`.
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--data-file` | `data.csv` | Watchlist CSV file |
//! | `--timeout-ms` | `3000` | Per-attempt fetch timeout |
//! | `--retries` | `2` | Retries after a failed fetch |
//! | `--mock` | `false` | Offline deterministic prices |
//! | `--format` | `text` | Output format (text, json) |
//! | `-v` | | Raise log verbosity, repeatable |
//!
//! Environment variables `FUNDTRACK_*` set the defaults; flags override them.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use fundtrack_core::{parse_date, ChartDimensions, SummaryOptions};
use time::Date;

#[derive(Debug, Parser)]
#[command(
    name = "fundtrack",
    author,
    version,
    about = "Track the price performance of mutual funds, ETFs and stocks"
)]
pub struct Cli {
    /// Watchlist CSV file.
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// Per-attempt fetch timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Retries after a failed fetch.
    #[arg(long, global = true)]
    pub retries: Option<u32>,

    /// Use deterministic offline prices instead of Yahoo Finance.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human readable report.
    Text,
    /// Pretty-printed JSON document.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show performance of every tracked instrument.
    Show(ShowArgs),
    /// Start tracking a symbol and save the watchlist.
    Add(AddArgs),
    /// Stop tracking a symbol and save the watchlist.
    Delete(DeleteArgs),
    /// List tracked symbols without fetching prices.
    List,
    /// Performance of a symbol between two dates.
    Custom(CustomArgs),
    /// Draw an ASCII chart of a tracked symbol.
    Chart(ChartArgs),
    /// Line-oriented shell over the watchlist.
    Interactive,
}

#[derive(Debug, Args)]
pub struct ShowArgs {
    /// Omit the previous 24 hours.
    #[arg(long)]
    pub no_day: bool,
    /// Omit the previous week.
    #[arg(long)]
    pub no_week: bool,
    /// Omit the previous year.
    #[arg(long)]
    pub no_year: bool,
    /// Append a chart to each instrument.
    #[arg(long)]
    pub chart: bool,
    #[command(flatten)]
    pub dimensions: DimensionArgs,
}

impl ShowArgs {
    pub fn options(&self) -> SummaryOptions {
        SummaryOptions {
            day: !self.no_day,
            week: !self.no_week,
            year: !self.no_year,
            chart: self.chart.then(|| self.dimensions.dimensions()),
        }
    }
}

#[derive(Debug, Args)]
pub struct AddArgs {
    pub symbol: String,
    /// Display name stored with the symbol.
    pub name: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeleteArgs {
    pub symbol: String,
}

#[derive(Debug, Args)]
pub struct CustomArgs {
    pub symbol: String,
    /// Range start (YYYY-MM-DD).
    #[arg(value_parser = parse_date)]
    pub start: Date,
    /// Range end (YYYY-MM-DD), no later than today.
    #[arg(value_parser = parse_date)]
    pub end: Date,
}

#[derive(Debug, Args)]
pub struct ChartArgs {
    pub symbol: String,
    #[command(flatten)]
    pub dimensions: DimensionArgs,
}

#[derive(Debug, Clone, Copy, Args)]
pub struct DimensionArgs {
    /// Chart rows.
    #[arg(long, default_value_t = 10)]
    pub height: usize,
    /// Chart columns.
    #[arg(long, default_value_t = 52)]
    pub length: usize,
}

impl DimensionArgs {
    pub fn dimensions(self) -> ChartDimensions {
        ChartDimensions::new(self.height, self.length)
    }
}
