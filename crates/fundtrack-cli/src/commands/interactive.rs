//! Prompt-driven shell over the watchlist.
//!
//! Selections are read one per line. `add` and `delete` prompt for their
//! arguments on the following lines. End of input behaves like `quit`.

use std::io::{BufRead, Write};

use fundtrack_core::{FundTracker, SummaryOptions, TrackerError};
use time::Date;
use tracing::debug;

use crate::error::CliError;

const WELCOME: &str = "Welcome to Fund Tracker.\n\
Application is being run in interactive mode. Enter 'menu' for a list of options, \
or 'quit' to exit.";

const MENU: [(&str, &str); 5] = [
    ("add", "Add a new fund."),
    ("delete", "Delete a fund."),
    ("show all", "Show all funds."),
    ("save", "Save."),
    ("quit", "Quit."),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Selection {
    Add,
    Delete,
    Menu,
    Quit,
    Save,
    ShowAll,
}

impl Selection {
    fn parse(input: &str) -> Option<Self> {
        match input.trim().to_ascii_lowercase().as_str() {
            "add" => Some(Self::Add),
            "delete" => Some(Self::Delete),
            "menu" => Some(Self::Menu),
            "quit" | "exit" => Some(Self::Quit),
            "save" => Some(Self::Save),
            "show all" => Some(Self::ShowAll),
            _ => None,
        }
    }
}

pub async fn run<R: BufRead, W: Write>(
    tracker: &mut FundTracker,
    today: Date,
    mut input: R,
    mut output: W,
) -> Result<(), CliError> {
    writeln!(output, "{WELCOME}")?;
    let report = tracker.refresh(today).await?;
    for failure in &report.failed {
        writeln!(output, "Unable to load {}: {}", failure.symbol, failure.message)?;
    }

    loop {
        let Some(line) = prompt(&mut input, &mut output, "\nEnter your selection: ")? else {
            break;
        };
        debug!(selection = %line, "interactive input");

        match Selection::parse(&line) {
            Some(Selection::Add) => add(tracker, today, &mut input, &mut output).await?,
            Some(Selection::Delete) => delete(tracker, &mut input, &mut output)?,
            Some(Selection::Menu) => writeln!(output, "{}", menu())?,
            Some(Selection::Quit) => break,
            Some(Selection::Save) => match tracker.save() {
                Ok(()) => writeln!(output, "Data saved.")?,
                Err(error) => writeln!(output, "Unable to save: {error}")?,
            },
            Some(Selection::ShowAll) => {
                writeln!(output, "{}", tracker.summary_report(&SummaryOptions::default()))?
            }
            None => writeln!(output, "Invalid input.")?,
        }
    }

    writeln!(output)?;
    output.flush()?;
    Ok(())
}

async fn add<R: BufRead, W: Write>(
    tracker: &mut FundTracker,
    today: Date,
    input: &mut R,
    output: &mut W,
) -> Result<(), CliError> {
    let Some(symbol) = prompt(input, output, "Enter the fund symbol: ")? else {
        return Ok(());
    };
    let Some(name) = prompt(input, output, "Optional - Enter a custom name for fund: ")? else {
        return Ok(());
    };
    let symbol = symbol.to_ascii_uppercase();

    match tracker.add(&symbol, Some(name), today).await {
        Ok(instrument) => writeln!(output, "{} has been added.", instrument.symbol())?,
        Err(TrackerError::AlreadyTracked { symbol }) => {
            writeln!(output, "Cannot add {symbol}, as it has already been added.")?
        }
        Err(error) => writeln!(output, "Unable to add {symbol}: {error}")?,
    }
    Ok(())
}

fn delete<R: BufRead, W: Write>(
    tracker: &mut FundTracker,
    input: &mut R,
    output: &mut W,
) -> Result<(), CliError> {
    let Some(symbol) = prompt(input, output, "Enter the symbol of fund to delete: ")? else {
        return Ok(());
    };

    match tracker.delete(&symbol) {
        Ok(removed) => writeln!(output, "Fund {} has been deleted.", removed.symbol)?,
        Err(_) => writeln!(
            output,
            "Cannot delete Fund {}, cannot be found.",
            symbol.to_ascii_uppercase()
        )?,
    }
    Ok(())
}

fn menu() -> String {
    let mut text = String::from("Optional inputs:");
    for (selection, description) in MENU {
        text.push_str(&format!("\n    {selection:<20} {description}"));
    }
    text
}

/// Print `message` and read one trimmed line; `None` at end of input.
fn prompt<R: BufRead, W: Write>(
    input: &mut R,
    output: &mut W,
    message: &str,
) -> std::io::Result<Option<String>> {
    write!(output, "{message}")?;
    output.flush()?;

    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}
