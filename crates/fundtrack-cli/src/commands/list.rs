use fundtrack_core::FundTracker;

use crate::error::CliError;
use crate::output::CommandOutput;

pub fn run(tracker: &FundTracker) -> Result<CommandOutput, CliError> {
    let entries = tracker.entries();
    let text = if entries.is_empty() {
        format!("watchlist {} is empty", tracker.config().data_file.display())
    } else {
        entries
            .iter()
            .map(|entry| match &entry.name {
                Some(name) => format!("{} - {name}", entry.symbol),
                None => entry.symbol.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n")
    };
    CommandOutput::new(text, &entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::tracker;

    #[test]
    fn lists_entries_without_fetching() {
        let dir = tempfile::tempdir().expect("tempdir");
        let tracker = tracker(&dir, "symbol,name\nFXAIX,Index\nFBGRX,\n");

        let output = run(&tracker).expect("list");

        assert_eq!(output.text, "FXAIX - Index\nFBGRX");
        assert_eq!(
            output.data,
            serde_json::json!([
                { "symbol": "FXAIX", "name": "Index" },
                { "symbol": "FBGRX", "name": null }
            ])
        );
        assert!(tracker.instruments().is_empty());
    }
}
