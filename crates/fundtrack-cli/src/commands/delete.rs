use fundtrack_core::FundTracker;

use crate::cli::DeleteArgs;
use crate::error::CliError;
use crate::output::CommandOutput;

pub fn run(tracker: &mut FundTracker, args: &DeleteArgs) -> Result<CommandOutput, CliError> {
    let removed = tracker.delete(&args.symbol)?;
    tracker.save()?;
    CommandOutput::new(format!("Fund {} has been deleted.", removed.symbol), &removed)
}
