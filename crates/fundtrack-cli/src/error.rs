use fundtrack_core::{AnalyticsError, SourceError, StorageError, TrackerError, ValidationError};
use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Analytics(#[from] AnalyticsError),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("command error: {0}")]
    Command(String),

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<TrackerError> for CliError {
    fn from(error: TrackerError) -> Self {
        match error {
            TrackerError::Validation(error) => Self::Validation(error),
            TrackerError::Analytics(error) => Self::Analytics(error),
            TrackerError::Source(error) => Self::Source(error),
            TrackerError::Storage(error) => Self::Storage(error),
            other @ (TrackerError::AlreadyTracked { .. } | TrackerError::NotTracked { .. }) => {
                Self::Command(other.to_string())
            }
        }
    }
}

impl CliError {
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Command(_) => 2,
            Self::Analytics(_) => 3,
            Self::Source(_) => 4,
            Self::Serialization(_) => 4,
            Self::Storage(_) => 10,
            Self::Io(_) => 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn tracker_errors_keep_their_category() {
        let analytics: CliError = TrackerError::from(AnalyticsError::NoPriceAvailable {
            reference: date!(2024 - 01 - 01),
        })
        .into();
        assert_eq!(analytics.exit_code(), 3);

        let source: CliError = TrackerError::from(SourceError::not_found("gone")).into();
        assert_eq!(source.exit_code(), 4);

        let validation: CliError = TrackerError::from(ValidationError::EmptySymbol).into();
        assert_eq!(validation.exit_code(), 2);
    }

    #[test]
    fn watchlist_conflicts_are_command_errors() {
        let error: CliError = TrackerError::NotTracked {
            symbol: String::from("VTSAX"),
        }
        .into();
        assert_eq!(error.exit_code(), 2);
        assert!(error.to_string().contains("VTSAX"));
    }
}
