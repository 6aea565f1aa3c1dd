use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// Canonical identifiers of the history providers the tracker can pull from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Yahoo,
}

impl ProviderId {
    pub const ALL: [Self; 1] = [Self::Yahoo];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Yahoo => "yahoo",
        }
    }
}

impl Display for ProviderId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yahoo" | "yahoofinance" => Ok(Self::Yahoo),
            other => Err(ValidationError::InvalidSource {
                value: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_name_and_alias() {
        assert_eq!("Yahoo".parse::<ProviderId>(), Ok(ProviderId::Yahoo));
        assert_eq!("yahoofinance".parse::<ProviderId>(), Ok(ProviderId::Yahoo));
    }

    #[test]
    fn rejects_unknown_provider() {
        let err = "morningstar".parse::<ProviderId>().expect_err("must fail");
        assert_eq!(
            err,
            ValidationError::InvalidSource {
                value: String::from("morningstar")
            }
        );
    }
}
