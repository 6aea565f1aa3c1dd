use std::any::{type_name, Any};
use std::fmt::{Display, Formatter};

use serde::Serialize;

use crate::{AnalyticsError, PriceSeries, Symbol, ValidationError};

/// Normalized provider payload for one symbol over a date range.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub currency: String,
    pub instrument_type: String,
    pub series: PriceSeries,
}

/// A tracked instrument: identity, display label and its price history.
#[derive(Debug, Clone, Serialize)]
pub struct Instrument {
    symbol: Symbol,
    currency: String,
    instrument_type: String,
    name: Option<String>,
    series: PriceSeries,
}

impl Instrument {
    pub fn new(
        symbol: Symbol,
        currency: impl AsRef<str>,
        instrument_type: impl AsRef<str>,
        name: Option<String>,
        series: PriceSeries,
    ) -> Result<Self, ValidationError> {
        Ok(Self {
            symbol,
            currency: validate_currency_code(currency.as_ref())?,
            instrument_type: normalize_instrument_type(instrument_type.as_ref())?,
            name: name
                .map(|value| value.trim().to_owned())
                .filter(|value| !value.is_empty()),
            series,
        })
    }

    /// Build from raw provider fields: unnormalized codes and `YYYY-MM-DD` date strings.
    pub fn from_raw<S>(
        symbol: &str,
        currency: &str,
        instrument_type: &str,
        rows: &[(S, Option<f64>)],
        name: Option<String>,
    ) -> Result<Self, ValidationError>
    where
        S: AsRef<str>,
    {
        Self::new(
            Symbol::parse(symbol)?,
            currency,
            instrument_type,
            name,
            PriceSeries::from_raw(rows)?,
        )
    }

    pub fn from_history(history: PriceHistory, name: Option<String>) -> Result<Self, ValidationError> {
        Self::new(
            history.symbol,
            history.currency,
            history.instrument_type,
            name,
            history.series,
        )
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn currency(&self) -> &str {
        &self.currency
    }

    pub fn instrument_type(&self) -> &str {
        &self.instrument_type
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn series(&self) -> &PriceSeries {
        &self.series
    }

    /// Compare against a value of unknown type.
    ///
    /// Accepts another `Instrument`, a `Symbol`, a `String` or a `&str`; any
    /// other type is rejected with [`AnalyticsError::InvalidComparison`].
    pub fn matches<T: Any>(&self, other: &T) -> Result<bool, AnalyticsError> {
        let other: &dyn Any = other;
        if let Some(instrument) = other.downcast_ref::<Instrument>() {
            return Ok(self == instrument);
        }
        if let Some(symbol) = other.downcast_ref::<Symbol>() {
            return Ok(self == symbol);
        }
        if let Some(text) = other.downcast_ref::<String>() {
            return Ok(self == text.as_str());
        }
        if let Some(text) = other.downcast_ref::<&str>() {
            return Ok(self == *text);
        }
        Err(AnalyticsError::InvalidComparison {
            type_name: type_name::<T>(),
        })
    }
}

impl PartialEq for Instrument {
    fn eq(&self, other: &Self) -> bool {
        self.symbol == other.symbol
    }
}

impl Eq for Instrument {}

impl PartialEq<Symbol> for Instrument {
    fn eq(&self, other: &Symbol) -> bool {
        &self.symbol == other
    }
}

impl PartialEq<str> for Instrument {
    fn eq(&self, other: &str) -> bool {
        self.symbol == other
    }
}

impl PartialEq<&str> for Instrument {
    fn eq(&self, other: &&str) -> bool {
        self.symbol == *other
    }
}

impl Display for Instrument {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.symbol, f)
    }
}

/// Validate and normalize currency to uppercase 3-letter code.
pub fn validate_currency_code(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    let is_valid = normalized.len() == 3 && normalized.chars().all(|ch| ch.is_ascii_alphabetic());

    if !is_valid {
        return Err(ValidationError::InvalidCurrency {
            value: input.to_owned(),
        });
    }

    Ok(normalized)
}

/// Normalize a provider category tag such as `mutualfund` to `MUTUALFUND`.
pub fn normalize_instrument_type(input: &str) -> Result<String, ValidationError> {
    let normalized = input.trim().to_ascii_uppercase();
    if normalized.is_empty() {
        return Err(ValidationError::EmptyInstrumentType);
    }
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fund(symbol: &str) -> Instrument {
        Instrument::from_raw(
            symbol,
            "usd",
            "mutualfund",
            &[("2021-03-09", Some(166.03)), ("2021-03-10", Some(164.03))],
            Some(String::from("  Index fund ")),
        )
        .expect("valid instrument")
    }

    #[test]
    fn normalizes_codes_and_name_at_construction() {
        let instrument = fund("fxaix");
        assert_eq!(instrument.symbol().as_str(), "FXAIX");
        assert_eq!(instrument.currency(), "USD");
        assert_eq!(instrument.instrument_type(), "MUTUALFUND");
        assert_eq!(instrument.name(), Some("Index fund"));
        assert_eq!(instrument.series().len(), 2);
    }

    #[test]
    fn blank_name_becomes_none() {
        let instrument = Instrument::from_raw(
            "F",
            "USD",
            "EQUITY",
            &[("2021-03-09", Some(12.0))],
            Some(String::from("   ")),
        )
        .expect("valid instrument");
        assert_eq!(instrument.name(), None);
    }

    #[test]
    fn validates_currency() {
        assert_eq!(validate_currency_code("usd").expect("must normalize"), "USD");
        assert!(matches!(
            validate_currency_code("USDT"),
            Err(ValidationError::InvalidCurrency { .. })
        ));
    }

    #[test]
    fn equality_uses_symbol_only() {
        let first = fund("FXAIX");
        let second = Instrument::from_raw(
            "fxaix",
            "USD",
            "ETF",
            &[("2020-01-01", Some(1.0))],
            None,
        )
        .expect("valid instrument");

        assert_eq!(first, second);
        assert!(first == "FXAIX");
        assert!(first != "fxaix");
        assert!(first == Symbol::parse("fxaix").expect("symbol"));
    }

    #[test]
    fn dynamic_comparison_accepts_closed_set() {
        let instrument = fund("FXAIX");
        let symbol_text = String::from("FXAIX");
        let other = fund("FBGRX");

        assert_eq!(instrument.matches(&symbol_text), Ok(true));
        assert_eq!(instrument.matches(&"FBGRX"), Ok(false));
        assert_eq!(instrument.matches(&other), Ok(false));
        assert_eq!(
            instrument.matches(&Symbol::parse("FXAIX").expect("symbol")),
            Ok(true)
        );
    }

    #[test]
    fn dynamic_comparison_rejects_other_types() {
        let instrument = fund("FXAIX");
        let err = instrument.matches(&42_u32).expect_err("must fail");
        assert!(matches!(err, AnalyticsError::InvalidComparison { .. }));
    }
}
