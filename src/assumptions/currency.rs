//! Exchange rates and conversion into the reporting currency
//!
//! Every monetary input carries a currency code. Conversion happens here
//! and nowhere else; a code without a rate is an error, never a rate of 1.

use chrono::NaiveDate;
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

use crate::error::{EngineError, LoadError};

/// Resolved mapping from currency code to reporting-currency factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExchangeRates {
    /// Currency all outputs are expressed in
    pub reporting: String,

    /// Units of reporting currency per one unit of the keyed currency
    #[serde(default)]
    pub rates: BTreeMap<String, f64>,

    /// Snapshot date of the rates, if known
    #[serde(default)]
    pub as_of: Option<NaiveDate>,
}

impl ExchangeRates {
    pub fn new(reporting: &str) -> Self {
        Self {
            reporting: normalize_code(reporting),
            rates: BTreeMap::new(),
            as_of: None,
        }
    }

    pub fn with_rate(mut self, currency: &str, rate: f64) -> Self {
        self.rates.insert(normalize_code(currency), rate);
        self
    }

    pub fn as_of(mut self, date: Option<NaiveDate>) -> Self {
        self.as_of = date;
        self
    }

    /// INR reporting with the January 2026 USD reference rate
    pub fn usd_inr_jan_2026() -> Self {
        Self::new("INR")
            .with_rate("USD", 90.95)
            .as_of(NaiveDate::from_ymd_opt(2026, 1, 1))
    }

    pub fn is_reporting(&self, currency: &str) -> bool {
        self.reporting.eq_ignore_ascii_case(currency.trim())
    }

    /// Factor into the reporting currency (1 for the reporting currency itself)
    pub fn rate(&self, currency: &str) -> Option<f64> {
        if self.is_reporting(currency) {
            return Some(1.0);
        }
        let code = currency.trim();
        self.rates
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(code))
            .map(|(_, r)| *r)
    }

    /// Convert an amount into the reporting currency.
    ///
    /// `context` names the input needing the rate and ends up in the error.
    pub fn convert(&self, amount: f64, currency: &str, context: &str) -> Result<f64, EngineError> {
        match self.rate(currency) {
            Some(rate) => Ok(amount * rate),
            None => Err(EngineError::MissingRate {
                currency: normalize_code(currency),
                context: context.to_string(),
            }),
        }
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.reporting.trim().is_empty() {
            return Err(EngineError::invalid("rates.reporting", "reporting currency is required"));
        }
        for (code, rate) in &self.rates {
            if !rate.is_finite() || *rate <= 0.0 {
                return Err(EngineError::invalid(
                    format!("rates.{code}"),
                    format!("rate must be finite and > 0, got {rate}"),
                ));
            }
            if self.is_reporting(code) && *rate != 1.0 {
                return Err(EngineError::invalid(
                    format!("rates.{code}"),
                    "reporting currency must convert at 1.0",
                ));
            }
        }
        Ok(())
    }
}

impl Default for ExchangeRates {
    fn default() -> Self {
        Self::usd_inr_jan_2026()
    }
}

pub fn normalize_code(code: &str) -> String {
    code.trim().to_ascii_uppercase()
}

/// Source of a resolved exchange-rate mapping
pub trait RateProvider {
    fn resolve(&self) -> Result<ExchangeRates, LoadError>;
}

/// Fixed snapshot supplied as configuration
#[derive(Debug, Clone)]
pub struct StaticRates(pub ExchangeRates);

impl RateProvider for StaticRates {
    fn resolve(&self) -> Result<ExchangeRates, LoadError> {
        self.0.validate()?;
        Ok(self.0.clone())
    }
}

/// Rates read from a `currency,rate` CSV file
#[derive(Debug, Clone)]
pub struct CsvRates {
    pub path: PathBuf,
    pub reporting: String,
}

impl CsvRates {
    pub fn new(path: impl Into<PathBuf>, reporting: &str) -> Self {
        Self {
            path: path.into(),
            reporting: reporting.to_string(),
        }
    }
}

impl RateProvider for CsvRates {
    fn resolve(&self) -> Result<ExchangeRates, LoadError> {
        super::loader::load_exchange_rates(&self.path, &self.reporting)
    }
}

/// Try `primary`; on any failure fall back to the last-known-good `fallback`
#[derive(Debug, Clone)]
pub struct FallbackRates<P, F> {
    pub primary: P,
    pub fallback: F,
}

impl<P: RateProvider, F: RateProvider> FallbackRates<P, F> {
    pub fn new(primary: P, fallback: F) -> Self {
        Self { primary, fallback }
    }
}

impl<P: RateProvider, F: RateProvider> RateProvider for FallbackRates<P, F> {
    fn resolve(&self) -> Result<ExchangeRates, LoadError> {
        match self.primary.resolve() {
            Ok(rates) => Ok(rates),
            Err(e) => {
                warn!("Primary exchange rate source failed ({}), using fallback rates", e);
                self.fallback.resolve()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_reporting_currency_converts_at_one() {
        let rates = ExchangeRates::new("INR");
        assert_eq!(rates.convert(1234.5, "INR", "test").unwrap(), 1234.5);
        assert_eq!(rates.convert(10.0, " inr ", "test").unwrap(), 10.0);
    }

    #[test]
    fn test_foreign_currency_conversion() {
        let rates = ExchangeRates::usd_inr_jan_2026();
        assert_relative_eq!(rates.convert(0.50, "USD", "price").unwrap(), 45.475, max_relative = 1e-12);
        assert_relative_eq!(rates.convert(588.50, "usd", "opening").unwrap(), 53_524.075, max_relative = 1e-12);
    }

    #[test]
    fn test_missing_rate_is_error() {
        let rates = ExchangeRates::usd_inr_jan_2026();
        let err = rates.convert(100.0, "EUR", "Audit").unwrap_err();
        assert_eq!(
            err,
            EngineError::MissingRate {
                currency: "EUR".to_string(),
                context: "Audit".to_string(),
            }
        );
    }

    #[test]
    fn test_validate_rejects_bad_rates() {
        assert!(ExchangeRates::new("INR").with_rate("USD", 0.0).validate().is_err());
        assert!(ExchangeRates::new("INR").with_rate("USD", f64::NAN).validate().is_err());
        assert!(ExchangeRates::new("INR").with_rate("INR", 2.0).validate().is_err());
        assert!(ExchangeRates::new("INR").with_rate("INR", 1.0).validate().is_ok());
    }

    #[test]
    fn test_fallback_used_when_primary_fails() {
        let provider = FallbackRates::new(
            CsvRates::new("does/not/exist.csv", "INR"),
            StaticRates(ExchangeRates::usd_inr_jan_2026()),
        );
        let rates = provider.resolve().unwrap();
        assert_eq!(rates.rate("USD"), Some(90.95));
    }

    #[test]
    fn test_fallback_not_used_when_primary_succeeds() {
        let provider = FallbackRates::new(
            StaticRates(ExchangeRates::new("INR").with_rate("USD", 88.0)),
            StaticRates(ExchangeRates::usd_inr_jan_2026()),
        );
        assert_eq!(provider.resolve().unwrap().rate("USD"), Some(88.0));
    }
}
