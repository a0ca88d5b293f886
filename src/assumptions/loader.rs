//! CSV-based fee schedule and exchange rate loader
//!
//! Loads assumptions from CSV files in data/assumptions/

use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use super::currency::{normalize_code, ExchangeRates};
use super::fees::{FeeBasis, FeeItem, FeeSchedule, FeeTiming, ThresholdRule};
use crate::error::LoadError;

/// Default path to assumptions directory
pub const DEFAULT_ASSUMPTIONS_PATH: &str = "data/assumptions";

/// Reporting currency assumed for rate files without an explicit one
pub const DEFAULT_REPORTING_CURRENCY: &str = "INR";

/// Raw CSV row matching fee_schedule.csv columns
#[derive(Debug, Deserialize)]
struct FeeRow {
    name: String,
    basis: String,
    amount: f64,
    #[serde(default)]
    currency: String,
    timing: String,
    amortization_years: Option<u32>,
    tax_multiplier: Option<f64>,
    threshold_cutoff_mw: Option<f64>,
    threshold_above_amount: Option<f64>,
}

impl FeeRow {
    fn to_fee(self, row: usize) -> Result<FeeItem, LoadError> {
        let threshold = match (self.threshold_cutoff_mw, self.threshold_above_amount) {
            (Some(cutoff_mw), Some(above_amount)) => Some(ThresholdRule { cutoff_mw, above_amount }),
            (None, None) => None,
            _ => {
                return Err(LoadError::Parse {
                    row,
                    reason: "threshold needs both cutoff and above amount".to_string(),
                })
            }
        };

        let basis = match self.basis.trim() {
            "fixed" => FeeBasis::Fixed { amount: self.amount, threshold },
            "per_unit" => FeeBasis::PerUnit { amount: self.amount },
            "percentage_of_net" => FeeBasis::PercentageOfNet { percent: self.amount },
            other => {
                return Err(LoadError::Parse {
                    row,
                    reason: format!("Unknown fee basis: {}", other),
                })
            }
        };

        let timing = match (self.timing.trim(), self.amortization_years) {
            ("one_time", _) => FeeTiming::OneTime,
            ("recurring", _) => FeeTiming::Recurring,
            ("amortized", Some(years)) => FeeTiming::Amortized { years },
            ("amortized", None) => {
                return Err(LoadError::Parse {
                    row,
                    reason: "amortized fee needs amortization_years".to_string(),
                })
            }
            (other, _) => {
                return Err(LoadError::Parse {
                    row,
                    reason: format!("Unknown fee timing: {}", other),
                })
            }
        };

        let item = FeeItem {
            name: self.name,
            basis,
            currency: normalize_code(&self.currency),
            timing,
            tax_multiplier: self.tax_multiplier.unwrap_or(1.0),
        };
        item.validate()?;
        Ok(item)
    }
}

/// Raw CSV row matching exchange_rates.csv columns
#[derive(Debug, Deserialize)]
struct RateRow {
    currency: String,
    rate: f64,
}

/// Load a fee schedule from a CSV file
pub fn load_fee_schedule<P: AsRef<Path>>(path: P) -> Result<FeeSchedule, LoadError> {
    let file = File::open(path)?;
    load_fee_schedule_from_reader(file)
}

/// Load a fee schedule from any reader (e.g., string buffer, request body)
pub fn load_fee_schedule_from_reader<R: Read>(reader: R) -> Result<FeeSchedule, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut items = Vec::new();

    for (idx, result) in csv_reader.deserialize().enumerate() {
        let row: FeeRow = result?;
        // Header is line 1
        items.push(row.to_fee(idx + 2)?);
    }

    Ok(FeeSchedule::new(items))
}

/// Load exchange rates from a `currency,rate` CSV file
pub fn load_exchange_rates<P: AsRef<Path>>(path: P, reporting: &str) -> Result<ExchangeRates, LoadError> {
    let file = File::open(path)?;
    load_exchange_rates_from_reader(file, reporting)
}

pub fn load_exchange_rates_from_reader<R: Read>(reader: R, reporting: &str) -> Result<ExchangeRates, LoadError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let mut rates = ExchangeRates::new(reporting);

    for result in csv_reader.deserialize() {
        let row: RateRow = result?;
        rates = rates.with_rate(&row.currency, row.rate);
    }

    rates.validate()?;
    Ok(rates)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;

    const FEES: &str = "\
name,basis,amount,currency,timing,amortization_years,tax_multiplier,threshold_cutoff_mw,threshold_above_amount
Registration,fixed,44500,INR,amortized,5,,3,89000
Issuance,per_unit,2.6,inr,recurring,,1.18,,
Consultant,percentage_of_net,17,,recurring,,,,
Opening,fixed,588.5,USD,one_time,,,,
";

    #[test]
    fn test_parse_fee_schedule() {
        let schedule = load_fee_schedule_from_reader(FEES.as_bytes()).unwrap();
        assert_eq!(schedule.len(), 4);

        let reg = &schedule.items[0];
        assert_eq!(reg.timing, FeeTiming::Amortized { years: 5 });
        assert_eq!(
            reg.basis,
            FeeBasis::Fixed {
                amount: 44_500.0,
                threshold: Some(ThresholdRule { cutoff_mw: 3.0, above_amount: 89_000.0 }),
            }
        );

        assert_eq!(schedule.items[1].currency, "INR");
        assert_eq!(schedule.items[1].tax_multiplier, 1.18);
        assert!(schedule.items[2].is_percentage());
        assert_eq!(schedule.items[3].timing, FeeTiming::OneTime);
    }

    #[test]
    fn test_unknown_basis_reports_row() {
        let csv = "\
name,basis,amount,currency,timing,amortization_years,tax_multiplier,threshold_cutoff_mw,threshold_above_amount
Audit,fixed,100,INR,recurring,,,,
Odd,per_mw,3,INR,recurring,,,,
";
        match load_fee_schedule_from_reader(csv.as_bytes()) {
            Err(LoadError::Parse { row, .. }) => assert_eq!(row, 3),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_fee_surfaces_engine_error() {
        let csv = "\
name,basis,amount,currency,timing,amortization_years,tax_multiplier,threshold_cutoff_mw,threshold_above_amount
Neg,fixed,-5,INR,recurring,,,,
";
        assert!(matches!(
            load_fee_schedule_from_reader(csv.as_bytes()),
            Err(LoadError::Engine(EngineError::InvalidConfiguration { .. }))
        ));
    }

    #[test]
    fn test_parse_exchange_rates() {
        let csv = "currency,rate\nINR,1.0\nusd,90.95\n";
        let rates = load_exchange_rates_from_reader(csv.as_bytes(), "INR").unwrap();
        assert_eq!(rates.reporting, "INR");
        assert_eq!(rates.rate("USD"), Some(90.95));
    }

    #[test]
    fn test_load_default_assumption_files() {
        let path = Path::new(DEFAULT_ASSUMPTIONS_PATH);
        let schedule = load_fee_schedule(path.join("fee_schedule.csv"));
        assert!(schedule.is_ok(), "Failed to load fee schedule: {:?}", schedule.err());
        assert_eq!(schedule.unwrap(), FeeSchedule::icx_2026_v1());

        let rates = load_exchange_rates(path.join("exchange_rates.csv"), DEFAULT_REPORTING_CURRENCY).unwrap();
        assert_eq!(rates.rate("USD"), Some(90.95));
    }
}
