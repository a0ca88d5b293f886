//! Cashflow output structures for projections

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::project::Technology;

/// A named fee amount in reporting currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeLine {
    pub name: String,
    pub amount: f64,
}

impl FeeLine {
    pub fn new(name: &str, amount: f64) -> Self {
        Self {
            name: name.to_string(),
            amount,
        }
    }
}

/// A per-certificate figure, undefined when no certificates were issued.
///
/// Serializes as a number, or `null` when undefined.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitMetric {
    Available(f64),
    Undefined,
}

impl UnitMetric {
    pub fn per_unit(amount: f64, units: f64) -> Self {
        if units > 0.0 {
            UnitMetric::Available(amount / units)
        } else {
            UnitMetric::Undefined
        }
    }

    pub fn value(&self, metric: &str) -> Result<f64, EngineError> {
        match *self {
            UnitMetric::Available(v) => Ok(v),
            UnitMetric::Undefined => Err(EngineError::UndefinedMetric {
                metric: metric.to_string(),
            }),
        }
    }

    pub fn as_option(&self) -> Option<f64> {
        match *self {
            UnitMetric::Available(v) => Some(v),
            UnitMetric::Undefined => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, UnitMetric::Available(_))
    }
}

/// Revenue from one technology's certificates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TechnologyRevenue {
    pub technology: Technology,
    pub units: f64,
    pub price: f64,
    pub revenue: f64,
}

/// A single row of projection output for one year of one scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearResult {
    pub scenario: String,
    pub year: u32,

    /// Scenario base price per certificate (reporting currency)
    pub price: f64,
    pub units: f64,

    pub revenue_by_technology: Vec<TechnologyRevenue>,
    pub gross_revenue: f64,

    /// Registry and issuer fees due this year
    pub fees: Vec<FeeLine>,
    pub total_cost: f64,
    pub net_pre_fee: f64,

    /// Percentage-of-net fees, including the consultancy success fee
    pub success_fees: Vec<FeeLine>,
    pub success_fee: f64,

    pub total_expenses: f64,
    pub net_profit: f64,
    pub cumulative_net_profit: f64,

    /// Total expenses per certificate
    pub cost_per_unit: UnitMetric,
}

impl YearResult {
    /// Create a new year row with default values
    pub fn new(scenario: &str, year: u32) -> Self {
        Self {
            scenario: scenario.to_string(),
            year,
            price: 0.0,
            units: 0.0,
            revenue_by_technology: Vec::new(),
            gross_revenue: 0.0,
            fees: Vec::new(),
            total_cost: 0.0,
            net_pre_fee: 0.0,
            success_fees: Vec::new(),
            success_fee: 0.0,
            total_expenses: 0.0,
            net_profit: 0.0,
            cumulative_net_profit: 0.0,
            cost_per_unit: UnitMetric::Undefined,
        }
    }

    /// Amount of a named fee charged this year, either pass
    pub fn fee_amount(&self, name: &str) -> Option<f64> {
        self.fees
            .iter()
            .chain(self.success_fees.iter())
            .find(|l| l.name == name)
            .map(|l| l.amount)
    }
}

/// Per-certificate breakdown over a whole horizon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostPerUnit {
    /// Every fee, operating then success, in first-charged order
    pub fees: Vec<(String, UnitMetric)>,
    pub total_cost: UnitMetric,
    pub success_fee: UnitMetric,
    pub total_expenses: UnitMetric,
    pub net_profit: UnitMetric,
}

/// Complete projection result for one price scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregateResult {
    pub scenario: String,
    pub price: f64,

    /// Yearly rows in ascending year order
    pub years: Vec<YearResult>,

    pub total_units: f64,
    pub gross_revenue: f64,
    pub total_cost: f64,
    pub success_fee: f64,
    pub total_expenses: f64,
    pub net_profit: f64,

    pub fee_totals: Vec<FeeLine>,
    pub success_fee_totals: Vec<FeeLine>,

    pub cost_per_unit: CostPerUnit,
}

impl AggregateResult {
    /// Sum yearly rows into horizon totals
    pub fn from_years(scenario: &str, price: f64, years: Vec<YearResult>) -> Self {
        let total_units: f64 = years.iter().map(|r| r.units).sum();
        let gross_revenue: f64 = years.iter().map(|r| r.gross_revenue).sum();
        let total_cost: f64 = years.iter().map(|r| r.total_cost).sum();
        let success_fee: f64 = years.iter().map(|r| r.success_fee).sum();
        let total_expenses: f64 = years.iter().map(|r| r.total_expenses).sum();
        let net_profit: f64 = years.iter().map(|r| r.net_profit).sum();

        let fee_totals = sum_by_name(years.iter().flat_map(|r| r.fees.iter()));
        let success_fee_totals = sum_by_name(years.iter().flat_map(|r| r.success_fees.iter()));

        let cost_per_unit = CostPerUnit {
            fees: fee_totals
                .iter()
                .chain(success_fee_totals.iter())
                .map(|l| (l.name.clone(), UnitMetric::per_unit(l.amount, total_units)))
                .collect(),
            total_cost: UnitMetric::per_unit(total_cost, total_units),
            success_fee: UnitMetric::per_unit(success_fee, total_units),
            total_expenses: UnitMetric::per_unit(total_expenses, total_units),
            net_profit: UnitMetric::per_unit(net_profit, total_units),
        };

        Self {
            scenario: scenario.to_string(),
            price,
            years,
            total_units,
            gross_revenue,
            total_cost,
            success_fee,
            total_expenses,
            net_profit,
            fee_totals,
            success_fee_totals,
            cost_per_unit,
        }
    }

    /// Row for a 1-indexed year
    pub fn year(&self, year: u32) -> Option<&YearResult> {
        self.years.iter().find(|r| r.year == year)
    }

    pub fn horizon_years(&self) -> u32 {
        self.years.len() as u32
    }

    /// Horizon total of a named fee, either pass
    pub fn fee_total(&self, name: &str) -> Option<f64> {
        self.fee_totals
            .iter()
            .chain(self.success_fee_totals.iter())
            .find(|l| l.name == name)
            .map(|l| l.amount)
    }
}

fn sum_by_name<'a>(lines: impl Iterator<Item = &'a FeeLine>) -> Vec<FeeLine> {
    let mut totals: Vec<FeeLine> = Vec::new();
    for line in lines {
        match totals.iter_mut().find(|t| t.name == line.name) {
            Some(total) => total.amount += line.amount,
            None => totals.push(line.clone()),
        }
    }
    totals
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(year: u32, units: f64, net_profit: f64, fees: Vec<FeeLine>) -> YearResult {
        let mut r = YearResult::new("S", year);
        r.units = units;
        r.total_cost = fees.iter().map(|l| l.amount).sum();
        r.total_expenses = r.total_cost;
        r.net_profit = net_profit;
        r.fees = fees;
        r
    }

    #[test]
    fn test_unit_metric() {
        assert_eq!(UnitMetric::per_unit(10.0, 4.0), UnitMetric::Available(2.5));
        assert_eq!(UnitMetric::per_unit(10.0, 0.0), UnitMetric::Undefined);
        assert!(matches!(
            UnitMetric::Undefined.value("cost"),
            Err(EngineError::UndefinedMetric { .. })
        ));
        assert_eq!(UnitMetric::Available(3.0).value("cost").unwrap(), 3.0);
    }

    #[test]
    fn test_unit_metric_serializes_as_number_or_null() {
        assert_eq!(serde_json::to_string(&UnitMetric::Available(1.5)).unwrap(), "1.5");
        assert_eq!(serde_json::to_string(&UnitMetric::Undefined).unwrap(), "null");
    }

    #[test]
    fn test_aggregate_sums_fees_by_name() {
        let years = vec![
            row(1, 100.0, 50.0, vec![FeeLine::new("Opening", 30.0), FeeLine::new("Audit", 10.0)]),
            row(2, 100.0, 80.0, vec![FeeLine::new("Audit", 10.0)]),
        ];
        let agg = AggregateResult::from_years("S", 1.0, years);

        assert_eq!(agg.horizon_years(), 2);
        assert_eq!(agg.total_units, 200.0);
        assert_eq!(agg.net_profit, 130.0);
        assert_eq!(agg.fee_total("Opening"), Some(30.0));
        assert_eq!(agg.fee_total("Audit"), Some(20.0));
        assert_eq!(agg.fee_totals[0].name, "Opening");
        assert_eq!(agg.cost_per_unit.total_cost, UnitMetric::Available(0.25));
        assert_eq!(agg.year(2).map(|r| r.net_profit), Some(80.0));
    }
}
