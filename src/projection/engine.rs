//! Core projection engine for yearly certificate revenue and cost projections

use log::{debug, info, warn};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::assumptions::{
    Assumptions, ExchangeRates, FeeSchedule, MarketAssumptions, Price, PriceScenario,
};
use crate::error::EngineError;
use crate::project::{Generation, ProjectConfig};
use super::cashflows::{AggregateResult, TechnologyRevenue, UnitMetric, YearResult};
use super::resolver::resolve_year;
use super::state::{ProjectionState, ScenarioPrices, YearContext};

/// Years and price scenarios to project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionHorizon {
    /// Number of years to project
    #[serde(default = "default_years")]
    pub years: u32,

    /// Independent price scenarios; empty means the market base price only
    #[serde(default)]
    pub scenarios: Vec<PriceScenario>,
}

fn default_years() -> u32 { 1 }

/// Longest supported projection horizon
pub const MAX_HORIZON_YEARS: u32 = 100;

impl Default for ProjectionHorizon {
    fn default() -> Self {
        Self {
            years: default_years(),
            scenarios: Vec::new(),
        }
    }
}

impl ProjectionHorizon {
    pub fn new(years: u32) -> Self {
        Self {
            years,
            scenarios: Vec::new(),
        }
    }

    pub fn single_year() -> Self {
        Self::new(1)
    }

    pub fn with_scenario(mut self, scenario: PriceScenario) -> Self {
        self.scenarios.push(scenario);
        self
    }

    /// One scenario per USD certificate price, labelled like "$0.50 / I-REC"
    pub fn usd_price_scenarios(prices: &[f64], years: u32) -> Self {
        prices.iter().fold(Self::new(years), |horizon, &p| {
            horizon.with_scenario(PriceScenario::new(format!("${:.2} / I-REC", p), Price::usd(p)))
        })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.years == 0 || self.years > MAX_HORIZON_YEARS {
            return Err(EngineError::invalid(
                "horizon.years",
                format!("must be within 1-{}, got {}", MAX_HORIZON_YEARS, self.years),
            ));
        }
        let mut labels = HashSet::new();
        for scenario in &self.scenarios {
            if scenario.label.trim().is_empty() {
                return Err(EngineError::invalid("horizon.scenarios.label", "label is required"));
            }
            if !labels.insert(scenario.label.as_str()) {
                return Err(EngineError::invalid(
                    format!("horizon.scenarios.{}", scenario.label),
                    "duplicate scenario label",
                ));
            }
        }
        Ok(())
    }
}

/// Main projection engine
#[derive(Debug, Clone)]
pub struct ProjectionEngine {
    assumptions: Assumptions,
    horizon: ProjectionHorizon,
}

impl ProjectionEngine {
    /// Create a new projection engine with given assumptions and horizon
    pub fn new(assumptions: Assumptions, horizon: ProjectionHorizon) -> Self {
        Self { assumptions, horizon }
    }

    /// Run every scenario for a project, one result per scenario in input order.
    ///
    /// Any invalid input or missing exchange rate aborts the whole request.
    pub fn project(&self, project: &ProjectConfig) -> Result<Vec<AggregateResult>, EngineError> {
        self.assumptions.validate()?;
        self.horizon.validate()?;
        let generation = Generation::from_project(project)?;

        if !generation.has_volume() {
            warn!(
                "Project '{}' has zero certificate volume; per-unit metrics are undefined",
                project.name
            );
        }

        let fees = self.effective_fees()?;
        let scenarios = if self.horizon.scenarios.is_empty() {
            vec![self.assumptions.market.base_scenario()]
        } else {
            self.horizon.scenarios.clone()
        };

        info!(
            "Projecting '{}': {:.2} MW, {:.0} certificates/yr, {} scenario(s) x {} year(s), {} fee(s)",
            project.name,
            generation.total_capacity_mw,
            generation.total_units,
            scenarios.len(),
            self.horizon.years,
            fees.len(),
        );

        // Scenarios share no state; years within one stay sequential
        scenarios
            .par_iter()
            .map(|scenario| self.project_scenario(&generation, scenario, &fees))
            .collect()
    }

    /// Fee schedule with the market success fee appended as the last
    /// percentage-of-net item
    fn effective_fees(&self) -> Result<FeeSchedule, EngineError> {
        let mut fees = self.assumptions.fees.clone();
        if let Some(item) = self.assumptions.market.success_fee_item() {
            if fees.iter().any(|f| f.name.trim() == item.name) {
                return Err(EngineError::invalid(
                    format!("fees.{}", item.name),
                    "name is reserved for the market success fee",
                ));
            }
            fees.items.push(item);
        }
        Ok(fees)
    }

    fn project_scenario(
        &self,
        generation: &Generation,
        scenario: &PriceScenario,
        fees: &FeeSchedule,
    ) -> Result<AggregateResult, EngineError> {
        let prices = ScenarioPrices::resolve(scenario, generation, &self.assumptions.rates)?;
        let mut state = ProjectionState::new();
        let mut years = Vec::new();

        for _year in 1..=self.horizon.years {
            // Advance state to next year
            state.advance_year();

            let row = self.calculate_year(generation, &prices, fees, &mut state)?;
            years.push(row);
        }

        Ok(AggregateResult::from_years(&prices.label, prices.base_price, years))
    }

    /// Calculate revenue, fees, and profit for the state's current year
    fn calculate_year(
        &self,
        generation: &Generation,
        prices: &ScenarioPrices,
        fees: &FeeSchedule,
        state: &mut ProjectionState,
    ) -> Result<YearResult, EngineError> {
        let mut row = YearResult::new(&prices.label, state.year);
        row.price = prices.base_price;
        row.units = generation.total_units;

        row.revenue_by_technology = generation
            .outputs
            .iter()
            .map(|output| {
                let price = prices.price_for(output.technology);
                TechnologyRevenue {
                    technology: output.technology,
                    units: output.annual_units,
                    price,
                    revenue: output.annual_units * price,
                }
            })
            .collect();
        row.gross_revenue = row.revenue_by_technology.iter().map(|r| r.revenue).sum();

        let ctx = YearContext::new(state.year, generation);
        let resolved = resolve_year(fees, &ctx, &self.assumptions.rates, row.gross_revenue)?;

        row.fees = resolved.operating;
        row.total_cost = resolved.total_cost;
        row.net_pre_fee = resolved.net_pre_fee;
        row.success_fees = resolved.success;
        row.success_fee = resolved.success_fee;
        row.total_expenses = row.total_cost + row.success_fee;
        row.net_profit = row.net_pre_fee - row.success_fee;
        row.cost_per_unit = UnitMetric::per_unit(row.total_expenses, row.units);

        state.cumulative_net_profit += row.net_profit;
        row.cumulative_net_profit = state.cumulative_net_profit;

        debug!(
            "[{}] year {}: gross={:.2} cost={:.2} success={:.2} net={:.2}",
            row.scenario, row.year, row.gross_revenue, row.total_cost, row.success_fee, row.net_profit
        );

        Ok(row)
    }
}

/// Project certificate revenue and costs for every scenario in `horizon`
pub fn project(
    config: &ProjectConfig,
    market: &MarketAssumptions,
    fees: &FeeSchedule,
    rates: &ExchangeRates,
    horizon: &ProjectionHorizon,
) -> Result<Vec<AggregateResult>, EngineError> {
    let assumptions = Assumptions {
        market: market.clone(),
        fees: fees.clone(),
        rates: rates.clone(),
    };
    ProjectionEngine::new(assumptions, horizon.clone()).project(config)
}
