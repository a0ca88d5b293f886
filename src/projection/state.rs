//! Projection state tracking for a single price scenario

use crate::assumptions::{ExchangeRates, PriceScenario};
use crate::error::EngineError;
use crate::project::{Generation, Technology};

/// Running state of a scenario as years are processed in order
#[derive(Debug, Clone, Default)]
pub struct ProjectionState {
    /// Current projection year (1-indexed, 0 before the first year)
    pub year: u32,

    /// Net profit accumulated through the current year
    pub cumulative_net_profit: f64,
}

impl ProjectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance to next year
    pub fn advance_year(&mut self) {
        self.year += 1;
    }
}

/// Inputs a fee needs to resolve its amount for one year
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct YearContext {
    pub year: u32,
    pub total_capacity_mw: f64,
    pub units: f64,
}

impl YearContext {
    pub fn new(year: u32, generation: &Generation) -> Self {
        Self {
            year,
            total_capacity_mw: generation.total_capacity_mw,
            units: generation.total_units,
        }
    }
}

/// Scenario prices converted into the reporting currency
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioPrices {
    pub label: String,
    pub base_price: f64,
    pub by_technology: Vec<(Technology, f64)>,
}

impl ScenarioPrices {
    pub fn resolve(
        scenario: &PriceScenario,
        generation: &Generation,
        rates: &ExchangeRates,
    ) -> Result<Self, EngineError> {
        let context = format!("scenario '{}' price", scenario.label);
        let base_price = scenario.price.to_reporting(rates, &context)?;

        let mut by_technology = Vec::with_capacity(generation.outputs.len());
        for output in &generation.outputs {
            let price = match scenario.technology_prices.get(&output.technology) {
                Some(p) => p.to_reporting(rates, &format!("{} {} price", context, output.technology))?,
                None => base_price,
            };
            by_technology.push((output.technology, price));
        }

        Ok(Self {
            label: scenario.label.clone(),
            base_price,
            by_technology,
        })
    }

    pub fn price_for(&self, technology: Technology) -> f64 {
        self.by_technology
            .iter()
            .find(|(t, _)| *t == technology)
            .map(|(_, p)| *p)
            .unwrap_or(self.base_price)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::Price;
    use crate::project::ProjectConfig;
    use approx::assert_relative_eq;

    #[test]
    fn test_advance_year() {
        let mut state = ProjectionState::new();
        assert_eq!(state.year, 0);
        state.advance_year();
        state.advance_year();
        assert_eq!(state.year, 2);
    }

    #[test]
    fn test_scenario_prices_converted() {
        let generation = Generation::from_project(&ProjectConfig::hybrid("P", 10.0, 15.0)).unwrap();
        let scenario = PriceScenario::new("Mixed", Price::usd(0.50))
            .with_technology_price(Technology::Solar, Price::inr(65.0));

        let prices = ScenarioPrices::resolve(&scenario, &generation, &ExchangeRates::usd_inr_jan_2026()).unwrap();

        assert_relative_eq!(prices.base_price, 45.475, max_relative = 1e-12);
        assert_eq!(prices.price_for(Technology::Solar), 65.0);
        assert_relative_eq!(prices.price_for(Technology::Wind), 45.475, max_relative = 1e-12);
    }

    #[test]
    fn test_missing_price_rate() {
        let generation = Generation::from_project(&ProjectConfig::hybrid("P", 1.0, 1.0)).unwrap();
        let scenario = PriceScenario::new("Euro", Price::new(0.4, "EUR"));

        let err = ScenarioPrices::resolve(&scenario, &generation, &ExchangeRates::usd_inr_jan_2026()).unwrap_err();
        assert!(matches!(err, EngineError::MissingRate { ref currency, .. } if currency == "EUR"));
    }
}
