//! Scenario runner for efficient batch projections
//!
//! Pre-loads assumptions once, then allows running many projects, horizons,
//! and price sweeps without re-reading CSV files.

use rayon::prelude::*;

use crate::assumptions::{Assumptions, Price, PriceScenario};
use crate::error::{EngineError, LoadError};
use crate::project::ProjectConfig;
use crate::projection::{AggregateResult, ProjectionEngine, ProjectionHorizon};

/// Pre-loaded scenario runner for efficient batch projections
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// // Same fee regime, different plants
/// let project = ProjectConfig::hybrid("Alpha", 10.0, 15.0);
/// let results = runner.run(&project, ProjectionHorizon::new(5))?;
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    /// Pre-loaded base assumptions
    base_assumptions: Assumptions,
}

impl ScenarioRunner {
    /// Create runner with default in-memory assumptions
    pub fn new() -> Self {
        Self {
            base_assumptions: Assumptions::default_pricing(),
        }
    }

    /// Create runner by loading assumptions from CSV files
    pub fn from_csv() -> Result<Self, LoadError> {
        Ok(Self {
            base_assumptions: Assumptions::from_csv()?,
        })
    }

    /// Create runner from specific assumptions directory
    pub fn from_csv_path(path: &std::path::Path) -> Result<Self, LoadError> {
        Ok(Self {
            base_assumptions: Assumptions::from_csv_path(path)?,
        })
    }

    /// Create runner with pre-built assumptions
    pub fn with_assumptions(assumptions: Assumptions) -> Self {
        Self {
            base_assumptions: assumptions,
        }
    }

    /// Run a single project over the given horizon
    pub fn run(&self, project: &ProjectConfig, horizon: ProjectionHorizon) -> Result<Vec<AggregateResult>, EngineError> {
        let engine = ProjectionEngine::new(self.base_assumptions.clone(), horizon);
        engine.project(project)
    }

    /// Run projections for multiple projects with the same horizon.
    ///
    /// Each project succeeds or fails on its own.
    pub fn run_batch(
        &self,
        projects: &[ProjectConfig],
        horizon: ProjectionHorizon,
    ) -> Vec<Result<Vec<AggregateResult>, EngineError>> {
        let engine = ProjectionEngine::new(self.base_assumptions.clone(), horizon);
        projects.par_iter().map(|p| engine.project(p)).collect()
    }

    /// Evaluate one project at each price, one scenario per price
    pub fn run_price_sweep(
        &self,
        project: &ProjectConfig,
        prices: &[Price],
        years: u32,
    ) -> Result<Vec<AggregateResult>, EngineError> {
        let horizon = prices.iter().fold(ProjectionHorizon::new(years), |h, price| {
            let label = format!("{:.2} {}", price.amount, price.currency);
            h.with_scenario(PriceScenario::new(label, price.clone()))
        });
        self.run(project, horizon)
    }

    /// Get reference to base assumptions for inspection/modification
    pub fn assumptions(&self) -> &Assumptions {
        &self.base_assumptions
    }

    /// Get mutable reference to base assumptions for customization
    pub fn assumptions_mut(&mut self) -> &mut Assumptions {
        &mut self.base_assumptions
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_price_sweep_orders_by_price() {
        let runner = ScenarioRunner::new();
        let project = ProjectConfig::hybrid("Sweep", 10.0, 15.0);
        let prices: Vec<Price> = [0.30, 0.50, 0.80].iter().map(|&p| Price::usd(p)).collect();

        let results = runner.run_price_sweep(&project, &prices, 5).unwrap();
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].scenario, "0.30 USD");

        // Higher sale price should result in higher net profit
        assert!(results[2].net_profit > results[1].net_profit);
        assert!(results[1].net_profit > results[0].net_profit);
    }

    #[test]
    fn test_batch_isolates_failures() {
        let runner = ScenarioRunner::new();
        let projects = vec![
            ProjectConfig::hybrid("Good", 10.0, 15.0),
            ProjectConfig::hybrid("Bad", -5.0, 15.0),
        ];

        let results = runner.run_batch(&projects, ProjectionHorizon::new(2));
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(EngineError::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_assumptions_customization() {
        let mut runner = ScenarioRunner::new();
        runner.assumptions_mut().market.success_fee_pct = 0.0;

        let project = ProjectConfig::default();
        let results = runner.run(&project, ProjectionHorizon::single_year()).unwrap();
        assert_eq!(results[0].success_fee, 0.0);
        assert!(results[0].success_fee_totals.is_empty());
    }

    #[test]
    fn test_from_csv_matches_defaults() {
        let runner = ScenarioRunner::from_csv().expect("Failed to load assumptions");
        assert_eq!(runner.assumptions(), &Assumptions::default_pricing());
    }
}
