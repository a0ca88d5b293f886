//! JSON projection request used by the CLI and the Lambda handler

use serde::{Deserialize, Serialize};
use std::io::Read;
use std::path::Path;

use crate::assumptions::{Assumptions, ExchangeRates, FeeSchedule, MarketAssumptions};
use crate::error::{EngineError, LoadError};
use crate::project::ProjectConfig;
use crate::projection::{project, AggregateResult, ProjectionHorizon};

/// A complete projection input.
///
/// Every section is optional; an empty object `{}` reproduces the 2026 ICX
/// hybrid calculator (10 MW solar, 15 MW wind, USD 0.50, one year).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionRequest {
    #[serde(default)]
    pub project: ProjectConfig,

    #[serde(default)]
    pub market: MarketAssumptions,

    #[serde(default = "default_fees")]
    pub fees: FeeSchedule,

    #[serde(default)]
    pub rates: ExchangeRates,

    #[serde(default)]
    pub horizon: ProjectionHorizon,
}

fn default_fees() -> FeeSchedule { FeeSchedule::icx_2026_v1() }

impl Default for ProjectionRequest {
    fn default() -> Self {
        Self {
            project: ProjectConfig::default(),
            market: MarketAssumptions::default(),
            fees: default_fees(),
            rates: ExchangeRates::default(),
            horizon: ProjectionHorizon::default(),
        }
    }
}

impl ProjectionRequest {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, LoadError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(std::io::BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, LoadError> {
        Ok(serde_json::from_reader(reader)?)
    }

    pub fn from_json(json: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn assumptions(&self) -> Assumptions {
        Assumptions {
            market: self.market.clone(),
            fees: self.fees.clone(),
            rates: self.rates.clone(),
        }
    }

    pub fn run(&self) -> Result<Vec<AggregateResult>, EngineError> {
        project(&self.project, &self.market, &self.fees, &self.rates, &self.horizon)
    }
}
