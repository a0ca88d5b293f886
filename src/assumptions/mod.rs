//! Market, fee, and exchange-rate assumptions

mod currency;
mod fees;
mod market;
pub mod loader;

pub use currency::{normalize_code, CsvRates, ExchangeRates, FallbackRates, RateProvider, StaticRates};
pub use fees::{FeeBasis, FeeItem, FeeSchedule, FeeTiming, ThresholdRule, GST_MULTIPLIER};
pub use market::{MarketAssumptions, Price, PriceScenario, SUCCESS_FEE_NAME};

use std::path::Path;

use crate::error::{EngineError, LoadError};

/// Container for all projection assumptions
#[derive(Debug, Clone, PartialEq)]
pub struct Assumptions {
    pub market: MarketAssumptions,
    pub fees: FeeSchedule,
    pub rates: ExchangeRates,
}

impl Assumptions {
    /// ICX 2026 fees, USD 0.50 certificates, 10% success fee, INR reporting
    pub fn default_pricing() -> Self {
        Self {
            market: MarketAssumptions::default(),
            fees: FeeSchedule::icx_2026_v1(),
            rates: ExchangeRates::usd_inr_jan_2026(),
        }
    }

    /// Load fees and rates from CSV files in the default location (data/assumptions/)
    pub fn from_csv() -> Result<Self, LoadError> {
        Self::from_csv_path(Path::new(loader::DEFAULT_ASSUMPTIONS_PATH))
    }

    /// Load fees and rates from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> Result<Self, LoadError> {
        Ok(Self {
            market: MarketAssumptions::default(),
            fees: loader::load_fee_schedule(path.join("fee_schedule.csv"))?,
            rates: loader::load_exchange_rates(
                path.join("exchange_rates.csv"),
                loader::DEFAULT_REPORTING_CURRENCY,
            )?,
        })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        self.market.validate()?;
        self.fees.validate()?;
        self.rates.validate()
    }
}
