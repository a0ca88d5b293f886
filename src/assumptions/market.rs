//! Certificate sale prices and the consultancy success fee

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::currency::{normalize_code, ExchangeRates};
use super::fees::FeeItem;
use crate::error::EngineError;
use crate::project::Technology;

/// Name under which the market success fee appears in results
pub const SUCCESS_FEE_NAME: &str = "Success fee";

/// A per-certificate amount in a declared currency
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub amount: f64,
    pub currency: String,
}

impl Price {
    pub fn new(amount: f64, currency: &str) -> Self {
        Self {
            amount,
            currency: normalize_code(currency),
        }
    }

    pub fn usd(amount: f64) -> Self {
        Self::new(amount, "USD")
    }

    pub fn inr(amount: f64) -> Self {
        Self::new(amount, "INR")
    }

    /// Validate and convert into the reporting currency
    pub fn to_reporting(&self, rates: &ExchangeRates, context: &str) -> Result<f64, EngineError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(EngineError::invalid(
                context,
                format!("price must be a finite value >= 0, got {}", self.amount),
            ));
        }
        rates.convert(self.amount, &self.currency, context)
    }
}

/// A price assumption evaluated as an independent scenario
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceScenario {
    pub label: String,
    pub price: Price,

    /// Technology-specific prices replacing `price` for that technology
    #[serde(default)]
    pub technology_prices: BTreeMap<Technology, Price>,
}

impl PriceScenario {
    pub fn new(label: impl Into<String>, price: Price) -> Self {
        Self {
            label: label.into(),
            price,
            technology_prices: BTreeMap::new(),
        }
    }

    pub fn with_technology_price(mut self, technology: Technology, price: Price) -> Self {
        self.technology_prices.insert(technology, price);
        self
    }

    pub fn price_for(&self, technology: Technology) -> &Price {
        self.technology_prices.get(&technology).unwrap_or(&self.price)
    }
}

/// Market-side assumptions for certificate sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketAssumptions {
    /// Sale price per certificate
    #[serde(default = "default_price")]
    pub price: Price,

    /// Consultancy success fee as a percentage (0-100) of net pre-fee revenue
    #[serde(default = "default_success_fee_pct")]
    pub success_fee_pct: f64,

    /// Tax surcharge applied to the success fee (1.0 = none)
    #[serde(default = "default_one")]
    pub success_fee_tax_multiplier: f64,

    #[serde(default)]
    pub technology_prices: BTreeMap<Technology, Price>,
}

fn default_price() -> Price { Price::usd(0.50) }
fn default_success_fee_pct() -> f64 { 10.0 }
fn default_one() -> f64 { 1.0 }

impl Default for MarketAssumptions {
    fn default() -> Self {
        Self {
            price: default_price(),
            success_fee_pct: default_success_fee_pct(),
            success_fee_tax_multiplier: default_one(),
            technology_prices: BTreeMap::new(),
        }
    }
}

impl MarketAssumptions {
    pub fn new(price: Price, success_fee_pct: f64) -> Self {
        Self {
            price,
            success_fee_pct,
            ..Self::default()
        }
    }

    pub fn with_technology_price(mut self, technology: Technology, price: Price) -> Self {
        self.technology_prices.insert(technology, price);
        self
    }

    /// Scenario used when the horizon names none
    pub fn base_scenario(&self) -> PriceScenario {
        PriceScenario {
            label: "Base".to_string(),
            price: self.price.clone(),
            technology_prices: self.technology_prices.clone(),
        }
    }

    /// The success fee as a recurring percentage-of-net fee item, if charged
    pub fn success_fee_item(&self) -> Option<FeeItem> {
        if self.success_fee_pct == 0.0 {
            return None;
        }
        Some(
            FeeItem::percentage_of_net(SUCCESS_FEE_NAME, self.success_fee_pct)
                .with_tax(self.success_fee_tax_multiplier),
        )
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(0.0..=100.0).contains(&self.success_fee_pct) {
            return Err(EngineError::invalid(
                "market.success_fee_pct",
                format!("must be within 0-100, got {}", self.success_fee_pct),
            ));
        }
        if !self.success_fee_tax_multiplier.is_finite() || self.success_fee_tax_multiplier < 0.0 {
            return Err(EngineError::invalid(
                "market.success_fee_tax_multiplier",
                format!("must be a finite value >= 0, got {}", self.success_fee_tax_multiplier),
            ));
        }
        Ok(())
    }
}
