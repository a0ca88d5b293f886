//! Registry, issuer, and consultancy fee schedule

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::EngineError;

/// Flat GST rate on local registry services
pub const GST_MULTIPLIER: f64 = 1.18;

/// Capacity tier for a fixed fee.
///
/// Total capacity strictly above `cutoff_mw` selects `above_amount`;
/// capacity equal to the cutoff stays on the base amount.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdRule {
    pub cutoff_mw: f64,
    pub above_amount: f64,
}

/// How a fee amount is computed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeBasis {
    /// Flat amount, optionally tiered by total capacity
    Fixed {
        amount: f64,
        #[serde(default)]
        threshold: Option<ThresholdRule>,
    },
    /// Amount per certificate issued in the year
    PerUnit { amount: f64 },
    /// Percentage (0-100) of the year's net revenue after all other fees
    PercentageOfNet { percent: f64 },
}

/// When a fee is charged over the horizon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeeTiming {
    /// Charged in full in year 1 only
    OneTime,
    /// Charged every year
    Recurring,
    /// One-time amount spread evenly over the first `years` years
    Amortized { years: u32 },
}

impl FeeTiming {
    /// Portion of `amount` charged in `year` (1-indexed), `None` when not due
    pub fn amount_in_year(&self, amount: f64, year: u32) -> Option<f64> {
        match *self {
            FeeTiming::OneTime => (year == 1).then_some(amount),
            FeeTiming::Recurring => Some(amount),
            FeeTiming::Amortized { years } => {
                (year >= 1 && year <= years).then(|| amount / years as f64)
            }
        }
    }

    pub fn is_due(&self, year: u32) -> bool {
        self.amount_in_year(1.0, year).is_some()
    }
}

/// One line of the fee schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeeItem {
    pub name: String,
    pub basis: FeeBasis,

    /// Currency of `amount`; ignored for percentage fees
    #[serde(default)]
    pub currency: String,

    #[serde(default = "default_timing")]
    pub timing: FeeTiming,

    /// Tax surcharge applied to the resolved amount (1.18 = 18% GST)
    #[serde(default = "default_tax_multiplier")]
    pub tax_multiplier: f64,
}

fn default_timing() -> FeeTiming { FeeTiming::Recurring }
fn default_tax_multiplier() -> f64 { 1.0 }

impl FeeItem {
    fn with_basis(name: &str, basis: FeeBasis, currency: &str) -> Self {
        Self {
            name: name.to_string(),
            basis,
            currency: super::currency::normalize_code(currency),
            timing: default_timing(),
            tax_multiplier: default_tax_multiplier(),
        }
    }

    pub fn fixed(name: &str, amount: f64, currency: &str) -> Self {
        Self::with_basis(name, FeeBasis::Fixed { amount, threshold: None }, currency)
    }

    pub fn per_unit(name: &str, amount: f64, currency: &str) -> Self {
        Self::with_basis(name, FeeBasis::PerUnit { amount }, currency)
    }

    pub fn percentage_of_net(name: &str, percent: f64) -> Self {
        Self::with_basis(name, FeeBasis::PercentageOfNet { percent }, "")
    }

    pub fn one_time(mut self) -> Self {
        self.timing = FeeTiming::OneTime;
        self
    }

    pub fn recurring(mut self) -> Self {
        self.timing = FeeTiming::Recurring;
        self
    }

    pub fn amortized(mut self, years: u32) -> Self {
        self.timing = FeeTiming::Amortized { years };
        self
    }

    pub fn with_tax(mut self, multiplier: f64) -> Self {
        self.tax_multiplier = multiplier;
        self
    }

    /// Add a capacity tier; no effect on non-fixed fees
    pub fn with_threshold(mut self, cutoff_mw: f64, above_amount: f64) -> Self {
        if let FeeBasis::Fixed { threshold, .. } = &mut self.basis {
            *threshold = Some(ThresholdRule { cutoff_mw, above_amount });
        }
        self
    }

    pub fn is_percentage(&self) -> bool {
        matches!(self.basis, FeeBasis::PercentageOfNet { .. })
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        let field = |suffix: &str| format!("fees.{}.{}", self.name, suffix);

        if self.name.trim().is_empty() {
            return Err(EngineError::invalid("fees.name", "fee name is required"));
        }
        if !self.tax_multiplier.is_finite() || self.tax_multiplier < 0.0 {
            return Err(EngineError::invalid(
                field("tax_multiplier"),
                format!("must be a finite value >= 0, got {}", self.tax_multiplier),
            ));
        }

        match &self.basis {
            FeeBasis::Fixed { amount, threshold } => {
                check_amount(*amount, &field("amount"))?;
                if let Some(rule) = threshold {
                    check_amount(rule.cutoff_mw, &field("threshold.cutoff_mw"))?;
                    check_amount(rule.above_amount, &field("threshold.above_amount"))?;
                }
            }
            FeeBasis::PerUnit { amount } => check_amount(*amount, &field("amount"))?,
            FeeBasis::PercentageOfNet { percent } => {
                if !(0.0..=100.0).contains(percent) {
                    return Err(EngineError::invalid(
                        field("percent"),
                        format!("must be within 0-100, got {percent}"),
                    ));
                }
            }
        }

        if !self.is_percentage() && self.currency.trim().is_empty() {
            return Err(EngineError::invalid(field("currency"), "currency is required"));
        }

        if let FeeTiming::Amortized { years } = self.timing {
            if years == 0 {
                return Err(EngineError::invalid(field("timing"), "amortization period must be >= 1 year"));
            }
            if !matches!(self.basis, FeeBasis::Fixed { .. }) {
                return Err(EngineError::invalid(
                    field("timing"),
                    "only fixed fees can be amortized",
                ));
            }
        }

        Ok(())
    }
}

fn check_amount(value: f64, field: &str) -> Result<(), EngineError> {
    if !value.is_finite() || value < 0.0 {
        return Err(EngineError::invalid(
            field,
            format!("must be a finite value >= 0, got {value}"),
        ));
    }
    Ok(())
}

/// Ordered list of fees applied to every projection year
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FeeSchedule {
    pub items: Vec<FeeItem>,
}

impl FeeSchedule {
    pub fn new(items: Vec<FeeItem>) -> Self {
        Self { items }
    }

    pub fn with_fee(mut self, item: FeeItem) -> Self {
        self.items.push(item);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &FeeItem> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Validate every item; names identify fees in results and must be unique
    pub fn validate(&self) -> Result<(), EngineError> {
        let mut names = HashSet::new();
        for item in &self.items {
            item.validate()?;
            if !names.insert(item.name.trim()) {
                return Err(EngineError::invalid(
                    format!("fees.{}", item.name),
                    "duplicate fee name",
                ));
            }
        }
        Ok(())
    }

    /// ICX 2026 fee structure with the registration fee amortized over its
    /// 5-year validity.
    pub fn icx_2026_v1() -> Self {
        Self::new(vec![
            FeeItem::fixed("Registry Registration (Amortized)", 44_500.0, "INR")
                .with_threshold(3.0, 89_000.0)
                .amortized(5),
            FeeItem::fixed("Registry Maintenance (Annual)", 180_000.0, "INR"),
            FeeItem::per_unit("Issuance Fee (ICX)", 2.25, "INR"),
            FeeItem::per_unit("Redemption Fee (Registry)", 0.07, "USD"),
            FeeItem::fixed("Independent Verification Audit", 50_000.0, "INR"),
        ])
    }

    /// I-TRACK v2 registry fees plus ICX local fees with 18% GST; the
    /// registration is paid in full in year 1.
    pub fn itrack_2026_v2() -> Self {
        Self::new(vec![
            FeeItem::fixed("Account Opening", 588.50, "USD").one_time(),
            FeeItem::fixed("Annual Trade Account", 2_354.00, "USD").recurring(),
            FeeItem::per_unit("Redemption Levy", 0.08, "USD"),
            FeeItem::fixed("ICX Registration", 104_110.00, "INR")
                .one_time()
                .with_tax(GST_MULTIPLIER),
            FeeItem::per_unit("ICX Issuance", 2.60, "INR").with_tax(GST_MULTIPLIER),
            FeeItem::fixed("ICX Audit", 10_000.00, "INR").with_tax(GST_MULTIPLIER),
        ])
    }
}
