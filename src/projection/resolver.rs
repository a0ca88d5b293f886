//! Fee resolution for a single projection year
//!
//! Operating fees (fixed and per-unit) resolve first. Their total fixes the
//! net pre-fee revenue, which is the base for every percentage-of-net fee.

use crate::assumptions::{ExchangeRates, FeeBasis, FeeItem, FeeSchedule, ThresholdRule};
use crate::error::EngineError;
use super::cashflows::FeeLine;
use super::state::YearContext;

/// Fees charged in one year, split by evaluation pass
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedFees {
    pub operating: Vec<FeeLine>,
    pub total_cost: f64,
    pub net_pre_fee: f64,
    pub success: Vec<FeeLine>,
    pub success_fee: f64,
}

/// Amount of `item` charged in `ctx.year`, in reporting currency.
///
/// Returns `Ok(None)` when the fee is not due this year, or when it is a
/// percentage fee and `net_pre_fee` is not yet known. Currency conversion
/// runs before the timing check so a missing rate fails in every year.
pub fn resolve_fee(
    item: &FeeItem,
    ctx: &YearContext,
    rates: &ExchangeRates,
    net_pre_fee: Option<f64>,
) -> Result<Option<f64>, EngineError> {
    let amount = match &item.basis {
        FeeBasis::Fixed { amount, threshold } => {
            let tier = select_tier(*amount, threshold.as_ref(), ctx.total_capacity_mw);
            rates.convert(tier, &item.currency, &item.name)?
        }
        FeeBasis::PerUnit { amount } => rates.convert(*amount, &item.currency, &item.name)? * ctx.units,
        FeeBasis::PercentageOfNet { percent } => match net_pre_fee {
            Some(net) => net * percent / 100.0,
            None => return Ok(None),
        },
    };

    Ok(item
        .timing
        .amount_in_year(amount, ctx.year)
        .map(|a| a * item.tax_multiplier))
}

/// Fixed amount for the capacity tier; equal-to-cutoff stays on the lower tier
pub fn select_tier(amount: f64, threshold: Option<&ThresholdRule>, total_capacity_mw: f64) -> f64 {
    match threshold {
        Some(rule) if total_capacity_mw > rule.cutoff_mw => rule.above_amount,
        _ => amount,
    }
}

/// Resolve every fee in `fees` for one year given its gross revenue
pub fn resolve_year(
    fees: &FeeSchedule,
    ctx: &YearContext,
    rates: &ExchangeRates,
    gross_revenue: f64,
) -> Result<ResolvedFees, EngineError> {
    let mut operating = Vec::new();
    for item in fees.iter().filter(|f| !f.is_percentage()) {
        if let Some(amount) = resolve_fee(item, ctx, rates, None)? {
            operating.push(FeeLine::new(&item.name, amount));
        }
    }
    let total_cost: f64 = operating.iter().map(|l| l.amount).sum();
    let net_pre_fee = gross_revenue - total_cost;

    let mut success = Vec::new();
    for item in fees.iter().filter(|f| f.is_percentage()) {
        if let Some(amount) = resolve_fee(item, ctx, rates, Some(net_pre_fee))? {
            success.push(FeeLine::new(&item.name, amount));
        }
    }
    let success_fee: f64 = success.iter().map(|l| l.amount).sum();

    Ok(ResolvedFees {
        operating,
        total_cost,
        net_pre_fee,
        success,
        success_fee,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::GST_MULTIPLIER;
    use approx::assert_relative_eq;

    fn ctx(year: u32, total_capacity_mw: f64, units: f64) -> YearContext {
        YearContext { year, total_capacity_mw, units }
    }

    fn inr() -> ExchangeRates {
        ExchangeRates::usd_inr_jan_2026()
    }

    #[test]
    fn test_threshold_boundary_is_exclusive() {
        let fee = FeeItem::fixed("Registration", 44_500.0, "INR").with_threshold(3.0, 89_000.0);

        let at_cutoff = resolve_fee(&fee, &ctx(1, 3.0, 100.0), &inr(), None).unwrap();
        assert_eq!(at_cutoff, Some(44_500.0));

        let above = resolve_fee(&fee, &ctx(1, 4.0, 100.0), &inr(), None).unwrap();
        assert_eq!(above, Some(89_000.0));

        let just_above = resolve_fee(&fee, &ctx(1, 3.000001, 100.0), &inr(), None).unwrap();
        assert_eq!(just_above, Some(89_000.0));

        let below = resolve_fee(&fee, &ctx(1, 2.0, 100.0), &inr(), None).unwrap();
        assert_eq!(below, Some(44_500.0));
    }

    #[test]
    fn test_one_time_fee_only_in_year_one() {
        let fee = FeeItem::fixed("Account Opening", 588.50, "USD").one_time();
        let rates = inr();

        let year1 = resolve_fee(&fee, &ctx(1, 10.0, 1.0), &rates, None).unwrap();
        assert_relative_eq!(year1.unwrap(), 588.50 * 90.95, max_relative = 1e-12);

        for year in 2..=5 {
            assert_eq!(resolve_fee(&fee, &ctx(year, 10.0, 1.0), &rates, None).unwrap(), None);
        }
    }

    #[test]
    fn test_amortized_fee_round_trip() {
        let fee = FeeItem::fixed("Registration", 44_500.0, "INR")
            .with_threshold(3.0, 89_000.0)
            .amortized(5);

        let amounts: Vec<f64> = (1..=8)
            .filter_map(|y| resolve_fee(&fee, &ctx(y, 25.0, 0.0), &inr(), None).unwrap())
            .collect();

        assert_eq!(amounts.len(), 5);
        assert_eq!(amounts[0], 17_800.0);
        assert_relative_eq!(amounts.iter().sum::<f64>(), 89_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_per_unit_fee_with_tax() {
        let fee = FeeItem::per_unit("ICX Issuance", 2.60, "INR").with_tax(GST_MULTIPLIER);
        let amount = resolve_fee(&fee, &ctx(3, 150.0, 1_000.0), &inr(), None).unwrap().unwrap();
        assert_relative_eq!(amount, 2.60 * 1_000.0 * 1.18, max_relative = 1e-12);
    }

    #[test]
    fn test_percentage_fee_waits_for_net() {
        let fee = FeeItem::percentage_of_net("Success fee", 10.0);
        assert_eq!(resolve_fee(&fee, &ctx(1, 1.0, 1.0), &inr(), None).unwrap(), None);
        assert_eq!(resolve_fee(&fee, &ctx(1, 1.0, 1.0), &inr(), Some(5_000.0)).unwrap(), Some(500.0));
    }

    #[test]
    fn test_percentage_base_excludes_other_fees() {
        let fees = FeeSchedule::new(vec![
            FeeItem::percentage_of_net("Consultant", 10.0),
            FeeItem::fixed("Maintenance", 1_000.0, "INR"),
        ]);

        let resolved = resolve_year(&fees, &ctx(1, 5.0, 100.0), &inr(), 11_000.0).unwrap();

        assert_eq!(resolved.total_cost, 1_000.0);
        assert_eq!(resolved.net_pre_fee, 10_000.0);
        // 10% of 10,000 net, not of 11,000 gross
        assert_eq!(resolved.success_fee, 1_000.0);
        assert_eq!(resolved.success[0].name, "Consultant");
    }

    #[test]
    fn test_percentage_fees_share_the_same_base() {
        let fees = FeeSchedule::new(vec![
            FeeItem::percentage_of_net("A", 10.0),
            FeeItem::percentage_of_net("B", 5.0).with_tax(GST_MULTIPLIER),
        ]);
        let resolved = resolve_year(&fees, &ctx(1, 5.0, 100.0), &inr(), 20_000.0).unwrap();

        assert_eq!(resolved.success[0].amount, 2_000.0);
        assert_relative_eq!(resolved.success[1].amount, 1_000.0 * 1.18, max_relative = 1e-12);
    }

    #[test]
    fn test_negative_net_gives_negative_percentage_fee() {
        let fees = FeeSchedule::new(vec![
            FeeItem::fixed("Maintenance", 5_000.0, "INR"),
            FeeItem::percentage_of_net("Success fee", 10.0),
        ]);
        let resolved = resolve_year(&fees, &ctx(1, 5.0, 0.0), &inr(), 1_000.0).unwrap();
        assert_eq!(resolved.net_pre_fee, -4_000.0);
        assert_eq!(resolved.success_fee, -400.0);
    }

    #[test]
    fn test_missing_rate_fails_even_when_not_due() {
        let fee = FeeItem::fixed("Euro Opening", 100.0, "EUR").one_time();
        let err = resolve_fee(&fee, &ctx(2, 1.0, 1.0), &inr(), None).unwrap_err();
        assert!(matches!(err, EngineError::MissingRate { .. }));
    }
}
