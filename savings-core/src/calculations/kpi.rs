//! KPI derivation for a single category.
//!
//! | Step | Figure | Rule |
//! |------|--------|------|
//! | 1 | current / proposed | flat: entered totals; perUnit: units × rate |
//! | 2 | monthly savings | max(0, current − proposed) |
//! | 3 | annual savings | monthly × 12 + named benefit |
//! | 4 | lifetime savings | monthly × term, 0 without a term |
//! | 5 | ROI | (annual − one-time) / max(1, one-time); unbounded or 0 without a one-time cost |
//! | 6 | payback | one-time / monthly when both are positive |
//! | 7 | reduction | (current − proposed) / current, not floored |
//!
//! Inputs are expected to be normalized already.

use rust_decimal::Decimal;

use crate::calculations::common::{max, saturating_div, times};
use crate::models::{CategoryInputs, CategoryKey, Kpis, NamedBenefit, PricingMode, Roi};

const MONTHS_PER_YEAR: u32 = 12;

/// Computes the KPIs for one category's effective inputs.
pub fn compute_kpis(
    key: CategoryKey,
    inputs: &CategoryInputs,
) -> Kpis {
    let current = monthly_total(inputs.mode, inputs.units, inputs.current_monthly);
    let proposed = monthly_total(inputs.mode, inputs.units, inputs.proposed_monthly);

    let monthly_savings = max(current.saturating_sub(proposed), Decimal::ZERO);

    let named_benefit = key.named_benefit_label().map(|label| NamedBenefit {
        label,
        amount: times(inputs.benefit_fee_per_unit, inputs.units),
    });
    let benefit_amount = named_benefit
        .as_ref()
        .map_or(Decimal::ZERO, |benefit| benefit.amount);

    let annual_savings = times(monthly_savings, MONTHS_PER_YEAR).saturating_add(benefit_amount);

    let lifetime_savings = if inputs.term_months > 0 {
        times(monthly_savings, inputs.term_months)
    } else {
        Decimal::ZERO
    };

    Kpis {
        current,
        proposed,
        monthly_savings,
        annual_savings,
        lifetime_savings,
        roi: roi(annual_savings, inputs.one_time_cost),
        payback_months: payback_months(inputs.one_time_cost, monthly_savings),
        reduction: reduction(current, proposed),
        named_benefit,
    }
}

/// Monthly total for an entered figure under `mode`.
pub fn monthly_total(
    mode: PricingMode,
    units: u32,
    rate: Decimal,
) -> Decimal {
    match mode {
        PricingMode::Flat => rate,
        PricingMode::PerUnit => times(rate, units),
    }
}

/// ROI of `annual_savings` against `one_time_cost`.
///
/// The denominator is floored at 1 so sub-unit costs do not inflate the ratio.
pub fn roi(
    annual_savings: Decimal,
    one_time_cost: Decimal,
) -> Roi {
    if one_time_cost > Decimal::ZERO {
        Roi::Finite(saturating_div(
            annual_savings.saturating_sub(one_time_cost),
            max(Decimal::ONE, one_time_cost),
        ))
    } else if annual_savings > Decimal::ZERO {
        Roi::Unbounded
    } else {
        Roi::Finite(Decimal::ZERO)
    }
}

/// Months until savings repay the one-time cost.
pub fn payback_months(
    one_time_cost: Decimal,
    monthly_savings: Decimal,
) -> Option<Decimal> {
    if one_time_cost > Decimal::ZERO && monthly_savings > Decimal::ZERO {
        Some(saturating_div(one_time_cost, monthly_savings))
    } else {
        None
    }
}

/// Fractional reduction of the monthly total. Negative when the proposal
/// costs more.
pub fn reduction(
    current: Decimal,
    proposed: Decimal,
) -> Decimal {
    if current > Decimal::ZERO {
        saturating_div(current.saturating_sub(proposed), current)
    } else {
        Decimal::ZERO
    }
}
