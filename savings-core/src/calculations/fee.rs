//! Partner fee and net savings.
//!
//! The fee pass always covers every enabled category, independent of the
//! scope used for headline totals. Its base excludes named benefits and is
//! floored per category before summing; the headline annual total is not.

use rust_decimal::Decimal;
use serde::Deserialize;

use crate::calculations::aggregate::included;
use crate::calculations::common::max;
use crate::models::{CategoryKey, FeeSummary, PortfolioState, Scope};

/// Revenue-share terms applied to the fee base.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FeeSchedule {
    /// Share of the fee base, e.g. `0.10` for 10%.
    pub rate: Decimal,
    /// Added to the fee whenever `surcharge_category` is enabled.
    pub flat_surcharge: Decimal,
    pub surcharge_category: CategoryKey,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            rate: Decimal::new(10, 2),
            flat_surcharge: Decimal::new(1500, 0),
            surcharge_category: CategoryKey::AccessControl,
        }
    }
}

/// Computes the fee and net savings over every enabled category.
pub fn fee_summary(
    state: &PortfolioState,
    schedule: &FeeSchedule,
) -> FeeSummary {
    let mut base = Decimal::ZERO;
    let mut annual_savings = Decimal::ZERO;

    for (_, _, kpis) in included(state, Scope::All) {
        let billable = kpis.annual_savings.saturating_sub(kpis.named_benefit_amount());
        base = base.saturating_add(max(billable, Decimal::ZERO));
        annual_savings = annual_savings.saturating_add(kpis.annual_savings);
    }

    let surcharge = if state.get(schedule.surcharge_category).enabled {
        schedule.flat_surcharge
    } else {
        Decimal::ZERO
    };

    let fee = schedule.rate.saturating_mul(base).saturating_add(surcharge);

    FeeSummary {
        base,
        fee,
        net: max(annual_savings.saturating_sub(fee), Decimal::ZERO),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{CategoryInputs, PricingMode};

    fn schedule() -> FeeSchedule {
        FeeSchedule {
            rate: dec!(0.10),
            flat_surcharge: dec!(500),
            surcharge_category: CategoryKey::AccessControl,
        }
    }

    fn all_disabled() -> PortfolioState {
        PortfolioState::zeroed().map(|_, inputs| CategoryInputs {
            enabled: false,
            ..inputs.clone()
        })
    }

    #[test]
    fn named_benefit_is_excluded_from_fee_base() {
        let mut state = all_disabled();
        state.replace(
            CategoryKey::AccessControl,
            CategoryInputs {
                mode: PricingMode::Flat,
                units: 5,
                current_monthly: dec!(100),
                proposed_monthly: dec!(50),
                benefit_fee_per_unit: dec!(200),
                ..Default::default()
            },
        );

        let summary = fee_summary(&state, &schedule());

        // annual = 600 + 1000 benefit; base = 600.
        assert_eq!(summary.base, dec!(600));
        assert_eq!(summary.fee, dec!(560));
        assert_eq!(summary.net, dec!(1040));
    }

    #[test]
    fn surcharge_applies_only_when_surcharge_category_enabled() {
        let mut state = all_disabled();
        state.replace(
            CategoryKey::Wifi,
            CategoryInputs {
                mode: PricingMode::Flat,
                current_monthly: dec!(200),
                proposed_monthly: dec!(100),
                ..Default::default()
            },
        );

        let summary = fee_summary(&state, &schedule());

        assert_eq!(summary.base, dec!(1200));
        assert_eq!(summary.fee, dec!(120));
        assert_eq!(summary.net, dec!(1080));
    }

    #[test]
    fn net_is_floored_at_zero() {
        let mut state = all_disabled();
        state.replace(CategoryKey::AccessControl, CategoryInputs::default());

        let summary = fee_summary(&state, &schedule());

        assert_eq!(summary.base, Decimal::ZERO);
        assert_eq!(summary.fee, dec!(500));
        assert_eq!(summary.net, Decimal::ZERO);
    }

    #[test]
    fn fee_covers_every_enabled_category() {
        let mut state = PortfolioState::zeroed();
        state.replace(
            CategoryKey::Internet,
            CategoryInputs {
                mode: PricingMode::Flat,
                current_monthly: dec!(300),
                proposed_monthly: dec!(200),
                ..Default::default()
            },
        );
        state.replace(
            CategoryKey::Wifi,
            CategoryInputs {
                mode: PricingMode::Flat,
                current_monthly: dec!(50),
                ..Default::default()
            },
        );

        let summary = fee_summary(&state, &schedule());

        // (1200 + 600) × 10% + surcharge (access control enabled by default).
        assert_eq!(summary.base, dec!(1800));
        assert_eq!(summary.fee, dec!(680));
        assert_eq!(summary.net, dec!(1120));
    }

    #[test]
    fn default_schedule_matches_published_terms() {
        let schedule = FeeSchedule::default();

        assert_eq!(schedule.rate, dec!(0.10));
        assert_eq!(schedule.flat_surcharge, dec!(1500));
        assert_eq!(schedule.surcharge_category, CategoryKey::AccessControl);
    }

    #[test]
    fn huge_savings_saturate_base_and_fee() {
        let mut state = PortfolioState::zeroed();
        for key in [CategoryKey::Internet, CategoryKey::Wifi] {
            state.replace(
                key,
                CategoryInputs {
                    mode: PricingMode::Flat,
                    current_monthly: Decimal::MAX,
                    ..Default::default()
                },
            );
        }
        let steep = FeeSchedule {
            rate: dec!(2),
            ..schedule()
        };

        let summary = fee_summary(&state, &steep);

        assert_eq!(summary.base, Decimal::MAX);
        assert_eq!(summary.fee, Decimal::MAX);
        assert_eq!(summary.net, Decimal::ZERO);
    }
}
