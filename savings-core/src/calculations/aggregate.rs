//! Portfolio totals and chart series.
//!
//! Both passes keep only enabled categories, then apply the [`Scope`].

use rust_decimal::Decimal;

use crate::calculations::kpi::{compute_kpis, payback_months, reduction, roi};
use crate::models::{CategoryInputs, CategoryKey, ChartPoint, Kpis, PortfolioState, Scope, Totals};

/// Enabled categories within `scope`, with their KPIs, in display order.
pub fn included(
    state: &PortfolioState,
    scope: Scope,
) -> impl Iterator<Item = (CategoryKey, &CategoryInputs, Kpis)> {
    state
        .iter()
        .filter(move |(key, inputs)| inputs.enabled && scope.includes(*key))
        .map(|(key, inputs)| (key, inputs, compute_kpis(key, inputs)))
}

/// Sums KPIs across the enabled categories in `scope`.
///
/// Portfolio ROI, payback and reduction are derived from the summed
/// figures rather than summed themselves.
pub fn aggregate(
    state: &PortfolioState,
    scope: Scope,
) -> Totals {
    let mut totals = Totals {
        categories: 0,
        units: 0,
        current: Decimal::ZERO,
        proposed: Decimal::ZERO,
        monthly_savings: Decimal::ZERO,
        annual_savings: Decimal::ZERO,
        lifetime_savings: Decimal::ZERO,
        named_benefit: Decimal::ZERO,
        one_time_cost: Decimal::ZERO,
        roi: roi(Decimal::ZERO, Decimal::ZERO),
        payback_months: None,
        reduction: Decimal::ZERO,
    };

    for (_, inputs, kpis) in included(state, scope) {
        totals.categories += 1;
        totals.units += u64::from(inputs.units);
        totals.current = totals.current.saturating_add(kpis.current);
        totals.proposed = totals.proposed.saturating_add(kpis.proposed);
        totals.monthly_savings = totals.monthly_savings.saturating_add(kpis.monthly_savings);
        totals.annual_savings = totals.annual_savings.saturating_add(kpis.annual_savings);
        totals.lifetime_savings = totals.lifetime_savings.saturating_add(kpis.lifetime_savings);
        totals.named_benefit = totals.named_benefit.saturating_add(kpis.named_benefit_amount());
        totals.one_time_cost = totals.one_time_cost.saturating_add(inputs.one_time_cost);
    }

    totals.roi = roi(totals.annual_savings, totals.one_time_cost);
    totals.payback_months = payback_months(totals.one_time_cost, totals.monthly_savings);
    totals.reduction = reduction(totals.current, totals.proposed);
    totals
}

/// One chart slice per category with positive annual savings.
pub fn chart_series(
    state: &PortfolioState,
    scope: Scope,
) -> Vec<ChartPoint> {
    included(state, scope)
        .filter(|(_, _, kpis)| kpis.annual_savings > Decimal::ZERO)
        .map(|(key, _, kpis)| ChartPoint {
            name: key.label().to_string(),
            value: kpis.annual_savings,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;
    use crate::models::{PricingMode, Roi};

    fn flat(
        current: Decimal,
        proposed: Decimal,
    ) -> CategoryInputs {
        CategoryInputs {
            mode: PricingMode::Flat,
            current_monthly: current,
            proposed_monthly: proposed,
            ..Default::default()
        }
    }

    fn sample_state() -> PortfolioState {
        let mut state = PortfolioState::zeroed();
        state.replace(
            CategoryKey::Internet,
            CategoryInputs {
                one_time_cost: dec!(600),
                term_months: 10,
                ..flat(dec!(500), dec!(400))
            },
        );
        state.replace(CategoryKey::Voice, flat(dec!(100), dec!(150)));
        state.replace(
            CategoryKey::Wifi,
            CategoryInputs {
                enabled: false,
                ..flat(dec!(1000), dec!(0))
            },
        );
        state
    }

    // =========================================================================
    // aggregate tests
    // =========================================================================

    #[test]
    fn aggregate_sums_enabled_categories() {
        let totals = aggregate(&sample_state(), Scope::All);

        // Internet, voice, video and access control are enabled (the latter two empty).
        assert_eq!(totals.categories, 4);
        assert_eq!(totals.current, dec!(600));
        assert_eq!(totals.proposed, dec!(550));
        assert_eq!(totals.monthly_savings, dec!(100));
        assert_eq!(totals.annual_savings, dec!(1200));
        assert_eq!(totals.lifetime_savings, dec!(1000));
        assert_eq!(totals.one_time_cost, dec!(600));
    }

    #[test]
    fn aggregate_derives_portfolio_ratios_from_sums() {
        let totals = aggregate(&sample_state(), Scope::All);

        assert_eq!(totals.roi, Roi::Finite(dec!(1)));
        assert_eq!(totals.payback_months, Some(dec!(6)));
        assert_eq!(totals.reduction, dec!(50) / dec!(600));
    }

    #[test]
    fn aggregate_selected_scope_keeps_only_active_category() {
        let totals = aggregate(&sample_state(), Scope::Selected(CategoryKey::Voice));

        assert_eq!(totals.categories, 1);
        assert_eq!(totals.current, dec!(100));
        assert_eq!(totals.monthly_savings, Decimal::ZERO);
        assert_eq!(totals.reduction, dec!(-0.5));
    }

    #[test]
    fn aggregate_selected_scope_on_disabled_category_is_empty() {
        let totals = aggregate(&sample_state(), Scope::Selected(CategoryKey::Wifi));

        assert_eq!(totals.categories, 0);
        assert_eq!(totals.current, Decimal::ZERO);
        assert_eq!(totals.roi, Roi::Finite(Decimal::ZERO));
    }

    #[test]
    fn aggregate_sums_raw_one_time_cost_even_without_savings() {
        let mut state = PortfolioState::zeroed();
        state.replace(
            CategoryKey::Wifi,
            CategoryInputs {
                one_time_cost: dec!(250),
                ..Default::default()
            },
        );

        let totals = aggregate(&state, Scope::All);

        assert_eq!(totals.one_time_cost, dec!(250));
        assert_eq!(totals.payback_months, None);
    }

    // =========================================================================
    // chart_series tests
    // =========================================================================

    #[test]
    fn chart_series_skips_categories_without_savings() {
        let series = chart_series(&sample_state(), Scope::All);

        assert_eq!(
            series,
            vec![ChartPoint {
                name: "Bulk Internet".to_string(),
                value: dec!(1200),
            }]
        );
    }

    #[test]
    fn chart_series_respects_scope() {
        let series = chart_series(&sample_state(), Scope::Selected(CategoryKey::Voice));

        assert!(series.is_empty());
    }

    // =========================================================================
    // extreme input tests
    // =========================================================================

    #[test]
    fn aggregate_saturates_instead_of_overflowing() {
        let mut state = PortfolioState::zeroed();
        state.replace(CategoryKey::Internet, flat(Decimal::MAX, Decimal::ZERO));
        state.replace(CategoryKey::Wifi, flat(Decimal::MAX, Decimal::ZERO));
        state.replace(
            CategoryKey::Voice,
            CategoryInputs {
                one_time_cost: Decimal::MAX,
                ..flat(dec!(0.0000000000000000000001), Decimal::ZERO)
            },
        );

        let totals = aggregate(&state, Scope::All);

        assert_eq!(totals.current, Decimal::MAX);
        assert_eq!(totals.monthly_savings, Decimal::MAX);
        assert_eq!(totals.annual_savings, Decimal::MAX);
        assert_eq!(totals.one_time_cost, Decimal::MAX);
        assert_eq!(totals.payback_months, Some(Decimal::ONE));
        assert_eq!(totals.reduction, Decimal::ONE);
    }
}
