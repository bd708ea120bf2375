//! Plain-text rendering of an [`EstimatorView`].

use std::fmt;

use rust_decimal::Decimal;
use savings_core::calculations::common::round_half_up;
use savings_core::models::Roi;
use savings_core::{EstimatorView, ScopeMode};

/// `$1,234.56`, rounded half-up to cents.
pub fn money(value: Decimal) -> String {
    let rounded = format!("{:.2}", round_half_up(value).abs());
    let (whole, cents) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if value.is_sign_negative() && !round_half_up(value).is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}${grouped}.{cents}")
}

/// A ratio as a percentage with one decimal place.
pub fn percent(ratio: Decimal) -> String {
    format!("{:.1}%", ratio.saturating_mul(Decimal::ONE_HUNDRED).round_dp(1))
}

pub fn roi_display(roi: &Roi) -> String {
    match roi {
        Roi::Finite(ratio) => percent(*ratio),
        Roi::Unbounded => "∞".to_string(),
    }
}

/// Formats a payback period, using "—" when there is none.
pub fn payback_display(months: &Option<Decimal>) -> String {
    months
        .as_ref()
        .map(|m| format!("{:.1} mo", m.round_dp(1)))
        .unwrap_or_else(|| "—".to_string())
}

/// Text report for the terminal.
pub struct Report<'a>(pub &'a EstimatorView);

impl fmt::Display for Report<'_> {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let view = self.0;

        writeln!(
            f,
            "  {:<16} {:<3} {:>12} {:>12} {:>12} {:>13} {:>9} {:>9}",
            "Category", "On", "Current", "Proposed", "Monthly", "Annual", "ROI", "Payback"
        )?;
        for category in &view.categories {
            let marker = if category.key == view.active { '*' } else { ' ' };
            let kpis = &category.kpis;
            writeln!(
                f,
                "{} {:<16} {:<3} {:>12} {:>12} {:>12} {:>13} {:>9} {:>9}",
                marker,
                category.label,
                if category.inputs.enabled { "yes" } else { "no" },
                money(kpis.current),
                money(kpis.proposed),
                money(kpis.monthly_savings),
                money(kpis.annual_savings),
                roi_display(&kpis.roi),
                payback_display(&kpis.payback_months),
            )?;
        }
        writeln!(f)?;

        let totals = &view.totals;
        let scope = match view.scope {
            ScopeMode::All => "all enabled categories".to_string(),
            ScopeMode::Active => format!("{} only", view.active.label()),
        };
        writeln!(f, "Totals ({scope}, {} counted)", totals.categories)?;
        writeln!(f, "  Current monthly:   {}", money(totals.current))?;
        writeln!(f, "  Proposed monthly:  {}", money(totals.proposed))?;
        writeln!(f, "  Monthly savings:   {}", money(totals.monthly_savings))?;
        writeln!(f, "  Annual savings:    {}", money(totals.annual_savings))?;
        if !totals.named_benefit.is_zero() {
            writeln!(f, "    incl. benefits:  {}", money(totals.named_benefit))?;
        }
        writeln!(f, "  Lifetime savings:  {}", money(totals.lifetime_savings))?;
        writeln!(f, "  One-time cost:     {}", money(totals.one_time_cost))?;
        writeln!(f, "  ROI:               {}", roi_display(&totals.roi))?;
        writeln!(f, "  Payback:           {}", payback_display(&totals.payback_months))?;
        writeln!(f, "  Reduction:         {}", percent(totals.reduction))?;
        writeln!(f)?;

        writeln!(f, "Partner fee (all enabled categories)")?;
        writeln!(f, "  Fee base:          {}", money(view.fees.base))?;
        writeln!(f, "  Fee:               {}", money(view.fees.fee))?;
        writeln!(f, "  Net savings:       {}", money(view.fees.net))?;

        if !view.chart.is_empty() {
            writeln!(f)?;
            writeln!(f, "Annual savings by category")?;
            for point in &view.chart {
                writeln!(f, "  {:<16} {:>13}", point.name, money(point.value))?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // ─── money ───────────────────────────────────────────────────────────────

    #[test]
    fn money_groups_thousands_and_rounds_half_up() {
        assert_eq!(money(dec!(1234567.885)), "$1,234,567.89");
        assert_eq!(money(dec!(999.994)), "$999.99");
        assert_eq!(money(dec!(1000)), "$1,000.00");
        assert_eq!(money(Decimal::ZERO), "$0.00");
    }

    #[test]
    fn money_keeps_sign() {
        assert_eq!(money(dec!(-2500.5)), "-$2,500.50");
        assert_eq!(money(dec!(-0.001)), "$0.00");
    }

    // ─── ratios ──────────────────────────────────────────────────────────────

    #[test]
    fn roi_display_handles_unbounded() {
        assert_eq!(roi_display(&Roi::Finite(dec!(2))), "200.0%");
        assert_eq!(roi_display(&Roi::Unbounded), "∞");
    }

    #[test]
    fn percent_may_be_negative() {
        assert_eq!(percent(dec!(-0.125)), "-12.5%");
    }

    #[test]
    fn percent_saturates_extreme_ratios() {
        assert!(percent(Decimal::MIN).starts_with('-'));
        assert!(percent(Decimal::MAX).ends_with('%'));
    }

    #[test]
    fn payback_display_uses_dash_when_absent() {
        assert_eq!(payback_display(&Some(dec!(4))), "4.0 mo");
        assert_eq!(payback_display(&None), "—");
    }
}
