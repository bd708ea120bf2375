use rust_decimal::Decimal;
use serde::Serialize;

use super::category::{AgreementType, PricingMode};

/// User-entered figures for one category.
///
/// The UI layer always hands the core a complete record; fields are never
/// patched individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryInputs {
    pub mode: PricingMode,

    /// Billable count (doors, seats, lines).
    pub units: u32,

    /// Monthly total (flat) or per-unit rate (perUnit) paid today.
    pub current_monthly: Decimal,

    /// Monthly total (flat) or per-unit rate (perUnit) after the change.
    pub proposed_monthly: Decimal,

    /// Upfront cost attributable to the change.
    pub one_time_cost: Decimal,

    /// Contract horizon used for lifetime savings. 0 means not applicable.
    pub term_months: u32,

    /// Whether the category counts toward totals and the chart.
    pub enabled: bool,

    // Category-specific fields, read only by the normalization rules and
    // the named-benefit computation.
    pub agreement: AgreementType,
    pub resale_price: Decimal,
    pub benefit_fee_per_unit: Decimal,
    pub bundled: bool,
}

impl Default for CategoryInputs {
    fn default() -> Self {
        Self {
            mode: PricingMode::PerUnit,
            units: 0,
            current_monthly: Decimal::ZERO,
            proposed_monthly: Decimal::ZERO,
            one_time_cost: Decimal::ZERO,
            term_months: 0,
            enabled: true,
            agreement: AgreementType::Standard,
            resale_price: Decimal::ZERO,
            benefit_fee_per_unit: Decimal::ZERO,
            bundled: false,
        }
    }
}

impl CategoryInputs {
    /// Returns a copy with every decimal field floored at zero.
    pub fn clamped(&self) -> Self {
        let floor = |d: Decimal| d.max(Decimal::ZERO);
        Self {
            current_monthly: floor(self.current_monthly),
            proposed_monthly: floor(self.proposed_monthly),
            one_time_cost: floor(self.one_time_cost),
            resale_price: floor(self.resale_price),
            benefit_fee_per_unit: floor(self.benefit_fee_per_unit),
            ..self.clone()
        }
    }

    /// Whether any usage has been entered for this category.
    pub fn has_usage(&self) -> bool {
        self.units > 0 || self.current_monthly > Decimal::ZERO
    }
}
