use rust_decimal::Decimal;
use serde::ser::{Serialize, Serializer};

use super::category::CategoryKey;

/// Return on the one-time cost.
///
/// A change with no upfront cost and positive savings has no finite ROI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Roi {
    Finite(Decimal),
    Unbounded,
}

impl Roi {
    pub fn is_unbounded(&self) -> bool {
        matches!(self, Self::Unbounded)
    }
}

impl Serialize for Roi {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match self {
            Self::Finite(value) => Serialize::serialize(value, serializer),
            Self::Unbounded => serializer.serialize_str("Infinity"),
        }
    }
}

/// A category-specific one-time-style benefit folded into annual savings.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct NamedBenefit {
    pub label: &'static str,
    pub amount: Decimal,
}

/// Financial outputs for one category. Derived, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Kpis {
    /// Current monthly total.
    pub current: Decimal,
    /// Proposed monthly total.
    pub proposed: Decimal,
    /// Never negative.
    pub monthly_savings: Decimal,
    /// Monthly savings × 12 plus the named benefit.
    pub annual_savings: Decimal,
    pub lifetime_savings: Decimal,
    pub roi: Roi,
    /// `None` when either the one-time cost or the monthly savings is zero.
    pub payback_months: Option<Decimal>,
    /// Fractional change of the monthly total; negative for increases.
    pub reduction: Decimal,
    pub named_benefit: Option<NamedBenefit>,
}

impl Kpis {
    pub fn named_benefit_amount(&self) -> Decimal {
        self.named_benefit
            .as_ref()
            .map_or(Decimal::ZERO, |benefit| benefit.amount)
    }
}

/// Which categories an aggregation covers (after the enabled filter).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    All,
    Selected(CategoryKey),
}

impl Scope {
    pub fn includes(
        &self,
        key: CategoryKey,
    ) -> bool {
        match self {
            Self::All => true,
            Self::Selected(active) => *active == key,
        }
    }
}

/// Portfolio-level sums over the categories selected by a [`Scope`].
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Totals {
    pub categories: usize,
    pub units: u64,
    pub current: Decimal,
    pub proposed: Decimal,
    pub monthly_savings: Decimal,
    pub annual_savings: Decimal,
    pub lifetime_savings: Decimal,
    pub named_benefit: Decimal,
    /// Sum of the raw one-time cost inputs.
    pub one_time_cost: Decimal,
    pub roi: Roi,
    pub payback_months: Option<Decimal>,
    pub reduction: Decimal,
}

/// Partner fee and the savings left after it.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeeSummary {
    pub base: Decimal,
    pub fee: Decimal,
    pub net: Decimal,
}

/// One slice of the savings chart.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ChartPoint {
    pub name: String,
    pub value: Decimal,
}
