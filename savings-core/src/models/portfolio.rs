use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeMap, Serializer};

use super::category::{CategoryKey, PricingMode};
use super::inputs::CategoryInputs;

/// Inputs for every category, exactly one record per [`CategoryKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioState {
    categories: [CategoryInputs; CategoryKey::COUNT],
}

impl PortfolioState {
    /// The all-zero map used as the lowest reconciliation layer and by "clear".
    pub fn zeroed() -> Self {
        Self {
            categories: std::array::from_fn(|_| CategoryInputs::default()),
        }
    }

    /// A populated scenario for walkthroughs. Not normalized.
    pub fn demo() -> Self {
        let mut state = Self::zeroed();
        state.replace(
            CategoryKey::Internet,
            CategoryInputs {
                units: 120,
                current_monthly: Decimal::new(65, 0),
                proposed_monthly: Decimal::new(45, 0),
                term_months: 60,
                ..Default::default()
            },
        );
        state.replace(
            CategoryKey::Voice,
            CategoryInputs {
                units: 40,
                current_monthly: Decimal::new(3999, 2),
                term_months: 36,
                ..Default::default()
            },
        );
        state.replace(
            CategoryKey::Video,
            CategoryInputs {
                units: 120,
                current_monthly: Decimal::new(55, 0),
                term_months: 60,
                bundled: true,
                ..Default::default()
            },
        );
        state.replace(
            CategoryKey::AccessControl,
            CategoryInputs {
                mode: PricingMode::Flat,
                units: 120,
                current_monthly: Decimal::new(850, 0),
                proposed_monthly: Decimal::new(600, 0),
                one_time_cost: Decimal::new(4000, 0),
                term_months: 36,
                benefit_fee_per_unit: Decimal::new(25, 0),
                ..Default::default()
            },
        );
        state.replace(
            CategoryKey::Wifi,
            CategoryInputs {
                mode: PricingMode::Flat,
                current_monthly: Decimal::new(1200, 0),
                proposed_monthly: Decimal::new(950, 0),
                term_months: 36,
                ..Default::default()
            },
        );
        state
    }

    pub fn get(
        &self,
        key: CategoryKey,
    ) -> &CategoryInputs {
        &self.categories[key.index()]
    }

    /// Replaces the whole record for `key`.
    pub fn replace(
        &mut self,
        key: CategoryKey,
        inputs: CategoryInputs,
    ) {
        self.categories[key.index()] = inputs;
    }

    /// Records in display order.
    pub fn iter(&self) -> impl Iterator<Item = (CategoryKey, &CategoryInputs)> {
        CategoryKey::ALL.into_iter().zip(self.categories.iter())
    }

    /// Builds a new state by mapping every record.
    pub fn map<F>(
        &self,
        mut f: F,
    ) -> Self
    where
        F: FnMut(CategoryKey, &CategoryInputs) -> CategoryInputs,
    {
        Self {
            categories: std::array::from_fn(|idx| {
                let key = CategoryKey::ALL[idx];
                f(key, &self.categories[idx])
            }),
        }
    }
}

impl Default for PortfolioState {
    fn default() -> Self {
        Self::zeroed()
    }
}

impl Serialize for PortfolioState {
    fn serialize<S: Serializer>(
        &self,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(CategoryKey::COUNT))?;
        for (key, inputs) in self.iter() {
            map.serialize_entry(key.as_str(), inputs)?;
        }
        map.end()
    }
}
