//! Per-category normalization rules.
//!
//! Normalization derives the effective inputs the KPI calculator sees from
//! what the user entered: it forces pricing modes, fixes proposed rates and
//! one-time costs, and substitutes derived current rates. Every rule is a
//! pure, total and idempotent function of a single record.
//!
//! | Category | Rule |
//! |----------|------|
//! | `internet` | perUnit; standard agreement → fixed install cost; resale agreement → current rate = resale price, no install cost |
//! | `voice` | perUnit; fixed line rate when usage is entered, otherwise 0 |
//! | `video` | perUnit; bundled → 0, otherwise the fixed video rate |
//! | others | unchanged |
//!
//! All records are floored at zero before their rule runs.

use std::collections::HashMap;
use std::sync::OnceLock;

use rust_decimal::Decimal;

use crate::models::{AgreementType, CategoryInputs, CategoryKey, PortfolioState, PricingMode};

/// Install cost charged under a standard internet agreement.
pub const INTERNET_INSTALL_COST: Decimal = Decimal::from_parts(2500, 0, 0, false, 0);

/// Fixed per-line voice rate.
pub const VOICE_LINE_RATE: Decimal = Decimal::from_parts(2499, 0, 0, false, 2);

/// Fixed per-unit video rate when video is not bundled.
pub const VIDEO_UNIT_RATE: Decimal = Decimal::from_parts(1500, 0, 0, false, 2);

/// A normalization rule for one category.
pub type NormalizationRule = fn(CategoryInputs) -> CategoryInputs;

/// Maps categories to their normalization rule.
///
/// Categories without a registered rule pass through unchanged (apart from
/// the zero floor).
#[derive(Debug, Clone)]
pub struct NormalizationRegistry {
    rules: HashMap<CategoryKey, NormalizationRule>,
}

impl NormalizationRegistry {
    /// A registry with no rules.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Registers `rule` for `key`, replacing any existing rule.
    pub fn register(
        &mut self,
        key: CategoryKey,
        rule: NormalizationRule,
    ) {
        self.rules.insert(key, rule);
    }

    pub fn has_rule(
        &self,
        key: CategoryKey,
    ) -> bool {
        self.rules.contains_key(&key)
    }

    /// Returns the effective inputs for one category.
    pub fn normalize(
        &self,
        key: CategoryKey,
        inputs: &CategoryInputs,
    ) -> CategoryInputs {
        let clamped = inputs.clamped();
        match self.rules.get(&key) {
            Some(rule) => rule(clamped),
            None => clamped,
        }
    }

    /// Normalizes every record of `state`.
    pub fn normalize_state(
        &self,
        state: &PortfolioState,
    ) -> PortfolioState {
        state.map(|key, inputs| self.normalize(key, inputs))
    }
}

impl Default for NormalizationRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(CategoryKey::Internet, internet_rule);
        registry.register(CategoryKey::Voice, voice_rule);
        registry.register(CategoryKey::Video, video_rule);
        registry
    }
}

/// Normalizes with the default rule set.
pub fn normalize(
    key: CategoryKey,
    inputs: &CategoryInputs,
) -> CategoryInputs {
    static DEFAULT: OnceLock<NormalizationRegistry> = OnceLock::new();
    DEFAULT
        .get_or_init(NormalizationRegistry::default)
        .normalize(key, inputs)
}

fn internet_rule(mut inputs: CategoryInputs) -> CategoryInputs {
    inputs.mode = PricingMode::PerUnit;
    match inputs.agreement {
        AgreementType::Standard => {
            inputs.one_time_cost = INTERNET_INSTALL_COST;
        }
        AgreementType::Resale => {
            inputs.current_monthly = inputs.resale_price;
            inputs.one_time_cost = Decimal::ZERO;
        }
    }
    inputs
}

// An unused service carries no fixed proposed charge.
fn voice_rule(mut inputs: CategoryInputs) -> CategoryInputs {
    inputs.mode = PricingMode::PerUnit;
    inputs.proposed_monthly = if inputs.has_usage() {
        VOICE_LINE_RATE
    } else {
        Decimal::ZERO
    };
    inputs
}

fn video_rule(mut inputs: CategoryInputs) -> CategoryInputs {
    inputs.mode = PricingMode::PerUnit;
    inputs.proposed_monthly = if inputs.bundled {
        Decimal::ZERO
    } else {
        VIDEO_UNIT_RATE
    };
    inputs
}
