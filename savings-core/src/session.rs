//! The interactive estimator session.
//!
//! Holds the working state and the view-only selections (active category
//! and scope). Every mutation is a whole-record or whole-map replacement
//! followed by one reconciler sync.

use std::fmt;

use serde::Serialize;
use tracing::{debug, info};

use crate::calculations::{FeeSchedule, aggregate, chart_series, compute_kpis, fee_summary};
use crate::models::{
    CategoryInputs, CategoryKey, ChartPoint, FeeSummary, Kpis, PortfolioState, Scope, Totals,
};
use crate::reconcile::StateReconciler;

/// Whether totals cover every enabled category or only the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeMode {
    #[default]
    All,
    Active,
}

impl ScopeMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Active => "active",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "all" => Some(Self::All),
            "active" | "selected" => Some(Self::Active),
            _ => None,
        }
    }
}

impl fmt::Display for ScopeMode {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One category as the UI shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryView {
    pub key: CategoryKey,
    pub label: &'static str,
    pub inputs: CategoryInputs,
    pub kpis: Kpis,
}

/// Everything needed to render the estimator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimatorView {
    pub active: CategoryKey,
    pub scope: ScopeMode,
    pub categories: Vec<CategoryView>,
    pub totals: Totals,
    pub fees: FeeSummary,
    pub chart: Vec<ChartPoint>,
}

pub struct Estimator {
    state: PortfolioState,
    active: CategoryKey,
    scope: ScopeMode,
    fees: FeeSchedule,
    reconciler: StateReconciler,
}

impl Estimator {
    /// Loads the startup state through `reconciler`.
    pub async fn open(
        reconciler: StateReconciler,
        fees: FeeSchedule,
    ) -> Self {
        let state = reconciler.load().await;
        info!(
            enabled = state.iter().filter(|(_, inputs)| inputs.enabled).count(),
            "estimator opened"
        );
        Self {
            state,
            active: CategoryKey::ALL[0],
            scope: ScopeMode::default(),
            fees,
            reconciler,
        }
    }

    pub fn state(&self) -> &PortfolioState {
        &self.state
    }

    pub fn active(&self) -> CategoryKey {
        self.active
    }

    pub fn scope_mode(&self) -> ScopeMode {
        self.scope
    }

    pub fn fees(&self) -> &FeeSchedule {
        &self.fees
    }

    /// The aggregation scope implied by the current selections.
    pub fn scope(&self) -> Scope {
        match self.scope {
            ScopeMode::All => Scope::All,
            ScopeMode::Active => Scope::Selected(self.active),
        }
    }

    pub fn view(&self) -> EstimatorView {
        let scope = self.scope();
        let categories = self
            .state
            .iter()
            .map(|(key, inputs)| CategoryView {
                key,
                label: key.label(),
                inputs: inputs.clone(),
                kpis: compute_kpis(key, inputs),
            })
            .collect();

        EstimatorView {
            active: self.active,
            scope: self.scope,
            categories,
            totals: aggregate(&self.state, scope),
            fees: fee_summary(&self.state, &self.fees),
            chart: chart_series(&self.state, scope),
        }
    }

    /// Replaces one category's record with a normalized copy of `inputs`.
    pub async fn replace_category(
        &mut self,
        key: CategoryKey,
        inputs: CategoryInputs,
    ) {
        let normalized = self.reconciler.registry().normalize(key, &inputs);
        debug!(category = %key, "replacing category record");
        self.state.replace(key, normalized);
        self.sync().await;
    }

    /// Replaces several records at once, then syncs once.
    pub async fn replace_categories(
        &mut self,
        records: Vec<(CategoryKey, CategoryInputs)>,
    ) {
        for (key, inputs) in records {
            let normalized = self.reconciler.registry().normalize(key, &inputs);
            self.state.replace(key, normalized);
        }
        self.sync().await;
    }

    pub async fn set_enabled(
        &mut self,
        key: CategoryKey,
        enabled: bool,
    ) {
        let inputs = CategoryInputs {
            enabled,
            ..self.state.get(key).clone()
        };
        self.replace_category(key, inputs).await;
    }

    /// Resets every category to the zeroed record.
    pub async fn clear(&mut self) {
        self.replace_state(PortfolioState::zeroed()).await;
    }

    /// Loads the walkthrough scenario.
    pub async fn load_demo(&mut self) {
        self.replace_state(PortfolioState::demo()).await;
    }

    pub fn set_scope(
        &mut self,
        scope: ScopeMode,
    ) {
        self.scope = scope;
    }

    pub fn set_active(
        &mut self,
        key: CategoryKey,
    ) {
        self.active = key;
    }

    pub async fn share_url(&self) -> Option<String> {
        self.reconciler.share_url(&self.state).await
    }

    async fn replace_state(
        &mut self,
        state: PortfolioState,
    ) {
        self.state = self.reconciler.registry().normalize_state(&state);
        self.sync().await;
    }

    async fn sync(&self) {
        self.reconciler.on_change(&self.state).await;
    }
}
