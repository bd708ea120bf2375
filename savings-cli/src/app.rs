use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::Args;
use savings_core::input::{parse_amount, parse_count, parse_flag};
use savings_core::models::{AgreementType, CategoryInputs, PricingMode};
use savings_core::store::{MemoryLocation, SnapshotStore, StoreRegistry};
use savings_core::{Estimator, StateReconciler};
use savings_store_sqlite::SqliteStoreFactory;
use tracing::debug;

use crate::config::EstimatorConfig;

/// Build a [`StoreRegistry`] with every compiled-in backend.
pub fn build_registry() -> StoreRegistry {
    let mut registry = StoreRegistry::default();
    registry.register(Box::new(SqliteStoreFactory));
    registry
}

/// A running estimator together with the location it syncs to.
pub struct Session {
    pub estimator: Estimator,
    pub location: Arc<MemoryLocation>,
}

/// Opens the configured store and loads the startup state.
///
/// `link` is a previously shared URL whose state takes precedence over the
/// persisted snapshot.
pub async fn open_session(
    config: &EstimatorConfig,
    link: Option<&str>,
) -> Result<Session> {
    debug!(backend = %config.store.backend, "opening snapshot store");
    let store: Arc<dyn SnapshotStore> = build_registry()
        .create(&config.store)
        .await
        .with_context(|| {
            format!(
                "failed to open '{}' store at '{}'",
                config.store.backend, config.store.connection_string
            )
        })?
        .into();

    let location = Arc::new(MemoryLocation::new(
        link.unwrap_or(config.share.base_url.as_str()),
    ));
    let reconciler =
        StateReconciler::new(store, location.clone()).with_share_param(config.share.param.clone());
    let estimator = Estimator::open(reconciler, config.fees.clone()).await;

    Ok(Session {
        estimator,
        location,
    })
}

/// Field values for `savings set`. Omitted fields keep the category's
/// current value.
#[derive(Debug, Clone, Default, Args)]
pub struct CategoryEdit {
    /// Pricing mode: `flat` or `perUnit`.
    #[arg(long)]
    pub mode: Option<String>,

    #[arg(long)]
    pub units: Option<String>,

    /// Current monthly total (flat) or per-unit rate (perUnit).
    #[arg(long)]
    pub current: Option<String>,

    /// Proposed monthly total (flat) or per-unit rate (perUnit).
    #[arg(long)]
    pub proposed: Option<String>,

    #[arg(long = "one-time-cost")]
    pub one_time_cost: Option<String>,

    /// Contract term in months.
    #[arg(long)]
    pub term: Option<String>,

    /// `standard` or `resale`.
    #[arg(long)]
    pub agreement: Option<String>,

    #[arg(long = "resale-price")]
    pub resale_price: Option<String>,

    #[arg(long = "benefit-fee")]
    pub benefit_fee_per_unit: Option<String>,

    #[arg(long)]
    pub bundled: Option<String>,
}

impl CategoryEdit {
    /// The whole record that results from applying this edit to `base`.
    pub fn apply(
        &self,
        base: &CategoryInputs,
    ) -> Result<CategoryInputs> {
        let mut inputs = base.clone();

        if let Some(mode) = &self.mode {
            inputs.mode = match PricingMode::parse(mode.trim()) {
                Some(mode) => mode,
                None => bail!("unknown pricing mode '{mode}' (expected flat or perUnit)"),
            };
        }
        if let Some(agreement) = &self.agreement {
            inputs.agreement = match AgreementType::parse(agreement.trim()) {
                Some(agreement) => agreement,
                None => bail!("unknown agreement '{agreement}' (expected standard or resale)"),
            };
        }
        if let Some(bundled) = &self.bundled {
            inputs.bundled = match parse_flag(bundled) {
                Some(bundled) => bundled,
                None => bail!("expected true or false for --bundled, got '{bundled}'"),
            };
        }

        if let Some(units) = &self.units {
            inputs.units = parse_count(units);
        }
        if let Some(term) = &self.term {
            inputs.term_months = parse_count(term);
        }
        for (value, field) in [
            (&self.current, &mut inputs.current_monthly),
            (&self.proposed, &mut inputs.proposed_monthly),
            (&self.one_time_cost, &mut inputs.one_time_cost),
            (&self.resale_price, &mut inputs.resale_price),
            (&self.benefit_fee_per_unit, &mut inputs.benefit_fee_per_unit),
        ] {
            if let Some(value) = value {
                *field = parse_amount(value);
            }
        }

        Ok(inputs)
    }
}
