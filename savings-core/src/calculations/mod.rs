//! Savings calculations: normalization, per-category KPIs, portfolio
//! aggregation and the partner fee.

pub mod aggregate;
pub mod common;
pub mod fee;
pub mod kpi;
pub mod normalize;

pub use aggregate::{aggregate, chart_series};
pub use fee::{FeeSchedule, fee_summary};
pub use kpi::compute_kpis;
pub use normalize::{NormalizationRegistry, NormalizationRule, normalize};
