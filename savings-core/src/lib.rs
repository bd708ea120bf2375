//! Core of the savings estimator: the category model, normalization, KPI
//! and portfolio calculations, state reconciliation and storage ports.

pub mod calculations;
pub mod embed;
pub mod input;
pub mod models;
pub mod reconcile;
pub mod session;
pub mod store;

pub use calculations::{FeeSchedule, NormalizationRegistry};
pub use models::{CategoryInputs, CategoryKey, PortfolioState, Scope};
pub use reconcile::StateReconciler;
pub use session::{Estimator, EstimatorView, ScopeMode};
