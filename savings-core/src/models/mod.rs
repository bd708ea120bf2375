mod category;
mod inputs;
mod kpis;
mod portfolio;

pub use category::{AgreementType, CategoryKey, PricingMode};
pub use inputs::CategoryInputs;
pub use kpis::{ChartPoint, FeeSummary, Kpis, NamedBenefit, Roi, Scope, Totals};
pub use portfolio::PortfolioState;
