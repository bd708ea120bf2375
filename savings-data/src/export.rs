//! Savings-data export.
//!
//! ## CSV
//!
//! One row per enabled category in the chosen scope, in display order,
//! followed by a `Total` row. Money columns are rounded half-up to cents.
//!
//! | Column | Category row | `Total` row |
//! |--------|--------------|-------------|
//! | `category` | key, e.g. `access_control` | `Total` |
//! | `mode` | `flat` / `perUnit` | empty |
//! | `units` | entered units | sum |
//! | `current` | current monthly total | sum |
//! | `proposed` | proposed monthly total | sum |
//! | `monthly savings` | | sum |
//! | `annual savings` | includes the named benefit | sum |
//! | `term` | months | empty |
//! | `lifetime savings` | | sum |
//! | `one-time cost` | | sum |
//! | `agreement` | `standard` / `resale` | empty |
//! | `resale price` | as entered | empty |
//! | `benefit fee per unit` | as entered | empty |
//! | `bundled` | `true` / `false` | empty |
//!
//! The trailing input columns let [`crate::load_from_str`] rebuild each
//! exported record. Disabled categories are not exported.
//! ## JSON
//!
//! `{ "inputs": <state>, "totals": <totals> }`. The envelope is accepted
//! back as a snapshot layer, so an export can be reloaded as-is.

use std::io::Write;

use rust_decimal::Decimal;
use savings_core::calculations::aggregate::{aggregate, included};
use savings_core::calculations::common::round_half_up;
use savings_core::models::{PortfolioState, Scope, Totals};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 14] = [
    "category",
    "mode",
    "units",
    "current",
    "proposed",
    "monthly savings",
    "annual savings",
    "term",
    "lifetime savings",
    "one-time cost",
    "agreement",
    "resale price",
    "benefit fee per unit",
    "bundled",
];

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON encode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("export is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Serialize)]
struct ExportEnvelope<'a> {
    inputs: &'a PortfolioState,
    totals: Totals,
}

fn money(value: Decimal) -> String {
    format!("{:.2}", round_half_up(value))
}

/// Writes the CSV export for `scope` to `writer`.
pub fn write_csv<W: Write>(
    state: &PortfolioState,
    scope: Scope,
    writer: W,
) -> Result<(), ExportError> {
    let mut csv = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    csv.write_record(CSV_HEADER)?;

    let mut rows = 0usize;
    for (key, inputs, kpis) in included(state, scope) {
        csv.write_record([
            key.as_str().to_string(),
            inputs.mode.as_str().to_string(),
            inputs.units.to_string(),
            money(kpis.current),
            money(kpis.proposed),
            money(kpis.monthly_savings),
            money(kpis.annual_savings),
            inputs.term_months.to_string(),
            money(kpis.lifetime_savings),
            money(inputs.one_time_cost),
            inputs.agreement.as_str().to_string(),
            inputs.resale_price.to_string(),
            inputs.benefit_fee_per_unit.to_string(),
            inputs.bundled.to_string(),
        ])?;
        rows += 1;
    }

    let totals = aggregate(state, scope);
    csv.write_record([
        "Total".to_string(),
        String::new(),
        totals.units.to_string(),
        money(totals.current),
        money(totals.proposed),
        money(totals.monthly_savings),
        money(totals.annual_savings),
        String::new(),
        money(totals.lifetime_savings),
        money(totals.one_time_cost),
        String::new(),
        String::new(),
        String::new(),
        String::new(),
    ])?;

    csv.flush()?;
    debug!(rows, "wrote CSV export");
    Ok(())
}

/// Renders the CSV export for `scope` as a string.
pub fn to_csv(
    state: &PortfolioState,
    scope: Scope,
) -> Result<String, ExportError> {
    let mut buffer = Vec::new();
    write_csv(state, scope, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Renders the JSON export. Totals cover `scope`.
pub fn to_json(
    state: &PortfolioState,
    scope: Scope,
) -> Result<String, ExportError> {
    let envelope = ExportEnvelope {
        inputs: state,
        totals: aggregate(state, scope),
    };
    Ok(serde_json::to_string_pretty(&envelope)?)
}
