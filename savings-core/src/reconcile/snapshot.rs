//! JSON snapshot encoding and lenient decoding.
//!
//! Decoding never trusts stored data: unknown categories are ignored, a
//! record that is not an object is dropped, missing fields fall back to the
//! default record and numeric fields go through the lenient parsers.

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::input::{amount_from_json, count_from_json, flag_from_json};
use crate::models::{AgreementType, CategoryInputs, CategoryKey, PortfolioState, PricingMode};

/// Versioned persistence key for the current snapshot schema.
pub const SNAPSHOT_KEY: &str = "savings-estimator:v3";

/// Keys written by earlier schema versions. Never merged; purged on load.
pub const LEGACY_SNAPSHOT_KEYS: [&str; 3] = [
    "savings-estimator",
    "savings-estimator:v1",
    "savings-estimator:v2",
];

#[derive(Debug, Error)]
pub enum LayerError {
    #[error("snapshot is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("snapshot is not a JSON object")]
    NotAnObject,
}

/// Serializes the full state.
pub fn encode_state(state: &PortfolioState) -> Result<String, serde_json::Error> {
    serde_json::to_string(state)
}

/// Decodes one snapshot layer into the records it carries.
///
/// Accepts either a bare state object or an export envelope
/// `{ "inputs": {...}, ... }`.
pub fn decode_layer(payload: &str) -> Result<Vec<(CategoryKey, CategoryInputs)>, LayerError> {
    let value: Value = serde_json::from_str(payload)?;
    let object = value.as_object().ok_or(LayerError::NotAnObject)?;
    let records = match object.get("inputs") {
        Some(Value::Object(inputs)) => inputs,
        _ => object,
    };

    let mut layer = Vec::new();
    for (name, record) in records {
        let Some(key) = CategoryKey::parse(name) else {
            debug!(key = %name, "ignoring unknown category in snapshot");
            continue;
        };
        match decode_inputs(record) {
            Some(inputs) => layer.push((key, inputs)),
            None => warn!(category = %key, "dropping malformed category record"),
        }
    }
    Ok(layer)
}

/// Replaces the records of `state` present in `layer`.
pub fn apply_layer(
    state: &mut PortfolioState,
    layer: Vec<(CategoryKey, CategoryInputs)>,
) {
    for (key, inputs) in layer {
        state.replace(key, inputs);
    }
}

fn decode_inputs(value: &Value) -> Option<CategoryInputs> {
    let record = value.as_object()?;
    let defaults = CategoryInputs::default();

    Some(CategoryInputs {
        mode: text(record, "mode")
            .and_then(PricingMode::parse)
            .unwrap_or(defaults.mode),
        units: record.get("units").map_or(defaults.units, count_from_json),
        current_monthly: record
            .get("currentMonthly")
            .map_or(defaults.current_monthly, amount_from_json),
        proposed_monthly: record
            .get("proposedMonthly")
            .map_or(defaults.proposed_monthly, amount_from_json),
        one_time_cost: record
            .get("oneTimeCost")
            .map_or(defaults.one_time_cost, amount_from_json),
        term_months: record
            .get("termMonths")
            .map_or(defaults.term_months, count_from_json),
        enabled: record
            .get("enabled")
            .and_then(flag_from_json)
            .unwrap_or(defaults.enabled),
        agreement: text(record, "agreement")
            .and_then(AgreementType::parse)
            .unwrap_or(defaults.agreement),
        resale_price: record
            .get("resalePrice")
            .map_or(defaults.resale_price, amount_from_json),
        benefit_fee_per_unit: record
            .get("benefitFeePerUnit")
            .map_or(defaults.benefit_fee_per_unit, amount_from_json),
        bundled: record
            .get("bundled")
            .and_then(flag_from_json)
            .unwrap_or(defaults.bundled),
    })
}

fn text<'a>(
    record: &'a Map<String, Value>,
    field: &str,
) -> Option<&'a str> {
    record.get(field).and_then(Value::as_str)
}
