//! CSV import of category inputs.
//!
//! ## CSV Format
//!
//! Columns are matched by header name, so order does not matter and
//! unknown columns are ignored.
//! Only `category` is required; every other column may be absent or left
//! empty, in which case the default record's value is kept.
//!
//! | Column | Type | Notes |
//! |--------|------|-------|
//! | `category` | key | `internet`, `voice`, `video`, `access_control`, `wifi` |
//! | `mode` | string | `flat` or `perUnit` |
//! | `units` | count | |
//! | `current` | amount | monthly total (flat) or per-unit rate (perUnit) |
//! | `proposed` | amount | as `current` |
//! | `one-time cost` | amount | |
//! | `term` | count | months |
//! | `enabled` | flag | `true`/`false`, `yes`/`no`, `1`/`0` |
//! | `agreement` | string | `standard` or `resale` |
//! | `resale price` | amount | |
//! | `benefit fee per unit` | amount | |
//! | `bundled` | flag | |
//!
//! Amounts and counts are parsed leniently (`$1,200` is fine, garbage is 0).
//! Unrecognised `mode`, `agreement` or flag values are errors.
//!
//! ## Re-importing an export
//!
//! A file carrying a `monthly savings` column is read as a CSV export:
//! its `current` and `proposed` cells are monthly totals, so `perUnit`
//! rows are divided back into per-unit rates (exact to the exported cent),
//! and the `Total` row is skipped. Disabled categories are not in an
//! export and are left untouched by the import.
//!
//! ### Example
//!
//! ```csv
//! category,mode,units,current,proposed,term
//! voice,perUnit,40,39.99,,36
//! wifi,flat,,1200,950,36
//! ```

use rust_decimal::Decimal;
use savings_core::calculations::common::saturating_div;
use savings_core::input::{parse_amount, parse_count, parse_flag};
use savings_core::models::{AgreementType, CategoryInputs, CategoryKey, PricingMode};
use serde::Deserialize;
use tracing::debug;

// ---------------------------------------------------------------------------
// Serde-compatible row; every optional column is kept as raw text
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
    category: String,
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    units: Option<String>,
    #[serde(default)]
    current: Option<String>,
    #[serde(default)]
    proposed: Option<String>,
    #[serde(default, rename = "one-time cost")]
    one_time_cost: Option<String>,
    #[serde(default)]
    term: Option<String>,
    #[serde(default)]
    enabled: Option<String>,
    #[serde(default)]
    agreement: Option<String>,
    #[serde(default, rename = "resale price")]
    resale_price: Option<String>,
    #[serde(default, rename = "benefit fee per unit")]
    benefit_fee_per_unit: Option<String>,
    #[serde(default)]
    bundled: Option<String>,
}

// ---------------------------------------------------------------------------
// Public error type
// ---------------------------------------------------------------------------

/// Errors that can occur while importing CSV data.
#[derive(Debug, thiserror::Error)]
pub enum CsvImportError {
    /// Structurally invalid CSV, or the `category` column is missing.
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// `row` is 1-based (header = row 0).
    #[error("unknown category '{category}' on row {row}")]
    UnknownCategory { category: String, row: usize },

    #[error("invalid {column} '{value}' on row {row}")]
    InvalidValue {
        column: &'static str,
        value: String,
        row: usize,
    },
}

// ---------------------------------------------------------------------------
// Core loader
// ---------------------------------------------------------------------------

/// Returns the trimmed cell, or `None` when absent or empty.
fn cell(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn parse_column<T>(
    value: &Option<String>,
    column: &'static str,
    row: usize,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, CsvImportError> {
    match cell(value) {
        None => Ok(None),
        Some(raw) => parse(raw).map(Some).ok_or_else(|| CsvImportError::InvalidValue {
            column,
            value: raw.to_string(),
            row,
        }),
    }
}

/// Per-unit rate behind an exported monthly total.
fn rate_from_total(
    total: Decimal,
    units: u32,
) -> Decimal {
    if units == 0 {
        Decimal::ZERO
    } else {
        saturating_div(total, Decimal::from(units))
    }
}

/// Convert one CSV row into a whole-record replacement built on the
/// default record. `monthly_totals` marks rows from an export.
fn convert_row(
    row: CsvRow,
    row_number: usize,
    monthly_totals: bool,
) -> Result<(CategoryKey, CategoryInputs), CsvImportError> {
    let key = CategoryKey::parse(row.category.trim()).ok_or_else(|| {
        CsvImportError::UnknownCategory {
            category: row.category.clone(),
            row: row_number,
        }
    })?;
    let defaults = CategoryInputs::default();

    let mut inputs = CategoryInputs {
        mode: parse_column(&row.mode, "mode", row_number, PricingMode::parse)?
            .unwrap_or(defaults.mode),
        units: cell(&row.units).map_or(defaults.units, parse_count),
        current_monthly: cell(&row.current).map_or(defaults.current_monthly, parse_amount),
        proposed_monthly: cell(&row.proposed).map_or(defaults.proposed_monthly, parse_amount),
        one_time_cost: cell(&row.one_time_cost).map_or(defaults.one_time_cost, parse_amount),
        term_months: cell(&row.term).map_or(defaults.term_months, parse_count),
        enabled: parse_column(&row.enabled, "enabled", row_number, parse_flag)?
            .unwrap_or(defaults.enabled),
        agreement: parse_column(&row.agreement, "agreement", row_number, AgreementType::parse)?
            .unwrap_or(defaults.agreement),
        resale_price: cell(&row.resale_price).map_or(defaults.resale_price, parse_amount),
        benefit_fee_per_unit: cell(&row.benefit_fee_per_unit)
            .map_or(defaults.benefit_fee_per_unit, parse_amount),
        bundled: parse_column(&row.bundled, "bundled", row_number, parse_flag)?
            .unwrap_or(defaults.bundled),
    };

    if monthly_totals && inputs.mode == PricingMode::PerUnit {
        inputs.current_monthly = rate_from_total(inputs.current_monthly, inputs.units);
        inputs.proposed_monthly = rate_from_total(inputs.proposed_monthly, inputs.units);
    }

    Ok((key, inputs))
}

/// Parse CSV text and return one record per row, in file order.
///
/// # Errors
///
/// * [CsvImportError::Parse] if the CSV is structurally invalid or has no
///   `category` column.
/// * [CsvImportError::UnknownCategory] for a category that is not a known
///   key.
/// * [CsvImportError::InvalidValue] for an unrecognised mode, agreement or
///   flag.
pub fn load_from_str(input: &str) -> Result<Vec<(CategoryKey, CategoryInputs)>, CsvImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(false)
        .from_reader(input.as_bytes());
    let monthly_totals = reader.headers()?.iter().any(|h| h == "monthly savings");

    let mut records = Vec::new();
    for (idx, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result?;
        let row_number = idx + 1;
        if row.category.trim().eq_ignore_ascii_case("total") {
            debug!(row = row_number, "skipping total row");
            continue;
        }
        records.push(convert_row(row, row_number, monthly_totals)?);
    }
    Ok(records)
}

/// Convenience wrapper: read a file from disk and delegate to [load_from_str].
///
/// # Errors
///
/// Returns an io::Error when the file cannot be read, or a
/// [CsvImportError] when the contents are invalid.
pub fn load_from_file(
    path: &std::path::Path
) -> Result<Vec<(CategoryKey, CategoryInputs)>, Box<dyn std::error::Error + Send + Sync>> {
    let contents = std::fs::read_to_string(path)?;
    let records = load_from_str(&contents)?;
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::*;

    // -----------------------------------------------------------------------
    // 1. Minimal CSV – only the category column
    // -----------------------------------------------------------------------
    #[test]
    fn test_category_only_row_is_default_record() {
        let records = load_from_str("category\nwifi\n").expect("should parse");

        assert_eq!(records, vec![(CategoryKey::Wifi, CategoryInputs::default())]);
    }

    // -----------------------------------------------------------------------
    // 2. Full row – every column populated
    // -----------------------------------------------------------------------
    #[test]
    fn test_full_row_populates_every_field() {
        let csv = "\
category,mode,units,current,proposed,one-time cost,term,enabled,agreement,resale price,benefit fee per unit,bundled
access_control,flat,120,\"$1,850.00\",600,4000,36,no,resale,12.5,25,yes
";
        let (key, inputs) = load_from_str(csv).expect("should parse").remove(0);

        assert_eq!(key, CategoryKey::AccessControl);
        assert_eq!(
            inputs,
            CategoryInputs {
                mode: PricingMode::Flat,
                units: 120,
                current_monthly: dec!(1850.00),
                proposed_monthly: dec!(600),
                one_time_cost: dec!(4000),
                term_months: 36,
                enabled: false,
                agreement: AgreementType::Resale,
                resale_price: dec!(12.5),
                benefit_fee_per_unit: dec!(25),
                bundled: true,
            }
        );
    }

    // -----------------------------------------------------------------------
    // 3. Column order and extra columns
    // -----------------------------------------------------------------------
    #[test]
    fn test_columns_matched_by_name_and_extras_ignored() {
        let csv = "\
units,annual savings,category,current
12,999.00,voice,40
";
        let (key, inputs) = load_from_str(csv).expect("should parse").remove(0);

        assert_eq!(key, CategoryKey::Voice);
        assert_eq!(inputs.units, 12);
        assert_eq!(inputs.current_monthly, dec!(40));
    }

    #[test]
    fn test_empty_cells_keep_defaults_and_bad_numbers_become_zero() {
        let csv = "\
category,mode,units,current,term
video,,abc,-20,
";
        let (_, inputs) = load_from_str(csv).expect("should parse").remove(0);

        assert_eq!(inputs.mode, PricingMode::PerUnit);
        assert_eq!(inputs.units, 0);
        assert_eq!(inputs.current_monthly, Decimal::ZERO);
        assert_eq!(inputs.term_months, 0);
    }

    #[test]
    fn test_total_row_is_skipped() {
        let csv = "\
category,mode,units,current
wifi,flat,0,500.00
Total,,0,500.00
";
        let records = load_from_str(csv).expect("should parse");

        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_export_rows_turn_per_unit_totals_back_into_rates() {
        let csv = "\
category,mode,units,current,proposed,monthly savings
voice,perUnit,40,1599.60,999.60,600.00
wifi,flat,0,500.00,300.00,200.00
video,perUnit,0,0.00,0.00,0.00
";
        let records = load_from_str(csv).expect("should parse");

        assert_eq!(records[0].1.current_monthly, dec!(39.99));
        assert_eq!(records[0].1.proposed_monthly, dec!(24.99));
        assert_eq!(records[1].1.current_monthly, dec!(500));
        assert_eq!(records[2].1.current_monthly, Decimal::ZERO);
    }

    #[test]
    fn test_per_unit_cells_are_rates_without_export_columns() {
        let csv = "category,mode,units,current\nvoice,perUnit,40,39.99\n";

        let (_, inputs) = load_from_str(csv).expect("should parse").remove(0);

        assert_eq!(inputs.current_monthly, dec!(39.99));
    }

    // -----------------------------------------------------------------------
    // 4. Errors
    // -----------------------------------------------------------------------
    #[test]
    fn test_unknown_category_reports_row() {
        let csv = "\
category,units
voice,3
fax,1
";
        match load_from_str(csv).unwrap_err() {
            CsvImportError::UnknownCategory { category, row } => {
                assert_eq!(category, "fax");
                assert_eq!(row, 2);
            }
            other => panic!("expected UnknownCategory, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_mode_is_an_error() {
        let csv = "category,mode\nwifi,weekly\n";

        match load_from_str(csv).unwrap_err() {
            CsvImportError::InvalidValue { column, value, row } => {
                assert_eq!(column, "mode");
                assert_eq!(value, "weekly");
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidValue, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_category_column_returns_parse_error() {
        let csv = "mode,units\nflat,3\n";

        assert!(matches!(load_from_str(csv), Err(CsvImportError::Parse(_))));
    }

    #[test]
    fn test_ragged_row_returns_parse_error() {
        let csv = "category,units\nvoice,3,extra\n";

        assert!(matches!(load_from_str(csv), Err(CsvImportError::Parse(_))));
    }

    #[test]
    fn test_header_only_returns_empty_vec() {
        let records = load_from_str("category,units\n").expect("header-only CSV is valid");

        assert!(records.is_empty());
    }
}
