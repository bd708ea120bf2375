//! Lenient parsing of user-entered and stored figures.
//!
//! Nothing here fails: empty, unparseable or non-finite input becomes 0 and
//! negative input is floored at 0.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde_json::Value;
use tracing::warn;

/// Trims whitespace and strips thousands separators and currency symbols.
fn normalize_amount_input(s: &str) -> String {
    s.trim().replace([',', '$', ' '], "")
}

/// Parses an entered amount such as `"1,234.56"` or `"$80"`.
pub fn parse_amount(s: &str) -> Decimal {
    let normalized = normalize_amount_input(s);
    if normalized.is_empty() {
        return Decimal::ZERO;
    }
    let parsed = normalized
        .parse::<Decimal>()
        .or_else(|_| Decimal::from_scientific(&normalized));
    match parsed {
        Ok(value) => value.max(Decimal::ZERO),
        Err(e) => {
            warn!(input = %s, "invalid amount, using 0: {}", e);
            Decimal::ZERO
        }
    }
}

/// Parses an entered count. Fractions are truncated; values above
/// `u32::MAX` saturate.
pub fn parse_count(s: &str) -> u32 {
    decimal_to_count(parse_amount(s))
}

/// Parses an entered toggle. Anything unrecognised is `None`.
pub fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "y" | "1" | "on" => Some(true),
        "false" | "no" | "n" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// Reads an amount from a stored JSON value (number or string).
pub fn amount_from_json(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => {
            let parsed = if let Some(i) = n.as_i64() {
                Some(Decimal::from(i))
            } else if let Some(u) = n.as_u64() {
                Some(Decimal::from(u))
            } else {
                n.as_f64()
                    .filter(|f| f.is_finite())
                    .and_then(|f| Decimal::try_from(f).ok())
            };
            parsed.unwrap_or(Decimal::ZERO).max(Decimal::ZERO)
        }
        Value::String(s) => parse_amount(s),
        _ => Decimal::ZERO,
    }
}

/// Reads a count from a stored JSON value (number or string).
pub fn count_from_json(value: &Value) -> u32 {
    decimal_to_count(amount_from_json(value))
}

/// Reads a toggle from a stored JSON value.
pub fn flag_from_json(value: &Value) -> Option<bool> {
    match value {
        Value::Bool(b) => Some(*b),
        Value::String(s) => parse_flag(s),
        Value::Number(n) => n.as_f64().map(|f| f != 0.0),
        _ => None,
    }
}

fn decimal_to_count(value: Decimal) -> u32 {
    value.trunc().to_u32().unwrap_or(u32::MAX)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    // =========================================================================
    // parse_amount tests
    // =========================================================================

    #[test]
    fn parse_amount_accepts_thousands_separator_and_currency() {
        assert_eq!(parse_amount("1,234.56"), dec!(1234.56));
        assert_eq!(parse_amount(" $80 "), dec!(80));
    }

    #[test]
    fn parse_amount_empty_is_zero() {
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("   "), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_invalid_is_zero() {
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("NaN"), Decimal::ZERO);
        assert_eq!(parse_amount("inf"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_floors_negative_values() {
        assert_eq!(parse_amount("-25"), Decimal::ZERO);
    }

    #[test]
    fn parse_amount_accepts_scientific_notation() {
        assert_eq!(parse_amount("1.5e3"), dec!(1500));
    }

    // =========================================================================
    // parse_count tests
    // =========================================================================

    #[test]
    fn parse_count_truncates_fractions() {
        assert_eq!(parse_count("10.9"), 10);
    }

    #[test]
    fn parse_count_saturates_large_values() {
        assert_eq!(parse_count("99999999999"), u32::MAX);
    }

    #[test]
    fn parse_count_invalid_is_zero() {
        assert_eq!(parse_count("ten"), 0);
        assert_eq!(parse_count("-3"), 0);
    }

    // =========================================================================
    // parse_flag tests
    // =========================================================================

    #[test]
    fn parse_flag_recognises_common_spellings() {
        assert_eq!(parse_flag("Yes"), Some(true));
        assert_eq!(parse_flag("off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    // =========================================================================
    // json tests
    // =========================================================================

    #[test]
    fn amount_from_json_reads_numbers_and_strings() {
        assert_eq!(amount_from_json(&json!(60)), dec!(60));
        assert_eq!(amount_from_json(&json!(24.99)), dec!(24.99));
        assert_eq!(amount_from_json(&json!("24.99")), dec!(24.99));
    }

    #[test]
    fn amount_from_json_coerces_everything_else_to_zero() {
        assert_eq!(amount_from_json(&json!(null)), Decimal::ZERO);
        assert_eq!(amount_from_json(&json!(true)), Decimal::ZERO);
        assert_eq!(amount_from_json(&json!({"a": 1})), Decimal::ZERO);
        assert_eq!(amount_from_json(&json!(-12.5)), Decimal::ZERO);
    }

    #[test]
    fn count_from_json_truncates_and_floors() {
        assert_eq!(count_from_json(&json!(7.8)), 7);
        assert_eq!(count_from_json(&json!(-2)), 0);
        assert_eq!(count_from_json(&json!("12")), 12);
    }

    #[test]
    fn flag_from_json_accepts_bool_string_and_number() {
        assert_eq!(flag_from_json(&json!(false)), Some(false));
        assert_eq!(flag_from_json(&json!("true")), Some(true));
        assert_eq!(flag_from_json(&json!(1)), Some(true));
        assert_eq!(flag_from_json(&json!(null)), None);
    }
}
