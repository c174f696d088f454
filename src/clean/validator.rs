//! Per-record validation.
//!
//! Checks run in a fixed order and the first failure wins, so the reason
//! breakdown in the cleaning report is deterministic:
//!
//! 1. date → `InvalidDate`
//! 2. product name → `InvalidProduct`
//! 3. price/quantity parse → `InvalidNumeric`
//! 4. price/quantity blank or zero → `MissingValue`

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::{RawRecord, RawValue, RejectReason, ValidRecord};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Validate one raw record.
pub fn validate(raw: &RawRecord) -> Result<ValidRecord, RejectReason> {
    let date = parse_date(&raw.date).ok_or(RejectReason::InvalidDate)?;

    let product_name = raw.product_name.trim();
    if !product_name.chars().any(char::is_alphanumeric) {
        return Err(RejectReason::InvalidProduct);
    }

    let unit_price = parse_amount(raw.unit_price.as_ref());
    let quantity = parse_amount(raw.quantity.as_ref());

    if matches!(unit_price, Amount::Invalid) || matches!(quantity, Amount::Invalid) {
        return Err(RejectReason::InvalidNumeric);
    }

    let (Amount::Value(unit_price), Amount::Value(quantity)) = (unit_price, quantity) else {
        return Err(RejectReason::MissingValue);
    };
    if unit_price == 0.0 || quantity == 0.0 {
        return Err(RejectReason::MissingValue);
    }

    Ok(ValidRecord {
        date,
        product_name: product_name.to_string(),
        unit_price,
        quantity,
    })
}

/// Parse a date in one of the accepted formats; date-times keep only the date.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
        })
}

/// Canonical text of a date cell: ISO form when it parses, trimmed text otherwise.
pub(crate) fn canonical_date(s: &str) -> String {
    match parse_date(s) {
        Some(date) => date.to_string(),
        None => s.trim().to_string(),
    }
}

/// Canonical text of a numeric cell: the parsed `f64` through `Display` when it
/// parses, trimmed text otherwise. `"50.00"`, `"50"` and `Number(50.0)` agree.
pub(crate) fn canonical_amount(value: &RawValue) -> String {
    match value {
        RawValue::Number(n) => n.to_string(),
        RawValue::Text(s) => match parse_number_text(s) {
            Some(n) => n.to_string(),
            None => s.trim().to_string(),
        },
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Amount {
    Missing,
    Invalid,
    Value(f64),
}

fn parse_amount(value: Option<&RawValue>) -> Amount {
    let v = match value {
        None => return Amount::Missing,
        Some(v) if v.is_blank() => return Amount::Missing,
        Some(RawValue::Number(n)) => *n,
        Some(RawValue::Text(s)) => match parse_number_text(s) {
            Some(n) => n,
            None => return Amount::Invalid,
        },
    };
    if v.is_finite() && v >= 0.0 {
        Amount::Value(v)
    } else {
        Amount::Invalid
    }
}

fn parse_number_text(s: &str) -> Option<f64> {
    let s = s.trim();
    // "12,50" is a decimal comma; anything with both separators is ambiguous.
    if s.contains(',') {
        if s.contains('.') || s.matches(',').count() > 1 {
            return None;
        }
        return s.replace(',', ".").parse::<f64>().ok();
    }
    s.parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(date: &str, product: &str, price: &str, qty: &str) -> RawRecord {
        RawRecord::new(date, product, price, qty)
    }

    #[test]
    fn accepts_a_well_formed_record() {
        let v = validate(&raw("2024-01-05", "  Mouse ", "50", "2")).unwrap();
        assert_eq!(v.date, NaiveDate::from_ymd_opt(2024, 1, 5).unwrap());
        assert_eq!(v.product_name, "Mouse");
        assert_eq!(v.revenue(), 100.0);
    }

    #[test]
    fn accepts_alternative_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 9);
        assert_eq!(parse_date("09/03/2024"), expected);
        assert_eq!(parse_date("09-03-2024"), expected);
        assert_eq!(parse_date("2024/03/09"), expected);
        assert_eq!(parse_date("2024-03-09 14:30:00"), expected);
        assert_eq!(parse_date("2024-02-30"), None);
    }

    #[test]
    fn rejection_order_is_fixed() {
        // Fails every check; the date wins.
        assert_eq!(validate(&raw("bad-date", "", "x", "0")), Err(RejectReason::InvalidDate));
        assert_eq!(validate(&raw("2024-01-01", "  ", "x", "0")), Err(RejectReason::InvalidProduct));
        assert_eq!(validate(&raw("2024-01-01", "A", "x", "0")), Err(RejectReason::InvalidNumeric));
        assert_eq!(validate(&raw("2024-01-01", "A", "10", "0")), Err(RejectReason::MissingValue));
    }

    #[test]
    fn symbol_only_products_are_invalid() {
        assert_eq!(validate(&raw("2024-01-01", "--- ?", "1", "1")), Err(RejectReason::InvalidProduct));
        assert!(validate(&raw("2024-01-01", "SSD 1TB!", "1", "1")).is_ok());
    }

    #[test]
    fn negative_and_non_finite_numbers_are_invalid() {
        assert_eq!(validate(&raw("2024-01-01", "A", "-5", "1")), Err(RejectReason::InvalidNumeric));
        assert_eq!(validate(&raw("2024-01-01", "A", "5", "NaN")), Err(RejectReason::InvalidNumeric));
        assert_eq!(validate(&raw("2024-01-01", "A", "inf", "1")), Err(RejectReason::InvalidNumeric));
        let r = RawRecord::new("2024-01-01", "A", f64::INFINITY, 1.0);
        assert_eq!(validate(&r), Err(RejectReason::InvalidNumeric));
    }

    #[test]
    fn blank_values_are_missing_not_invalid() {
        assert_eq!(validate(&raw("2024-01-01", "A", " ", "1")), Err(RejectReason::MissingValue));
        let mut r = raw("2024-01-01", "A", "10", "1");
        r.quantity = None;
        assert_eq!(validate(&r), Err(RejectReason::MissingValue));
        // A garbage value elsewhere still takes precedence over a blank one.
        assert_eq!(validate(&raw("2024-01-01", "A", "", "abc")), Err(RejectReason::InvalidNumeric));
    }

    #[test]
    fn decimal_comma_is_accepted() {
        let v = validate(&raw("2024-01-01", "A", "12,50", "2")).unwrap();
        assert!((v.unit_price - 12.5).abs() < 1e-12);
        assert_eq!(validate(&raw("2024-01-01", "A", "1.234,50", "2")), Err(RejectReason::InvalidNumeric));
    }
}
