//! Shared domain types.
//!
//! These types flow through every pipeline stage:
//!
//! - `RawRecord`: untrusted input exactly as the loader parsed it
//! - `EnrichedRecord`: the validated, derived and categorized record
//! - `CategoryRule` / `CategoryTable`: optional product → category/margin lookup
//! - `CleaningReport`: what the cleaner dropped and why

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// English weekday names indexed by `EnrichedRecord::weekday` (Monday = 0).
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Short month names indexed by `month - 1`.
pub const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A numeric cell as it arrived: free text from CSV, or a number from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    /// Trimmed textual form, as shown in reports.
    ///
    /// Numbers render through `f64`'s `Display`, so `Number(50.0)` becomes `"50"`.
    pub fn normalized(&self) -> String {
        match self {
            RawValue::Number(v) => v.to_string(),
            RawValue::Text(s) => s.trim().to_string(),
        }
    }

    /// True when the cell carries no value at all (blank text).
    pub fn is_blank(&self) -> bool {
        match self {
            RawValue::Number(_) => false,
            RawValue::Text(s) => s.trim().is_empty(),
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        RawValue::Number(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        RawValue::Text(value.to_string())
    }
}

/// One untrusted sales row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub product_name: String,
    #[serde(default)]
    pub unit_price: Option<RawValue>,
    #[serde(default)]
    pub quantity: Option<RawValue>,
}

impl RawRecord {
    pub fn new(
        date: impl Into<String>,
        product_name: impl Into<String>,
        unit_price: impl Into<RawValue>,
        quantity: impl Into<RawValue>,
    ) -> Self {
        Self {
            date: date.into(),
            product_name: product_name.into(),
            unit_price: Some(unit_price.into()),
            quantity: Some(quantity.into()),
        }
    }
}

impl From<&EnrichedRecord> for RawRecord {
    fn from(record: &EnrichedRecord) -> Self {
        Self {
            date: record.date.format("%Y-%m-%d").to_string(),
            product_name: record.product_name.clone(),
            unit_price: Some(RawValue::Number(record.unit_price)),
            quantity: Some(RawValue::Number(record.quantity)),
        }
    }
}

/// Why a record was rejected by the validator (first failing check wins).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Error)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    #[error("date is not a calendar date")]
    InvalidDate,
    #[error("product name is empty or has no alphanumeric characters")]
    InvalidProduct,
    #[error("unit price or quantity is not a finite non-negative number")]
    InvalidNumeric,
    #[error("unit price or quantity is missing or zero")]
    MissingValue,
}

impl RejectReason {
    pub const ALL: [RejectReason; 4] = [
        RejectReason::InvalidDate,
        RejectReason::InvalidProduct,
        RejectReason::InvalidNumeric,
        RejectReason::MissingValue,
    ];

    pub fn label(self) -> &'static str {
        match self {
            RejectReason::InvalidDate => "invalid_date",
            RejectReason::InvalidProduct => "invalid_product",
            RejectReason::InvalidNumeric => "invalid_numeric",
            RejectReason::MissingValue => "missing_value",
        }
    }
}

/// A record that passed validation but has not been enriched yet.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidRecord {
    pub date: NaiveDate,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: f64,
}

impl ValidRecord {
    pub fn revenue(&self) -> f64 {
        self.unit_price * self.quantity
    }
}

/// The canonical cleaned record.
///
/// Field names are the export schema; `revenue` and `profit` are always derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnrichedRecord {
    pub date: NaiveDate,
    pub product_name: String,
    pub unit_price: f64,
    pub quantity: f64,
    pub revenue: f64,
    pub category: String,
    pub margin: f64,
    pub profit: f64,
    pub year: i32,
    pub month: u32,
    /// 0 = Monday … 6 = Sunday.
    pub weekday: u32,
    pub day_of_month: u32,
    pub iso_week: u32,
}

impl EnrichedRecord {
    /// Attach derived date features and category data to a validated record.
    pub fn from_valid(record: ValidRecord, category: String, margin: f64) -> Self {
        let revenue = record.revenue();
        let date = record.date;
        Self {
            date,
            product_name: record.product_name,
            unit_price: record.unit_price,
            quantity: record.quantity,
            revenue,
            category,
            margin,
            profit: revenue * margin,
            year: date.year(),
            month: date.month(),
            weekday: date.weekday().num_days_from_monday(),
            day_of_month: date.day(),
            iso_week: date.iso_week().week(),
        }
    }
}

/// One product → category/margin mapping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRule {
    pub product_name: String,
    pub category: String,
    pub margin: f64,
}

/// Read-only lookup of category rules keyed by exact product name.
#[derive(Debug, Clone, Default)]
pub struct CategoryTable {
    rules: HashMap<String, CategoryRule>,
}

impl CategoryTable {
    /// Build a table, rejecting duplicate product names and margins outside `[0, 1]`.
    pub fn from_rules(rules: impl IntoIterator<Item = CategoryRule>) -> Result<Self, String> {
        let mut map = HashMap::new();
        for rule in rules {
            if !(rule.margin.is_finite() && (0.0..=1.0).contains(&rule.margin)) {
                return Err(format!(
                    "Margin {} for product '{}' is outside [0, 1].",
                    rule.margin, rule.product_name
                ));
            }
            if map.contains_key(&rule.product_name) {
                return Err(format!("Duplicate category rule for product '{}'.", rule.product_name));
            }
            map.insert(rule.product_name.clone(), rule);
        }
        Ok(Self { rules: map })
    }

    /// Exact, case-sensitive lookup.
    pub fn get(&self, product_name: &str) -> Option<&CategoryRule> {
        self.rules.get(product_name)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// A single rejected input row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rejection {
    /// Zero-based position in the raw input.
    pub index: usize,
    pub reason: RejectReason,
}

/// Inclusive revenue bounds used by outlier removal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutlierBounds {
    pub q1: f64,
    pub q3: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Counts of what the cleaner kept and dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CleaningReport {
    pub input_count: usize,
    pub duplicate_count: usize,
    pub invalid_count: usize,
    pub invalid_by_reason: BTreeMap<RejectReason, usize>,
    pub rejections: Vec<Rejection>,
    pub outlier_count: usize,
    /// `None` when outlier removal was skipped (too few records).
    pub outlier_bounds: Option<OutlierBounds>,
    pub uncategorized_count: usize,
    pub output_count: usize,
    /// Fraction in `[0, 1]`; 0 for empty input.
    pub retention_rate: f64,
}

impl CleaningReport {
    pub fn invalid_for(&self, reason: RejectReason) -> usize {
        self.invalid_by_reason.get(&reason).copied().unwrap_or(0)
    }
}

impl fmt::Display for RawValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enriched_record_derives_date_features() {
        let valid = ValidRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            product_name: "Mouse".to_string(),
            unit_price: 50.0,
            quantity: 2.0,
        };
        let r = EnrichedRecord::from_valid(valid, "Peripherals".to_string(), 0.5);
        assert_eq!(r.revenue, 100.0);
        assert_eq!(r.profit, 50.0);
        assert_eq!((r.year, r.month, r.day_of_month), (2024, 1, 5));
        assert_eq!(r.weekday, 4); // Friday
        assert_eq!(r.iso_week, 1);
    }

    #[test]
    fn iso_week_can_belong_to_previous_year() {
        let valid = ValidRecord {
            date: NaiveDate::from_ymd_opt(2021, 1, 1).unwrap(),
            product_name: "A".to_string(),
            unit_price: 1.0,
            quantity: 1.0,
        };
        let r = EnrichedRecord::from_valid(valid, "Other".to_string(), 0.2);
        assert_eq!(r.iso_week, 53);
        assert_eq!(r.year, 2021);
    }

    #[test]
    fn raw_value_normalizes_numbers_and_text() {
        assert_eq!(RawValue::Number(50.0).normalized(), "50");
        assert_eq!(RawValue::Text(" 50 ".to_string()).normalized(), "50");
        assert!(RawValue::Text("   ".to_string()).is_blank());
        assert!(!RawValue::Number(0.0).is_blank());
    }

    #[test]
    fn raw_value_deserializes_numbers_and_strings() {
        let r: RawRecord = serde_json::from_str(
            r#"{"date":"2024-01-01","product_name":"Mouse","unit_price":"50","quantity":2}"#,
        )
        .unwrap();
        assert_eq!(r.unit_price, Some(RawValue::Text("50".to_string())));
        assert_eq!(r.quantity, Some(RawValue::Number(2.0)));
    }

    #[test]
    fn category_table_rejects_duplicates_and_bad_margins() {
        let rule = |name: &str, margin: f64| CategoryRule {
            product_name: name.to_string(),
            category: "X".to_string(),
            margin,
        };
        assert!(CategoryTable::from_rules([rule("A", 0.3), rule("A", 0.3)]).is_err());
        assert!(CategoryTable::from_rules([rule("A", 1.5)]).is_err());
        let table = CategoryTable::from_rules([rule("A", 0.3)]).unwrap();
        assert!(table.get("A").is_some());
        assert!(table.get("a").is_none());
    }
}
