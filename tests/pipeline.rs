//! End-to-end checks of the clean -> statistics -> insights pipeline.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::json;

use sales_insights::domain::{CategoryRule, CategoryTable, RawRecord, RawValue, RejectReason};
use sales_insights::insights::InsightKind;
use sales_insights::stats::AbcClass;
use sales_insights::{AppError, RunOutput, run};

const PRODUCTS: [&str; 8] = [
    "Mouse Gamer",
    "Teclado Mecânico",
    "Monitor 24",
    "SSD 480GB",
    "Headset USB",
    "Webcam HD",
    "Mousepad XL",
    "Notebook i5",
];

/// Realistic random sales: prices 10..100, quantities 1..5, over ~3 months.
fn random_sales(seed: u64, n: usize) -> Vec<RawRecord> {
    let mut rng = StdRng::seed_from_u64(seed);
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    (0..n)
        .map(|_| {
            let date = start + Duration::days(rng.gen_range(0..90));
            let product = PRODUCTS[rng.gen_range(0..PRODUCTS.len())];
            let price = (rng.gen_range(10.0..100.0_f64) * 100.0).round() / 100.0;
            let qty = rng.gen_range(1..=5) as f64;
            RawRecord::new(date.format("%Y-%m-%d").to_string(), product, price, qty)
        })
        .collect()
}

fn run_ok(raw: &[RawRecord]) -> RunOutput {
    run(raw, None).unwrap()
}

#[test]
fn exact_duplicate_pair_collapses_to_one_record() {
    let raw = vec![
        RawRecord::new("2024-01-01", "Mouse", 50.0, 2.0),
        RawRecord::new("2024-01-01", "Mouse", 50.0, 2.0),
    ];
    let out = run_ok(&raw);
    assert_eq!(out.records.len(), 1);
    assert_eq!(out.report.duplicate_count, 1);
}

#[test]
fn bad_date_empties_the_output() {
    let raw = vec![RawRecord::new("bad-date", "Mouse", 50.0, 1.0)];
    let out = run_ok(&raw);
    assert!(out.records.is_empty());
    assert_eq!(out.report.invalid_count, 1);
    assert_eq!(out.report.invalid_for(RejectReason::InvalidDate), 1);
}

#[test]
fn one_extreme_sale_is_an_outlier() {
    let mut raw: Vec<RawRecord> = (1..=10)
        .map(|d| RawRecord::new(format!("2024-01-{d:02}"), "Mouse", 100.0 + d as f64 * 0.5, 1.0))
        .collect();
    raw.push(RawRecord::new("2024-01-11", "Notebook", 100_000.0, 1.0));

    let out = run_ok(&raw);
    assert_eq!(out.report.outlier_count, 1);
    assert_eq!(out.records.len(), 10);
    assert!(out.records.iter().all(|r| r.product_name == "Mouse"));
}

#[test]
fn friday_beats_monday() {
    let raw = vec![
        RawRecord::new("2024-01-05", "A", 100.0, 1.0),
        RawRecord::new("2024-01-01", "A", 50.0, 1.0),
    ];
    let out = run_ok(&raw);
    let best = out.statistics.temporal.best_weekday.as_ref().unwrap();
    assert_eq!(best.name, "Friday");
    assert!((best.revenue - 100.0).abs() < 1e-9);

    let insight = out
        .insights
        .iter()
        .find(|i| i.kind == InsightKind::BestWeekday)
        .unwrap();
    assert_eq!(insight.value("weekday"), Some(&json!("Friday")));
    assert!(insight.message.contains("66.7%"));
}

#[test]
fn empty_input_is_not_an_error() {
    let out = run_ok(&[]);
    assert!(out.records.is_empty());
    assert!(out.insights.is_empty());
    assert_eq!(out.report.retention_rate, 0.0);
    let f = &out.statistics.financial;
    assert_eq!(f.gmv, 0.0);
    assert_eq!(f.average_margin, 0.0);
    assert_eq!(f.average_ticket, 0.0);
    assert_eq!(f.average_daily_revenue, 0.0);
    assert_eq!(out.statistics.products.concentration, 0.0);
    assert_eq!(out.statistics.temporal.temporal_density, 0.0);
}

#[test]
fn mixed_text_and_numbers_are_validated() {
    let raw = vec![
        RawRecord {
            date: "05/01/2024".to_string(),
            product_name: "Mouse".to_string(),
            unit_price: Some(RawValue::Text("89,90".to_string())),
            quantity: Some(RawValue::Text("2".to_string())),
        },
        RawRecord {
            date: "2024-01-06".to_string(),
            product_name: "Mouse".to_string(),
            unit_price: None,
            quantity: Some(RawValue::Number(1.0)),
        },
        RawRecord::new("2024-01-07", "!!!", 10.0, 1.0),
        RawRecord::new("2024-01-08", "Mouse", "abc", "1"),
    ];
    let out = run_ok(&raw);
    assert_eq!(out.records.len(), 1);
    assert!((out.records[0].revenue - 179.8).abs() < 1e-9);
    assert_eq!(out.report.invalid_for(RejectReason::MissingValue), 1);
    assert_eq!(out.report.invalid_for(RejectReason::InvalidProduct), 1);
    assert_eq!(out.report.invalid_for(RejectReason::InvalidNumeric), 1);
}

#[test]
fn category_rules_drive_profit() {
    let table = CategoryTable::from_rules([CategoryRule {
        product_name: "Mouse".to_string(),
        category: "Peripherals".to_string(),
        margin: 0.35,
    }])
    .unwrap();
    let raw = vec![
        RawRecord::new("2024-01-01", "Mouse", 100.0, 1.0),
        RawRecord::new("2024-01-02", "Cable", 100.0, 1.0),
    ];
    let out = run(&raw, Some(&table)).unwrap();
    assert!((out.statistics.financial.total_profit - (35.0 + 20.0)).abs() < 1e-9);
    assert_eq!(out.report.uncategorized_count, 1);
    assert_eq!(out.statistics.products.categories.len(), 2);
}

#[test]
fn duplicate_rule_is_fatal() {
    let rule = CategoryRule {
        product_name: "Mouse".to_string(),
        category: "A".to_string(),
        margin: 0.1,
    };
    assert!(CategoryTable::from_rules([rule.clone(), rule]).is_err());
}

#[test]
fn recleaning_clean_output_is_idempotent() {
    for seed in [1_u64, 7, 42] {
        let first = run_ok(&random_sales(seed, 200));
        let again: Vec<RawRecord> = first.records.iter().map(RawRecord::from).collect();
        let second = run_ok(&again);

        assert_eq!(second.report.duplicate_count, 0, "seed {seed}");
        assert_eq!(second.report.invalid_count, 0, "seed {seed}");
        assert_eq!(second.report.outlier_count, 0, "seed {seed}");
        assert_eq!(second.records, first.records, "seed {seed}");
    }
}

#[test]
fn recleaning_is_idempotent_across_spellings() {
    let raw = vec![
        RawRecord::new("2024-01-05", "Mouse", "50", "2"),
        RawRecord::new("2024-01-05", "Mouse", "50.00", "2"),
        RawRecord::new("05/01/2024", "Keyboard", "12,50", "1"),
        RawRecord::new("2024-01-05", "Keyboard", "12.5", "1"),
        RawRecord::new("2024-02-10", "Monitor", "899,9", "1"),
    ];
    let first = run_ok(&raw);
    assert_eq!(first.report.duplicate_count, 2);
    assert_eq!(first.records.len(), 3);

    let again: Vec<RawRecord> = first.records.iter().map(RawRecord::from).collect();
    let second = run_ok(&again);
    assert_eq!(second.report.duplicate_count, 0);
    assert_eq!(second.report.invalid_count, 0);
    assert_eq!(second.report.outlier_count, 0);
    assert_eq!(second.records, first.records);
}

#[test]
fn retention_and_revenue_invariants_hold() {
    let mut rng = StdRng::seed_from_u64(99);
    for seed in 0..5_u64 {
        let mut raw = random_sales(seed, 120);
        // Sprinkle duplicates and garbage.
        for _ in 0..20 {
            let idx = rng.gen_range(0..raw.len());
            let dup = raw[idx].clone();
            raw.push(dup);
        }
        raw.push(RawRecord::new("2024-13-45", "Mouse", 10.0, 1.0));
        raw.push(RawRecord::new("2024-02-01", "Mouse", -3.0, 1.0));

        let out = run_ok(&raw);
        let r = &out.report;
        assert!(r.output_count <= r.input_count);
        assert_eq!(r.input_count, raw.len());
        assert_eq!(
            r.input_count,
            r.duplicate_count + r.invalid_count + r.outlier_count + r.output_count
        );
        assert!((r.retention_rate - r.output_count as f64 / r.input_count as f64).abs() < 1e-12);

        for rec in &out.records {
            assert!((rec.revenue - rec.unit_price * rec.quantity).abs() < 1e-9);
        }
    }
}

#[test]
fn abc_classes_partition_the_products() {
    let out = run_ok(&random_sales(5, 300));
    let products = &out.statistics.products;

    let names: HashSet<&str> = out.records.iter().map(|r| r.product_name.as_str()).collect();
    let classified: HashSet<&str> = products.abc.iter().map(|e| e.product_name.as_str()).collect();
    assert_eq!(names, classified);
    assert_eq!(products.abc.len(), names.len());

    let total: usize = [AbcClass::A, AbcClass::B, AbcClass::C]
        .into_iter()
        .map(|c| products.class_summary(c).0)
        .sum();
    assert_eq!(total, names.len());
    assert_eq!(products.abc[0].class, AbcClass::A);
}

#[test]
fn single_month_has_no_growth_or_trend() {
    let raw = vec![
        RawRecord::new("2024-03-01", "A", 10.0, 1.0),
        RawRecord::new("2024-03-20", "B", 20.0, 1.0),
    ];
    let out = run_ok(&raw);
    assert!(out.statistics.temporal.growth_pct.is_none());
    assert!(out.insights.iter().all(|i| i.kind != InsightKind::Trend));
}

#[test]
fn insights_keep_fixed_order() {
    let out = run_ok(&random_sales(11, 150));
    let positions: Vec<usize> = out
        .insights
        .iter()
        .map(|i| InsightKind::ALL.iter().position(|k| *k == i.kind).unwrap())
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(out.insights.iter().any(|i| i.kind == InsightKind::Trend));
}

#[test]
fn missing_sales_file_is_an_input_error() {
    let err: AppError = sales_insights::io::load_sales_csv(std::path::Path::new("/no/such/sales.csv")).unwrap_err();
    assert_eq!(err.exit_code(), 2);
}
