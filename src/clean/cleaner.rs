//! Cleaning pipeline: raw rows in, enriched records plus a report out.
//!
//! Stages run in a fixed order, each on the survivors of the previous one:
//! deduplicate → validate → drop revenue outliers → derive features → categorize.
//! Survivors keep their relative input order.

use std::collections::{BTreeMap, HashSet};

use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::clean::validator::{canonical_amount, canonical_date, validate};
use crate::domain::{
    AnalysisPolicy, CategoryTable, CleaningReport, EnrichedRecord, OutlierBounds, RawRecord, Rejection,
    ValidRecord,
};
use crate::math::quartiles;

/// Output of `clean`.
#[derive(Debug, Clone)]
pub struct Cleaned {
    pub records: Vec<EnrichedRecord>,
    pub report: CleaningReport,
}

/// Clean and enrich a batch of raw records.
///
/// Never fails: bad rows are dropped and counted. Policy validation is the
/// caller's responsibility (see `app::pipeline`).
pub fn clean(raw: &[RawRecord], rules: Option<&CategoryTable>, policy: &AnalysisPolicy) -> Cleaned {
    let input_count = raw.len();

    // 1) Deduplicate (order-sensitive, must stay sequential).
    let unique = deduplicate(raw);
    let duplicate_count = input_count - unique.len();
    if duplicate_count > 0 {
        info!(duplicate_count, "removed duplicate rows");
    }

    // 2) Validate. Per-record and independent, so it may fan out; `collect`
    //    keeps input order.
    let outcomes: Vec<_> = unique
        .par_iter()
        .map(|&(index, record)| (index, validate(record)))
        .collect();

    let mut valid = Vec::with_capacity(outcomes.len());
    let mut rejections = Vec::new();
    let mut invalid_by_reason = BTreeMap::new();
    for (index, outcome) in outcomes {
        match outcome {
            Ok(record) => valid.push(record),
            Err(reason) => {
                debug!(index, %reason, "rejected row");
                *invalid_by_reason.entry(reason).or_insert(0) += 1;
                rejections.push(Rejection { index, reason });
            }
        }
    }
    let invalid_count = rejections.len();
    if invalid_count > 0 {
        info!(invalid_count, "removed invalid rows");
    }

    // 3) Outliers (global bounds over the whole surviving set).
    let (kept, outlier_bounds) = remove_outliers(valid, policy);
    let validated_count = input_count - duplicate_count - invalid_count;
    let outlier_count = validated_count - kept.len();
    if outlier_count > 0 {
        info!(outlier_count, "removed extreme revenue outliers");
    }

    // 4 + 5) Derived features and category enrichment.
    let mut uncategorized_count = 0usize;
    let records: Vec<EnrichedRecord> = kept
        .into_iter()
        .map(|record| {
            let (category, margin) = match rules.and_then(|t| t.get(&record.product_name)) {
                Some(rule) => (rule.category.clone(), rule.margin),
                None => {
                    uncategorized_count += 1;
                    (policy.default_category.clone(), policy.default_margin)
                }
            };
            EnrichedRecord::from_valid(record, category, margin)
        })
        .collect();

    if rules.is_some() && uncategorized_count > 0 {
        warn!(
            uncategorized_count,
            category = %policy.default_category,
            "records without a category rule, using default category"
        );
    }

    let output_count = records.len();
    let retention_rate = if input_count > 0 {
        output_count as f64 / input_count as f64
    } else {
        0.0
    };

    info!(input_count, output_count, retention_rate, "cleaning complete");

    Cleaned {
        records,
        report: CleaningReport {
            input_count,
            duplicate_count,
            invalid_count,
            invalid_by_reason,
            rejections,
            outlier_count,
            outlier_bounds,
            uncategorized_count,
            output_count,
            retention_rate,
        },
    }
}

/// Keep the first occurrence of each record. Fields are compared in canonical
/// form (ISO date, parsed amounts, trimmed and case-folded product name), so
/// spellings the validator treats as equal collapse here. Returns
/// `(input index, record)`.
fn deduplicate(raw: &[RawRecord]) -> Vec<(usize, &RawRecord)> {
    let mut seen = HashSet::with_capacity(raw.len());
    raw.iter()
        .enumerate()
        .filter(|(_, record)| seen.insert(dedup_key(record)))
        .collect()
}

fn dedup_key(record: &RawRecord) -> (String, String, Option<String>, Option<String>) {
    (
        canonical_date(&record.date),
        record.product_name.trim().to_lowercase(),
        record.unit_price.as_ref().map(canonical_amount),
        record.quantity.as_ref().map(canonical_amount),
    )
}

/// Drop records whose revenue falls outside `[Q1 - k·IQR, Q3 + k·IQR]`.
///
/// Skipped entirely (bounds `None`) below `policy.min_records_for_outliers`.
fn remove_outliers(records: Vec<ValidRecord>, policy: &AnalysisPolicy) -> (Vec<ValidRecord>, Option<OutlierBounds>) {
    if records.len() < policy.min_records_for_outliers {
        debug!(n = records.len(), "too few records for quartiles, skipping outlier removal");
        return (records, None);
    }

    let revenues: Vec<f64> = records.iter().map(ValidRecord::revenue).collect();
    let Some((q1, q3)) = quartiles(&revenues) else {
        return (records, None);
    };
    let iqr = q3 - q1;
    let bounds = OutlierBounds {
        q1,
        q3,
        lower: q1 - policy.outlier_iqr_multiplier * iqr,
        upper: q3 + policy.outlier_iqr_multiplier * iqr,
    };

    let kept = records
        .into_iter()
        .filter(|r| {
            let revenue = r.revenue();
            revenue >= bounds.lower && revenue <= bounds.upper
        })
        .collect();

    (kept, Some(bounds))
}
