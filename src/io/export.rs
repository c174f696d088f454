//! Exports: cleaned records to CSV, the run summary to JSON.
//!
//! The CSV is meant to be easy to consume in spreadsheets or downstream
//! scripts; its columns are the `EnrichedRecord` field names.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use serde::Serialize;
use tracing::info;

use crate::app::pipeline::RunOutput;
use crate::domain::{CleaningReport, EnrichedRecord};
use crate::error::AppError;
use crate::insights::Insight;
use crate::stats::StatisticsResult;

/// Write the cleaned, enriched records to a CSV file (ISO dates).
pub fn write_records_csv(path: &Path, records: &[EnrichedRecord]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    if records.is_empty() {
        // serde only emits the header alongside the first row.
        writer
            .write_record([
                "date",
                "product_name",
                "unit_price",
                "quantity",
                "revenue",
                "category",
                "margin",
                "profit",
                "year",
                "month",
                "weekday",
                "day_of_month",
                "iso_week",
            ])
            .map_err(|e| AppError::output(format!("Failed to write export CSV header: {e}")))?;
    }
    for r in records {
        writer
            .serialize(r)
            .map_err(|e| AppError::output(format!("Failed to write export CSV row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush export CSV '{}': {e}", path.display())))?;

    info!(path = %path.display(), rows = records.len(), "records exported");
    Ok(())
}

#[derive(Serialize)]
struct Summary<'a> {
    cleaning: &'a CleaningReport,
    statistics: &'a StatisticsResult,
    insights: &'a [Insight],
}

/// Write cleaning report, statistics and insights as pretty JSON.
pub fn write_summary_json(path: &Path, run: &RunOutput) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::output(format!("Failed to create summary JSON '{}': {e}", path.display())))?;

    let summary = Summary {
        cleaning: &run.report,
        statistics: &run.statistics,
        insights: &run.insights,
    };
    serde_json::to_writer_pretty(BufWriter::new(file), &summary)
        .map_err(|e| AppError::output(format!("Failed to write summary JSON '{}': {e}", path.display())))?;

    info!(path = %path.display(), "summary exported");
    Ok(())
}
