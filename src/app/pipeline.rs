//! Shared analysis pipeline used by the CLI and by library callers.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! clean -> statistics -> insights
//!
//! Each stage is a function from immutable input to immutable output; the
//! pipeline only threads results from one stage to the next.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::clean::{Cleaned, clean};
use crate::domain::{AnalysisPolicy, CategoryTable, CleaningReport, EnrichedRecord, RawRecord};
use crate::error::AppError;
use crate::insights::Insight;
use crate::stats::StatisticsResult;

/// All computed outputs of a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunOutput {
    pub records: Vec<EnrichedRecord>,
    pub report: CleaningReport,
    pub statistics: StatisticsResult,
    pub insights: Vec<Insight>,
}

/// Run the pipeline with the default policy.
pub fn run(raw: &[RawRecord], rules: Option<&CategoryTable>) -> Result<RunOutput, AppError> {
    run_with_policy(raw, rules, &AnalysisPolicy::default())
}

/// Run the pipeline with a tuned policy.
///
/// The policy is validated before any stage runs; that is the only error this
/// function can return. An empty dataset flows through every stage.
pub fn run_with_policy(
    raw: &[RawRecord],
    rules: Option<&CategoryTable>,
    policy: &AnalysisPolicy,
) -> Result<RunOutput, AppError> {
    policy.validate()?;

    let Cleaned { records, report } = clean(raw, rules, policy);
    let statistics = crate::stats::compute(&records, policy);
    let insights = crate::insights::derive(&records, &statistics, policy);

    info!(
        records = records.len(),
        insights = insights.len(),
        "pipeline finished"
    );

    Ok(RunOutput {
        records,
        report,
        statistics,
        insights,
    })
}

/// Load a sales CSV (and optional rule table) from disk, then run the pipeline.
pub fn run_files(
    sales_path: &Path,
    categories_path: Option<&Path>,
    policy: &AnalysisPolicy,
) -> Result<RunOutput, AppError> {
    let sales = crate::io::load_sales_csv(sales_path)?;
    let rules = categories_path
        .map(crate::io::load_category_rules)
        .transpose()?;

    run_with_policy(&sales.records, rules.as_ref(), policy)
}
