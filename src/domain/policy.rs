//! Analysis policy: every tunable threshold the pipeline uses.
//!
//! Defaults live in named constants so the algorithm code never carries magic
//! numbers. A policy can be loaded from TOML; missing keys fall back to the
//! defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Outlier bounds are `[Q1 - k·IQR, Q3 + k·IQR]`.
///
/// `k = 3` only catches extreme anomalies (typing errors, test rows), not
/// ordinary high-value sales.
pub const OUTLIER_IQR_MULTIPLIER: f64 = 3.0;

/// Below this many validated records, quartiles are not estimated at all.
pub const MIN_RECORDS_FOR_OUTLIERS: usize = 4;

/// Cumulative revenue share closing class A of the ABC curve.
pub const ABC_A_CUTOFF: f64 = 0.80;

/// Cumulative revenue share closing class B of the ABC curve.
pub const ABC_B_CUTOFF: f64 = 0.95;

/// Rows in the top-product table; also the product count behind "concentration".
pub const TOP_N_PRODUCTS: usize = 10;

/// Rows in the top-days table.
pub const TOP_N_DAYS: usize = 10;

/// Growth within ±1% between first and last month is reported as stable.
pub const STABLE_GROWTH_BAND_PCT: f64 = 1.0;

/// Temporal density at or above this is "high" data quality.
pub const DENSITY_HIGH: f64 = 0.8;

/// Temporal density at or above this (and below `DENSITY_HIGH`) is "medium".
pub const DENSITY_MEDIUM: f64 = 0.5;

/// Average ticket above `median unit price × this` is a "high" ticket.
pub const TICKET_HIGH_RATIO: f64 = 1.5;

/// Average ticket below `median unit price × this` is a "low" ticket.
pub const TICKET_LOW_RATIO: f64 = 0.5;

/// Category assigned when a product has no rule.
pub const DEFAULT_CATEGORY: &str = "Other";

/// Margin assigned when a product has no rule.
pub const DEFAULT_MARGIN: f64 = 0.20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisPolicy {
    pub outlier_iqr_multiplier: f64,
    pub min_records_for_outliers: usize,
    pub abc_a_cutoff: f64,
    pub abc_b_cutoff: f64,
    pub top_n_products: usize,
    pub top_n_days: usize,
    pub stable_growth_band_pct: f64,
    pub density_high: f64,
    pub density_medium: f64,
    pub ticket_high_ratio: f64,
    pub ticket_low_ratio: f64,
    pub default_category: String,
    pub default_margin: f64,
}

impl Default for AnalysisPolicy {
    fn default() -> Self {
        Self {
            outlier_iqr_multiplier: OUTLIER_IQR_MULTIPLIER,
            min_records_for_outliers: MIN_RECORDS_FOR_OUTLIERS,
            abc_a_cutoff: ABC_A_CUTOFF,
            abc_b_cutoff: ABC_B_CUTOFF,
            top_n_products: TOP_N_PRODUCTS,
            top_n_days: TOP_N_DAYS,
            stable_growth_band_pct: STABLE_GROWTH_BAND_PCT,
            density_high: DENSITY_HIGH,
            density_medium: DENSITY_MEDIUM,
            ticket_high_ratio: TICKET_HIGH_RATIO,
            ticket_low_ratio: TICKET_LOW_RATIO,
            default_category: DEFAULT_CATEGORY.to_string(),
            default_margin: DEFAULT_MARGIN,
        }
    }
}

impl AnalysisPolicy {
    /// Load a policy from a TOML file and validate it.
    pub fn from_toml_file(path: &Path) -> Result<Self, AppError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            AppError::input(format!("Failed to read policy file '{}': {e}", path.display()))
        })?;
        let policy: AnalysisPolicy = toml::from_str(&text).map_err(|e| {
            AppError::input(format!("Invalid policy file '{}': {e}", path.display()))
        })?;
        policy.validate()?;
        Ok(policy)
    }

    /// Reject thresholds that would make the algorithms meaningless.
    pub fn validate(&self) -> Result<(), AppError> {
        let fail = |msg: &str| Err(AppError::input(format!("Invalid analysis policy: {msg}")));

        if !(self.outlier_iqr_multiplier.is_finite() && self.outlier_iqr_multiplier > 0.0) {
            return fail("`outlier_iqr_multiplier` must be finite and > 0.");
        }
        if self.min_records_for_outliers < 2 {
            return fail("`min_records_for_outliers` must be at least 2.");
        }
        if !(self.abc_a_cutoff > 0.0 && self.abc_a_cutoff < self.abc_b_cutoff && self.abc_b_cutoff <= 1.0) {
            return fail("ABC cutoffs must satisfy 0 < a < b <= 1.");
        }
        if self.top_n_products == 0 || self.top_n_days == 0 {
            return fail("`top_n_products` and `top_n_days` must be > 0.");
        }
        if !(self.stable_growth_band_pct.is_finite() && self.stable_growth_band_pct >= 0.0) {
            return fail("`stable_growth_band_pct` must be finite and >= 0.");
        }
        if !(0.0 < self.density_medium && self.density_medium <= self.density_high && self.density_high <= 1.0) {
            return fail("density tiers must satisfy 0 < medium <= high <= 1.");
        }
        if !(0.0 < self.ticket_low_ratio && self.ticket_low_ratio <= self.ticket_high_ratio) {
            return fail("ticket tiers must satisfy 0 < low <= high.");
        }
        if self.default_category.trim().is_empty() {
            return fail("`default_category` must not be empty.");
        }
        if !(0.0..=1.0).contains(&self.default_margin) {
            return fail("`default_margin` must be within [0, 1].");
        }
        Ok(())
    }
}
