//! KPI computation over the enriched dataset.
//!
//! Responsibilities:
//!
//! - financial totals and ratios (`financial`)
//! - product ranking, ABC curve and category mix (`product`)
//! - daily/monthly/weekday series, growth and temporal density (`temporal`)
//!
//! Every ratio guards its denominator, so an empty dataset yields a result of
//! zeros and empty series instead of an error.

pub mod financial;
pub mod product;
pub mod temporal;

pub use financial::*;
pub use product::*;
pub use temporal::*;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{AnalysisPolicy, EnrichedRecord};

/// All KPIs for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatisticsResult {
    pub financial: FinancialStats,
    pub products: ProductStats,
    pub temporal: TemporalStats,
}

/// Compute every KPI group.
pub fn compute(records: &[EnrichedRecord], policy: &AnalysisPolicy) -> StatisticsResult {
    let financial = financial_stats(records);
    let products = product_stats(records, financial.gmv, policy);
    let temporal = temporal_stats(records, policy);

    info!(
        gmv = financial.gmv,
        products = products.product_count,
        months = temporal.monthly_revenue.len(),
        "statistics computed"
    );

    StatisticsResult {
        financial,
        products,
        temporal,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::ValidRecord;

    /// An enriched record in the default category.
    pub(crate) fn record(date: &str, product: &str, unit_price: f64, quantity: f64, margin: f64) -> EnrichedRecord {
        let valid = ValidRecord {
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            product_name: product.to_string(),
            unit_price,
            quantity,
        };
        EnrichedRecord::from_valid(valid, "Other".to_string(), margin)
    }

    #[test]
    fn compute_on_empty_dataset_is_zeroed() {
        let stats = compute(&[], &AnalysisPolicy::default());
        assert_eq!(stats.financial.gmv, 0.0);
        assert_eq!(stats.financial.average_margin, 0.0);
        assert_eq!(stats.financial.average_ticket, 0.0);
        assert_eq!(stats.products.concentration, 0.0);
        assert_eq!(stats.temporal.temporal_density, 0.0);
        assert!(stats.products.ranking.is_empty());
    }

    #[test]
    fn statistics_serialize_to_named_sections() {
        let stats = compute(&[record("2024-01-01", "A", 10.0, 2.0, 0.2)], &AnalysisPolicy::default());
        let value = serde_json::to_value(&stats).unwrap();
        assert_eq!(value["financial"]["gmv"], 20.0);
        assert_eq!(value["products"]["abc"][0]["class"], "A");
        assert_eq!(value["temporal"]["best_weekday"]["name"], "Monday");
    }
}
