//! Financial KPIs: GMV, profit, margin, ticket and daily averages.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::EnrichedRecord;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStats {
    /// Gross merchandise value (sum of revenue).
    pub gmv: f64,
    pub total_profit: f64,
    /// `total_profit / gmv`, 0 when GMV is 0.
    pub average_margin: f64,
    /// `gmv / transaction_count`, 0 without transactions.
    pub average_ticket: f64,
    /// `gmv / days with at least one sale`.
    pub average_daily_revenue: f64,
    pub transaction_count: usize,
    pub total_units: f64,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
}

pub fn financial_stats(records: &[EnrichedRecord]) -> FinancialStats {
    let gmv: f64 = records.iter().map(|r| r.revenue).sum();
    let total_profit: f64 = records.iter().map(|r| r.profit).sum();
    let total_units: f64 = records.iter().map(|r| r.quantity).sum();
    let transaction_count = records.len();

    let days: BTreeSet<NaiveDate> = records.iter().map(|r| r.date).collect();

    FinancialStats {
        gmv,
        total_profit,
        average_margin: ratio(total_profit, gmv),
        average_ticket: ratio(gmv, transaction_count as f64),
        average_daily_revenue: ratio(gmv, days.len() as f64),
        transaction_count,
        total_units,
        first_date: days.first().copied(),
        last_date: days.last().copied(),
    }
}

/// `num / den`, or 0 when the denominator is 0.
pub(crate) fn ratio(num: f64, den: f64) -> f64 {
    if den == 0.0 { 0.0 } else { num / den }
}
