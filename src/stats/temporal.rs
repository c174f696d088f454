//! Temporal KPIs: daily/monthly/weekday series, bests, growth and density.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisPolicy, EnrichedRecord, MONTH_NAMES, WEEKDAY_NAMES};
use crate::stats::financial::ratio;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayRevenue {
    pub date: NaiveDate,
    pub revenue: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthRevenue {
    pub year: i32,
    pub month: u32,
    pub revenue: f64,
}

impl MonthRevenue {
    /// `YYYY-MM`.
    pub fn key(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }

    /// `Jan/2024`.
    pub fn label(&self) -> String {
        let name = MONTH_NAMES
            .get(self.month.saturating_sub(1) as usize)
            .copied()
            .unwrap_or("?");
        format!("{name}/{}", self.year)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeekdayRevenue {
    /// 0 = Monday … 6 = Sunday.
    pub weekday: u32,
    pub name: String,
    pub revenue: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalStats {
    /// Ascending by date; only days with sales.
    pub daily_revenue: Vec<DayRevenue>,
    /// Ascending by year-month.
    pub monthly_revenue: Vec<MonthRevenue>,
    /// All seven weekdays, Monday first, zero-filled.
    pub weekday_revenue: Vec<WeekdayRevenue>,
    pub best_weekday: Option<WeekdayRevenue>,
    pub best_month: Option<MonthRevenue>,
    pub worst_month: Option<MonthRevenue>,
    /// Highest-revenue days, ties by earlier date.
    pub top_days: Vec<DayRevenue>,
    /// `(last month − first month) / first month × 100`.
    pub growth_pct: Option<f64>,
    /// Inclusive calendar span (`last − first + 1`), 0 when empty.
    pub span_days: i64,
    pub days_with_sales: usize,
    /// `days_with_sales / span_days`, in `[0, 1]`.
    pub temporal_density: f64,
}

pub fn temporal_stats(records: &[EnrichedRecord], policy: &AnalysisPolicy) -> TemporalStats {
    let mut daily: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    let mut monthly: BTreeMap<(i32, u32), f64> = BTreeMap::new();
    let mut weekday = [0.0_f64; 7];

    for r in records {
        *daily.entry(r.date).or_insert(0.0) += r.revenue;
        *monthly.entry((r.year, r.month)).or_insert(0.0) += r.revenue;
        if let Some(slot) = weekday.get_mut(r.weekday as usize) {
            *slot += r.revenue;
        }
    }

    let daily_revenue: Vec<DayRevenue> = daily
        .iter()
        .map(|(&date, &revenue)| DayRevenue { date, revenue })
        .collect();
    let monthly_revenue: Vec<MonthRevenue> = monthly
        .iter()
        .map(|(&(year, month), &revenue)| MonthRevenue { year, month, revenue })
        .collect();
    let weekday_revenue: Vec<WeekdayRevenue> = weekday
        .iter()
        .zip(WEEKDAY_NAMES)
        .enumerate()
        .map(|(idx, (&revenue, name))| WeekdayRevenue {
            weekday: idx as u32,
            name: name.to_string(),
            revenue,
        })
        .collect();

    // Strict comparisons keep the earliest candidate on ties.
    let best_weekday = if records.is_empty() {
        None
    } else {
        weekday_revenue
            .iter()
            .fold(None::<&WeekdayRevenue>, |best, w| match best {
                Some(b) if b.revenue >= w.revenue => Some(b),
                _ => Some(w),
            })
            .cloned()
    };
    let best_month = monthly_revenue
        .iter()
        .fold(None::<&MonthRevenue>, |best, m| match best {
            Some(b) if b.revenue >= m.revenue => Some(b),
            _ => Some(m),
        })
        .copied();
    let worst_month = monthly_revenue
        .iter()
        .fold(None::<&MonthRevenue>, |worst, m| match worst {
            Some(w) if w.revenue <= m.revenue => Some(w),
            _ => Some(m),
        })
        .copied();

    let mut top_days = daily_revenue.clone();
    top_days.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.date.cmp(&b.date)));
    top_days.truncate(policy.top_n_days);

    let growth_pct = match (monthly_revenue.first(), monthly_revenue.last()) {
        (Some(first), Some(last)) if monthly_revenue.len() >= 2 && first.revenue != 0.0 => {
            Some((last.revenue - first.revenue) / first.revenue * 100.0)
        }
        _ => None,
    };

    let span_days = match (daily_revenue.first(), daily_revenue.last()) {
        (Some(first), Some(last)) => (last.date - first.date).num_days() + 1,
        _ => 0,
    };
    let days_with_sales = daily_revenue.len();

    TemporalStats {
        daily_revenue,
        monthly_revenue,
        weekday_revenue,
        best_weekday,
        best_month,
        worst_month,
        top_days,
        growth_pct,
        span_days,
        days_with_sales,
        temporal_density: ratio(days_with_sales as f64, span_days as f64),
    }
}
