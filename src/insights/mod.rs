//! Automatic textual insights derived from the KPIs.
//!
//! There are eight fixed insight kinds, always emitted in the same order. Each
//! one has its own precondition and is silently omitted when it does not hold,
//! so a partial set is a normal result.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::debug;

use crate::domain::{AnalysisPolicy, EnrichedRecord};
use crate::report::fmt_amount;
use crate::stats::{AbcClass, StatisticsResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightKind {
    ChampionProduct,
    BestWeekday,
    BestMonth,
    Trend,
    Concentration,
    TemporalQuality,
    PeakDay,
    AverageTicket,
}

impl InsightKind {
    pub const ALL: [InsightKind; 8] = [
        InsightKind::ChampionProduct,
        InsightKind::BestWeekday,
        InsightKind::BestMonth,
        InsightKind::Trend,
        InsightKind::Concentration,
        InsightKind::TemporalQuality,
        InsightKind::PeakDay,
        InsightKind::AverageTicket,
    ];
}

/// Direction of first-to-last month revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Growth,
    Decline,
    Stable,
}

/// Qualitative tier shared by temporal quality and ticket size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    High,
    Medium,
    Low,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            TrendLabel::Growth => "growth",
            TrendLabel::Decline => "decline",
            TrendLabel::Stable => "stable",
        })
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Tier::High => "high",
            Tier::Medium => "medium",
            Tier::Low => "low",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub message: String,
    /// The numbers and labels the message was built from.
    pub values: BTreeMap<String, Value>,
}

impl Insight {
    fn new(kind: InsightKind, message: String, values: impl IntoIterator<Item = (&'static str, Value)>) -> Self {
        Self {
            kind,
            message,
            values: values.into_iter().map(|(k, v)| (k.to_string(), v)).collect(),
        }
    }

    pub fn value(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }
}

/// Derive every insight whose precondition holds, in `InsightKind::ALL` order.
pub fn derive(records: &[EnrichedRecord], stats: &StatisticsResult, policy: &AnalysisPolicy) -> Vec<Insight> {
    InsightKind::ALL
        .iter()
        .filter_map(|&kind| {
            let insight = match kind {
                InsightKind::ChampionProduct => champion_product(stats),
                InsightKind::BestWeekday => best_weekday(stats),
                InsightKind::BestMonth => best_month(stats),
                InsightKind::Trend => trend(stats, policy),
                InsightKind::Concentration => concentration(stats),
                InsightKind::TemporalQuality => temporal_quality(stats, policy),
                InsightKind::PeakDay => peak_day(records, stats),
                InsightKind::AverageTicket => average_ticket(stats, policy),
            };
            if insight.is_none() {
                debug!(?kind, "insight omitted, precondition not met");
            }
            insight
        })
        .collect()
}

fn champion_product(stats: &StatisticsResult) -> Option<Insight> {
    let gmv = stats.financial.gmv;
    let top = stats.products.ranking.first().filter(|_| gmv > 0.0)?;
    let share_pct = top.share * 100.0;
    Some(Insight::new(
        InsightKind::ChampionProduct,
        format!(
            "{} is the champion product, generating {} ({share_pct:.1}% of total revenue).",
            top.product_name,
            fmt_amount(top.revenue),
        ),
        [
            ("product_name", json!(top.product_name)),
            ("revenue", json!(top.revenue)),
            ("share_pct", json!(share_pct)),
        ],
    ))
}

fn best_weekday(stats: &StatisticsResult) -> Option<Insight> {
    let gmv = stats.financial.gmv;
    let best = stats.temporal.best_weekday.as_ref().filter(|_| gmv > 0.0)?;
    let share_pct = best.revenue / gmv * 100.0;
    Some(Insight::new(
        InsightKind::BestWeekday,
        format!(
            "{} is the best day for sales, with {} in accumulated revenue ({share_pct:.1}% of total).",
            best.name,
            fmt_amount(best.revenue),
        ),
        [
            ("weekday", json!(best.name)),
            ("weekday_index", json!(best.weekday)),
            ("revenue", json!(best.revenue)),
            ("share_pct", json!(share_pct)),
        ],
    ))
}

fn best_month(stats: &StatisticsResult) -> Option<Insight> {
    let best = stats.temporal.best_month?;
    Some(Insight::new(
        InsightKind::BestMonth,
        format!(
            "The best month was {}, with {} in revenue.",
            best.label(),
            fmt_amount(best.revenue)
        ),
        [
            ("month", json!(best.key())),
            ("revenue", json!(best.revenue)),
        ],
    ))
}

fn trend(stats: &StatisticsResult, policy: &AnalysisPolicy) -> Option<Insight> {
    let growth = stats.temporal.growth_pct?;
    let months = &stats.temporal.monthly_revenue;
    let (first, last) = (months.first()?, months.last()?);

    let label = if growth.abs() < policy.stable_growth_band_pct {
        TrendLabel::Stable
    } else if growth > 0.0 {
        TrendLabel::Growth
    } else {
        TrendLabel::Decline
    };
    let period = format!("between {} and {}", first.label(), last.label());
    let message = match label {
        TrendLabel::Growth => format!("Revenue grew {growth:.1}% {period}."),
        TrendLabel::Decline => format!(
            "Revenue declined {:.1}% {period}; a detailed review is recommended.",
            growth.abs()
        ),
        TrendLabel::Stable => format!("Sales were stable, varying {growth:.1}% {period}."),
    };

    Some(Insight::new(
        InsightKind::Trend,
        message,
        [
            ("label", json!(label)),
            ("growth_pct", json!(growth)),
            ("first_month", json!(first.key())),
            ("last_month", json!(last.key())),
        ],
    ))
}

fn concentration(stats: &StatisticsResult) -> Option<Insight> {
    if stats.products.abc.is_empty() || stats.financial.gmv <= 0.0 {
        return None;
    }
    let (count, share) = stats.products.class_summary(AbcClass::A);
    let share_pct = share * 100.0;
    let noun = if count == 1 { "product" } else { "products" };
    Some(Insight::new(
        InsightKind::Concentration,
        format!("{count} class-A {noun} account for {share_pct:.1}% of total revenue."),
        [
            ("class_a_count", json!(count)),
            ("class_a_share_pct", json!(share_pct)),
            ("product_count", json!(stats.products.product_count)),
        ],
    ))
}

fn temporal_quality(stats: &StatisticsResult, policy: &AnalysisPolicy) -> Option<Insight> {
    let t = &stats.temporal;
    if t.span_days <= 0 {
        return None;
    }
    let density = t.temporal_density;
    let tier = if density >= policy.density_high {
        Tier::High
    } else if density >= policy.density_medium {
        Tier::Medium
    } else {
        Tier::Low
    };
    let density_pct = density * 100.0;
    let tail = match tier {
        Tier::High => "the period is well covered",
        Tier::Medium => "some gaps may affect trend analysis",
        Tier::Low => "significant gaps may distort conclusions",
    };
    Some(Insight::new(
        InsightKind::TemporalQuality,
        format!(
            "Data coverage is {tier}: sales on {} of {} days ({density_pct:.1}%), {tail}.",
            t.days_with_sales, t.span_days
        ),
        [
            ("tier", json!(tier)),
            ("density", json!(density)),
            ("days_with_sales", json!(t.days_with_sales)),
            ("span_days", json!(t.span_days)),
        ],
    ))
}

fn peak_day(records: &[EnrichedRecord], stats: &StatisticsResult) -> Option<Insight> {
    let peak = stats.temporal.top_days.first()?;
    let sales = records.iter().filter(|r| r.date == peak.date).count();
    Some(Insight::new(
        InsightKind::PeakDay,
        format!(
            "Highest-revenue day: {}, with {} across {sales} sale(s).",
            peak.date.format("%Y-%m-%d"),
            fmt_amount(peak.revenue)
        ),
        [
            ("date", json!(peak.date)),
            ("revenue", json!(peak.revenue)),
            ("transactions", json!(sales)),
        ],
    ))
}

fn average_ticket(stats: &StatisticsResult, policy: &AnalysisPolicy) -> Option<Insight> {
    let ticket = stats.financial.average_ticket;
    let median = stats.products.median_unit_price;
    if stats.financial.transaction_count == 0 || median <= 0.0 {
        return None;
    }
    let ratio = ticket / median;
    let tier = if ratio > policy.ticket_high_ratio {
        Tier::High
    } else if ratio < policy.ticket_low_ratio {
        Tier::Low
    } else {
        Tier::Medium
    };
    let hint = match tier {
        Tier::High => "customers buy in volume or premium items",
        Tier::Medium => "in line with typical product prices",
        Tier::Low => "consider upsell and bundling strategies",
    };
    Some(Insight::new(
        InsightKind::AverageTicket,
        format!(
            "Average ticket of {} is {tier} against a median product price of {}: {hint}.",
            fmt_amount(ticket),
            fmt_amount(median)
        ),
        [
            ("tier", json!(tier)),
            ("average_ticket", json!(ticket)),
            ("median_unit_price", json!(median)),
            ("ratio", json!(ratio)),
        ],
    ))
}
