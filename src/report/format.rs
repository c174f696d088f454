//! Formatted terminal output for a pipeline run.
//!
//! We keep formatting code in one place so:
//! - the cleaning/statistics code stays free of presentation concerns
//! - output changes are localized

use crate::app::pipeline::RunOutput;
use crate::domain::{CleaningReport, RejectReason};
use crate::insights::Insight;
use crate::stats::{AbcClass, StatisticsResult};

/// Format the full run summary: cleaning, KPIs, rankings, seasonality, insights.
pub fn format_run_summary(run: &RunOutput) -> String {
    let mut out = String::new();

    out.push_str("=== sales - Sales Analysis ===\n\n");
    out.push_str(&format_cleaning(&run.report));
    out.push('\n');
    out.push_str(&format_financial(&run.statistics));
    out.push('\n');
    out.push_str(&format_products(&run.statistics));
    out.push('\n');
    out.push_str(&format_seasonality(&run.statistics));
    out.push('\n');
    out.push_str(&format_insights(&run.insights));

    out
}

/// Cleaning counts and the per-reason breakdown.
pub fn format_cleaning(report: &CleaningReport) -> String {
    let mut out = String::new();
    out.push_str("Cleaning:\n");
    out.push_str(&format!("- input rows      : {}\n", report.input_count));
    out.push_str(&format!("- duplicates      : {}\n", report.duplicate_count));
    out.push_str(&format!("- invalid         : {}\n", report.invalid_count));
    for reason in RejectReason::ALL {
        let n = report.invalid_for(reason);
        if n > 0 {
            out.push_str(&format!("    {:<16} {n}\n", reason.label()));
        }
    }
    out.push_str(&format!("- outliers        : {}", report.outlier_count));
    if let Some(b) = &report.outlier_bounds {
        out.push_str(&format!(
            " (revenue bounds [{}, {}])",
            fmt_amount(b.lower),
            fmt_amount(b.upper)
        ));
    }
    out.push('\n');
    if report.uncategorized_count > 0 {
        out.push_str(&format!("- uncategorized   : {}\n", report.uncategorized_count));
    }
    out.push_str(&format!(
        "- clean records   : {} ({:.2}% retained)\n",
        report.output_count,
        report.retention_rate * 100.0
    ));
    out
}

fn format_financial(stats: &StatisticsResult) -> String {
    let f = &stats.financial;
    let mut out = String::new();
    out.push_str("Financial:\n");
    out.push_str(&format!("- GMV             : {}\n", fmt_amount(f.gmv)));
    out.push_str(&format!(
        "- est. profit     : {} (avg margin {:.2}%)\n",
        fmt_amount(f.total_profit),
        f.average_margin * 100.0
    ));
    out.push_str(&format!("- transactions    : {}\n", f.transaction_count));
    out.push_str(&format!("- units           : {}\n", fmt_units(f.total_units)));
    out.push_str(&format!("- average ticket  : {}\n", fmt_amount(f.average_ticket)));
    out.push_str(&format!("- avg daily rev.  : {}\n", fmt_amount(f.average_daily_revenue)));
    if let (Some(first), Some(last)) = (f.first_date, f.last_date) {
        out.push_str(&format!(
            "- period          : {first} .. {last} ({} days, {} with sales, density {:.1}%)\n",
            stats.temporal.span_days,
            stats.temporal.days_with_sales,
            stats.temporal.temporal_density * 100.0
        ));
    }
    out
}

fn format_products(stats: &StatisticsResult) -> String {
    let p = &stats.products;
    let mut out = String::new();

    out.push_str("Top products:\n");
    out.push_str(
        format!("{:<4} {:<28} {:>16} {:>8} {:>5}\n", "#", "product", "revenue", "share", "abc").trim_end(),
    );
    out.push('\n');
    out.push_str(format!("{:-<4} {:-<28} {:-<16} {:-<8} {:-<5}\n", "", "", "", "", "").trim_end());
    out.push('\n');
    for (idx, row) in p.top_products.iter().enumerate() {
        let class = p
            .abc
            .iter()
            .find(|e| e.product_name == row.product_name)
            .map(|e| format!("{:?}", e.class))
            .unwrap_or_default();
        out.push_str(
            format!(
                "{:<4} {:<28} {:>16} {:>7.1}% {:>5}\n",
                idx + 1,
                truncate(&row.product_name, 28),
                fmt_amount(row.revenue),
                row.share * 100.0,
                class,
            )
            .trim_end(),
        );
        out.push('\n');
    }
    out.push_str(&format!(
        "Top-{} concentration: {:.1}% of GMV\n",
        p.top_products.len(),
        p.concentration * 100.0
    ));

    out.push_str("ABC classes:");
    for class in [AbcClass::A, AbcClass::B, AbcClass::C] {
        let (n, share) = p.class_summary(class);
        out.push_str(&format!(" {class:?}={n} ({:.1}%)", share * 100.0));
    }
    out.push('\n');

    if !p.categories.is_empty() {
        out.push_str("Categories:\n");
        for c in &p.categories {
            out.push_str(&format!(
                "- {:<20} {:>16} {:>6.1}%  profit {}\n",
                truncate(&c.category, 20),
                fmt_amount(c.revenue),
                c.share * 100.0,
                fmt_amount(c.profit)
            ));
        }
    }
    out
}

fn format_seasonality(stats: &StatisticsResult) -> String {
    let t = &stats.temporal;
    let mut out = String::new();

    out.push_str("Revenue by weekday:\n");
    for w in &t.weekday_revenue {
        let marker = match &t.best_weekday {
            Some(best) if best.weekday == w.weekday => "*",
            _ => " ",
        };
        out.push_str(&format!("{marker} {:<10} {:>16}\n", w.name, fmt_amount(w.revenue)));
    }

    if !t.monthly_revenue.is_empty() {
        out.push_str("Revenue by month:\n");
        for m in &t.monthly_revenue {
            let marker = match &t.best_month {
                Some(best) if best.key() == m.key() => "*",
                _ => " ",
            };
            out.push_str(&format!("{marker} {:<10} {:>16}\n", m.key(), fmt_amount(m.revenue)));
        }
    }
    if let Some(g) = t.growth_pct {
        out.push_str(&format!("Growth (first → last month): {g:+.1}%\n"));
    }
    out
}

fn format_insights(insights: &[Insight]) -> String {
    let mut out = String::new();
    out.push_str(&format!("Insights ({}):\n", insights.len()));
    if insights.is_empty() {
        out.push_str("- (none: not enough data)\n");
    }
    for i in insights {
        out.push_str(&format!("- {}\n", i.message));
    }
    out
}

/// Two decimals with `,` thousands separators: `1234567.891` → `1,234,567.89`.
pub fn fmt_amount(v: f64) -> String {
    if !v.is_finite() {
        return format!("{v}");
    }
    let raw = format!("{:.2}", v.abs());
    let (int_part, frac_part) = raw.split_once('.').unwrap_or((raw.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if v < 0.0 && raw != "0.00" { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

fn fmt_units(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.0}")
    } else {
        format!("{v:.2}")
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}
