//! Product KPIs: revenue ranking, ABC curve, concentration and category mix.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisPolicy, EnrichedRecord};
use crate::math::median;
use crate::stats::financial::ratio;

/// Guards cumulative-share comparisons against summation noise.
const SHARE_EPS: f64 = 1e-12;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRevenue {
    pub product_name: String,
    pub revenue: f64,
    pub units: f64,
    /// Fraction of GMV.
    pub share: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AbcClass {
    A,
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AbcEntry {
    pub product_name: String,
    pub revenue: f64,
    pub share: f64,
    /// Cumulative share including this product.
    pub cumulative_share: f64,
    pub class: AbcClass,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryBreakdown {
    pub category: String,
    pub revenue: f64,
    pub profit: f64,
    pub units: f64,
    pub transaction_count: usize,
    pub share: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductStats {
    pub product_count: usize,
    /// Every product, revenue descending, ties by name ascending.
    pub ranking: Vec<ProductRevenue>,
    /// The first `top_n_products` entries of `ranking`.
    pub top_products: Vec<ProductRevenue>,
    /// ABC class of every product, in ranking order.
    pub abc: Vec<AbcEntry>,
    /// GMV share of the top-N products.
    pub concentration: f64,
    pub categories: Vec<CategoryBreakdown>,
    /// Median over products of each product's median unit price.
    pub median_unit_price: f64,
}

impl ProductStats {
    /// Number of products in `class` and the GMV share they hold.
    pub fn class_summary(&self, class: AbcClass) -> (usize, f64) {
        self.abc
            .iter()
            .filter(|e| e.class == class)
            .fold((0, 0.0), |(n, share), e| (n + 1, share + e.share))
    }
}

#[derive(Default)]
struct ProductAcc {
    revenue: f64,
    units: f64,
    prices: Vec<f64>,
}

pub fn product_stats(records: &[EnrichedRecord], gmv: f64, policy: &AnalysisPolicy) -> ProductStats {
    let mut by_product: HashMap<&str, ProductAcc> = HashMap::new();
    for r in records {
        let acc = by_product.entry(r.product_name.as_str()).or_default();
        acc.revenue += r.revenue;
        acc.units += r.quantity;
        acc.prices.push(r.unit_price);
    }

    let product_medians: Vec<f64> = by_product.values().filter_map(|acc| median(&acc.prices)).collect();
    let median_unit_price = median(&product_medians).unwrap_or(0.0);

    let mut ranking: Vec<ProductRevenue> = by_product
        .into_iter()
        .map(|(name, acc)| ProductRevenue {
            product_name: name.to_string(),
            revenue: acc.revenue,
            units: acc.units,
            share: ratio(acc.revenue, gmv),
        })
        .collect();
    ranking.sort_by(|a, b| {
        b.revenue
            .total_cmp(&a.revenue)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });

    let top_products: Vec<ProductRevenue> = ranking.iter().take(policy.top_n_products).cloned().collect();
    let concentration = top_products.iter().map(|p| p.share).sum();

    ProductStats {
        product_count: ranking.len(),
        abc: classify_abc(&ranking, policy),
        top_products,
        ranking,
        concentration,
        categories: category_breakdown(records, gmv),
        median_unit_price,
    }
}

/// A product belongs to A while the cumulative share *before* it is below the
/// A cutoff, to B while below the B cutoff, else to C. The product that crosses
/// a cutoff therefore closes the lower-letter class. This differs from a
/// "cumulative share including the product is within the cutoff" rule, which
/// would push the crossing product into the next class; keep it this way.
fn classify_abc(ranking: &[ProductRevenue], policy: &AnalysisPolicy) -> Vec<AbcEntry> {
    let mut cumulative = 0.0;
    ranking
        .iter()
        .map(|p| {
            let before = cumulative;
            cumulative += p.share;
            let class = if before + SHARE_EPS < policy.abc_a_cutoff {
                AbcClass::A
            } else if before + SHARE_EPS < policy.abc_b_cutoff {
                AbcClass::B
            } else {
                AbcClass::C
            };
            AbcEntry {
                product_name: p.product_name.clone(),
                revenue: p.revenue,
                share: p.share,
                cumulative_share: cumulative,
                class,
            }
        })
        .collect()
}

fn category_breakdown(records: &[EnrichedRecord], gmv: f64) -> Vec<CategoryBreakdown> {
    let mut by_category: HashMap<&str, CategoryBreakdown> = HashMap::new();
    for r in records {
        let entry = by_category
            .entry(r.category.as_str())
            .or_insert_with(|| CategoryBreakdown {
                category: r.category.clone(),
                revenue: 0.0,
                profit: 0.0,
                units: 0.0,
                transaction_count: 0,
                share: 0.0,
            });
        entry.revenue += r.revenue;
        entry.profit += r.profit;
        entry.units += r.quantity;
        entry.transaction_count += 1;
    }

    let mut out: Vec<CategoryBreakdown> = by_category
        .into_values()
        .map(|mut c| {
            c.share = ratio(c.revenue, gmv);
            c
        })
        .collect();
    out.sort_by(|a, b| b.revenue.total_cmp(&a.revenue).then_with(|| a.category.cmp(&b.category)));
    out
}
