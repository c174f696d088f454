//! Keyword-based category inference.
//!
//! Used by `sales categorize` to bootstrap a category rule table from the
//! product names of a cleaned sales file. Rules are checked in order, most
//! specific first (`mousepad` before `mouse`).

use std::collections::{BTreeMap, HashSet};

use regex::{Regex, RegexBuilder};
use serde::Serialize;
use tracing::info;

use crate::domain::{CategoryRule, EnrichedRecord};
use crate::error::AppError;

/// Category for names that match no keyword.
pub const FALLBACK_CATEGORY: &str = "Other";

/// `(pattern, category)` in match order.
const KEYWORD_RULES: [(&str, &str); 11] = [
    ("notebook", "Notebook"),
    ("monitor", "Monitor"),
    ("teclado|keyboard", "Keyboard"),
    ("headset", "Headset"),
    ("fone|earphone|headphone", "Headset"),
    ("mousepad", "Mousepad"),
    ("mouse", "Mouse"),
    ("webcam|camera", "Webcam"),
    ("ssd", "Storage"),
    (r"\bhd\b", "Storage"),
    ("memória|memoria|ram|ddr", "Memory"),
];

/// Suggested margin for an inferred category.
pub fn default_margin(category: &str) -> f64 {
    match category {
        "Notebook" | "Monitor" => 0.20,
        "Memory" | "Storage" => 0.25,
        "Mouse" | "Keyboard" => 0.35,
        "Headset" | "Webcam" => 0.30,
        "Mousepad" => 0.40,
        _ => 0.22,
    }
}

/// Compiled keyword rules.
#[derive(Debug, Clone)]
pub struct Categorizer {
    rules: Vec<(Regex, &'static str)>,
}

impl Categorizer {
    pub fn new() -> Result<Self, AppError> {
        let rules = KEYWORD_RULES
            .iter()
            .map(|&(pattern, category)| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(|re| (re, category))
                    .map_err(|e| AppError::output(format!("Invalid category pattern `{pattern}`: {e}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// First matching category, or `Other`.
    pub fn infer_category(&self, product_name: &str) -> &'static str {
        self.rules
            .iter()
            .find(|(re, _)| re.is_match(product_name))
            .map(|&(_, category)| category)
            .unwrap_or(FALLBACK_CATEGORY)
    }

    pub fn infer_rule(&self, product_name: &str) -> CategoryRule {
        let category = self.infer_category(product_name);
        CategoryRule {
            product_name: product_name.to_string(),
            category: category.to_string(),
            margin: default_margin(category),
        }
    }
}

/// Products per inferred category.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub products: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Inference {
    /// One rule per distinct product, in first-seen order.
    pub rules: Vec<CategoryRule>,
    /// Most products first, ties by category name.
    pub distribution: Vec<CategoryCount>,
}

/// Infer one rule per distinct product of a cleaned dataset.
pub fn infer_rules(records: &[EnrichedRecord]) -> Result<Inference, AppError> {
    let categorizer = Categorizer::new()?;

    let mut seen = HashSet::new();
    let rules: Vec<CategoryRule> = records
        .iter()
        .filter(|r| seen.insert(r.product_name.as_str()))
        .map(|r| categorizer.infer_rule(&r.product_name))
        .collect();

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for rule in &rules {
        *counts.entry(rule.category.as_str()).or_insert(0) += 1;
    }
    let mut distribution: Vec<CategoryCount> = counts
        .into_iter()
        .map(|(category, products)| CategoryCount {
            category: category.to_string(),
            products,
        })
        .collect();
    // Stable sort keeps the BTreeMap's name order among equal counts.
    distribution.sort_by(|a, b| b.products.cmp(&a.products));

    info!(
        products = rules.len(),
        categories = distribution.len(),
        "category rules inferred"
    );

    Ok(Inference { rules, distribution })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::tests::record;

    #[test]
    fn keywords_map_to_categories() {
        let c = Categorizer::new().unwrap();
        assert_eq!(c.infer_category("Notebook Dell Inspiron"), "Notebook");
        assert_eq!(c.infer_category("Monitor LG 24\""), "Monitor");
        assert_eq!(c.infer_category("Teclado Mecânico"), "Keyboard");
        assert_eq!(c.infer_category("Fone Bluetooth"), "Headset");
        assert_eq!(c.infer_category("SSD Kingston 480GB"), "Storage");
        assert_eq!(c.infer_category("HD Externo 1TB"), "Storage");
        assert_eq!(c.infer_category("Memória DDR4 8GB"), "Memory");
        assert_eq!(c.infer_category("Cadeira Gamer"), "Other");
    }

    #[test]
    fn specific_rules_win_over_general_ones() {
        let c = Categorizer::new().unwrap();
        assert_eq!(c.infer_category("Mousepad XL"), "Mousepad");
        assert_eq!(c.infer_category("Mouse Gamer"), "Mouse");
        assert_eq!(c.infer_category("Webcam HD"), "Webcam");
    }

    #[test]
    fn hd_needs_a_word_boundary() {
        let c = Categorizer::new().unwrap();
        assert_eq!(c.infer_category("HDMI Cable"), "Other");
    }

    #[test]
    fn rules_follow_first_seen_order_with_margins() {
        let records = vec![
            record("2024-01-01", "Mouse Gamer", 100.0, 1.0, 0.2),
            record("2024-01-02", "SSD 1TB", 300.0, 1.0, 0.2),
            record("2024-01-03", "Mouse Gamer", 100.0, 1.0, 0.2),
            record("2024-01-04", "Mouse Office", 50.0, 1.0, 0.2),
        ];
        let inference = infer_rules(&records).unwrap();
        let names: Vec<&str> = inference.rules.iter().map(|r| r.product_name.as_str()).collect();
        assert_eq!(names, vec!["Mouse Gamer", "SSD 1TB", "Mouse Office"]);
        assert!((inference.rules[0].margin - 0.35).abs() < 1e-12);
        assert!((inference.rules[1].margin - 0.25).abs() < 1e-12);

        assert_eq!(
            inference.distribution,
            vec![
                CategoryCount {
                    category: "Mouse".to_string(),
                    products: 2
                },
                CategoryCount {
                    category: "Storage".to_string(),
                    products: 1
                },
            ]
        );
    }

    #[test]
    fn unknown_category_margin_is_the_fallback() {
        assert!((default_margin("Other") - 0.22).abs() < 1e-12);
        assert!((default_margin("Chairs") - 0.22).abs() < 1e-12);
    }
}
