//! Category rule tables: `product,category,margin` CSV files.
//!
//! A rule table is configuration, so every defect in it is structural and
//! fatal: the error names the offending line.

use std::path::Path;

use tracing::info;

use crate::domain::{CategoryRule, CategoryTable};
use crate::error::AppError;
use crate::io::ingest::{build_header_map, field, find_column, read_text};

const PRODUCT_ALIASES: &[&str] = &["product", "product_name", "produto"];
const CATEGORY_ALIASES: &[&str] = &["category", "categoria", "categoria_sugerida"];
const MARGIN_ALIASES: &[&str] = &["margin", "margem", "margem_sugerida"];

/// Load and validate a category rule table.
pub fn load_category_rules(path: &Path) -> Result<CategoryTable, AppError> {
    let text = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read headers of '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);

    let column = |name: &str, aliases: &[&str]| {
        find_column(&header_map, aliases).ok_or_else(|| {
            AppError::input(format!(
                "Category rules '{}': missing required column `{name}` (accepted: {}).",
                path.display(),
                aliases.join(", ")
            ))
        })
    };
    let product_idx = column("product", PRODUCT_ALIASES)?;
    let category_idx = column("category", CATEGORY_ALIASES)?;
    let margin_idx = column("margin", MARGIN_ALIASES)?;

    let mut rules = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        let fail = |msg: String| AppError::input(format!("Category rules '{}', line {line}: {msg}", path.display()));

        let row = result.map_err(|e| fail(format!("CSV parse error: {e}")))?;
        let product_name = field(&row, product_idx);
        let category = field(&row, category_idx);
        let margin_text = field(&row, margin_idx);

        if product_name.is_empty() || category.is_empty() || margin_text.is_empty() {
            return Err(fail("product, category and margin are all required.".to_string()));
        }
        let margin: f64 = margin_text
            .replace(',', ".")
            .parse()
            .map_err(|_| fail(format!("margin `{margin_text}` is not a number.")))?;
        if !(0.0..=1.0).contains(&margin) {
            return Err(fail(format!("margin {margin} is outside [0, 1].")));
        }
        if rules.iter().any(|r: &CategoryRule| r.product_name == product_name) {
            return Err(fail(format!("duplicate rule for product `{product_name}`.")));
        }

        rules.push(CategoryRule {
            product_name: product_name.to_string(),
            category: category.to_string(),
            margin,
        });
    }

    let table = CategoryTable::from_rules(rules)
        .map_err(|e| AppError::input(format!("Category rules '{}': {e}", path.display())))?;
    info!(path = %path.display(), rules = table.len(), "category rules loaded");
    Ok(table)
}

/// Write rules in the format `load_category_rules` reads.
pub fn write_category_rules(path: &Path, rules: &[CategoryRule]) -> Result<(), AppError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| AppError::output(format!("Failed to create '{}': {e}", path.display())))?;

    writer
        .write_record(["product", "category", "margin"])
        .map_err(|e| AppError::output(format!("Failed to write rules header: {e}")))?;
    for r in rules {
        let margin = format!("{:.2}", r.margin);
        writer
            .write_record([r.product_name.as_str(), r.category.as_str(), margin.as_str()])
            .map_err(|e| AppError::output(format!("Failed to write rule row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| AppError::output(format!("Failed to flush '{}': {e}", path.display())))?;
    Ok(())
}
