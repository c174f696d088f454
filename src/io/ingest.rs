//! Sales CSV ingest.
//!
//! This module turns a sales export into untrusted `RawRecord`s. It only
//! enforces the file's *structure* (readable, decodable, required columns
//! present); every per-row judgement belongs to the cleaner.
//!
//! Design goals:
//! - **Strict schema** for required columns (clear errors + exit code 2)
//! - **Lenient rows**: short rows yield blank fields, all values stay text
//! - **Separation of concerns**: no validation or cleaning logic here

use std::collections::HashMap;
use std::path::Path;

use csv::StringRecord;
use tracing::{info, warn};

use crate::domain::{RawRecord, RawValue};
use crate::error::AppError;

/// Canonical column names and the header spellings accepted for each.
const COLUMN_ALIASES: [(&str, &[&str]); 4] = [
    ("date", &["date", "data"]),
    ("product_name", &["product_name", "product", "produto"]),
    ("unit_price", &["unit_price", "price", "valor"]),
    ("quantity", &["quantity", "qty", "quantidade"]),
];

/// A loaded sales file.
#[derive(Debug, Clone)]
pub struct SalesFile {
    pub records: Vec<RawRecord>,
    /// Data rows read (header excluded).
    pub rows_read: usize,
    /// Normalized header names, in file order.
    pub columns: Vec<String>,
}

/// Load a sales CSV into raw records.
pub fn load_sales_csv(path: &Path) -> Result<SalesFile, AppError> {
    validate_input_path(path);

    let text = read_text(path)?;
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers from '{}': {e}", path.display())))?
        .clone();
    let header_map = build_header_map(&headers);
    let columns: Vec<String> = headers.iter().map(normalize_header_name).collect();

    let [date_idx, product_idx, price_idx, qty_idx] = resolve_columns(&header_map, &columns)?;

    let mut records = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        // records() starts after the header, and lines are 1-based.
        let line = idx + 2;
        let row = result
            .map_err(|e| AppError::input(format!("CSV parse error in '{}' at line {line}: {e}", path.display())))?;

        records.push(RawRecord {
            date: field(&row, date_idx).to_string(),
            product_name: field(&row, product_idx).to_string(),
            unit_price: Some(RawValue::Text(field(&row, price_idx).to_string())),
            quantity: Some(RawValue::Text(field(&row, qty_idx).to_string())),
        });
    }

    if records.is_empty() {
        return Err(AppError::new(
            3,
            format!("Sales file '{}' has no data rows.", path.display()),
        ));
    }

    info!(path = %path.display(), rows = records.len(), "sales file loaded");

    Ok(SalesFile {
        rows_read: records.len(),
        records,
        columns,
    })
}

/// Read a file as text: UTF-8 first, Latin-1 as a fallback.
pub(crate) fn read_text(path: &Path) -> Result<String, AppError> {
    let bytes = std::fs::read(path)
        .map_err(|e| AppError::input(format!("Failed to open '{}': {e}", path.display())))?;

    let text = match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            warn!(path = %path.display(), "file is not valid UTF-8, decoding as Latin-1");
            // Latin-1 maps every byte to the code point of the same value.
            e.into_bytes().iter().map(|&b| char::from(b)).collect()
        }
    };

    Ok(match text.strip_prefix('\u{feff}') {
        Some(rest) => rest.to_string(),
        None => text,
    })
}

pub(crate) fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    let mut map = HashMap::new();
    for (idx, name) in headers.iter().enumerate() {
        // First occurrence wins on repeated headers.
        map.entry(normalize_header_name(name)).or_insert(idx);
    }
    map
}

pub(crate) fn normalize_header_name(name: &str) -> String {
    name.trim().trim_start_matches('\u{feff}').to_lowercase()
}

/// Index of the first alias present in the header, if any.
pub(crate) fn find_column(header_map: &HashMap<String, usize>, aliases: &[&str]) -> Option<usize> {
    aliases.iter().find_map(|a| header_map.get(*a).copied())
}

fn resolve_columns(header_map: &HashMap<String, usize>, columns: &[String]) -> Result<[usize; 4], AppError> {
    let mut out = [0usize; 4];
    for (slot, (name, aliases)) in out.iter_mut().zip(COLUMN_ALIASES) {
        *slot = find_column(header_map, aliases).ok_or_else(|| {
            AppError::input(format!(
                "Missing required column: `{name}` (accepted: {}). Available columns: {}",
                aliases.join(", "),
                columns.join(", ")
            ))
        })?;
    }
    Ok(out)
}

pub(crate) fn field(row: &StringRecord, idx: usize) -> &str {
    row.get(idx).unwrap_or("")
}

fn validate_input_path(path: &Path) {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        warn!(path = %path.display(), "input file does not have a .csv extension");
    }
}
