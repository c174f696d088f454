//! Command-line parsing for the sales analysis tool.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the cleaning/statistics code.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "sales", version, about = "Sales record cleaning, KPI statistics and automatic insights")]
pub struct Cli {
    /// Emit logs as JSON lines (stderr).
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Clean a sales CSV, compute KPIs and insights, print a summary and optionally export.
    Analyze(AnalyzeArgs),
    /// Infer a category rule table from the product names of a sales CSV.
    Categorize(CategorizeArgs),
}

#[derive(Debug, Args, Clone)]
pub struct AnalyzeArgs {
    /// Sales CSV (`date, product_name, unit_price, quantity`).
    #[arg(short, long, env = "SALES_INPUT", value_name = "CSV")]
    pub input: PathBuf,

    /// Category rule table (`product, category, margin`).
    #[arg(short, long, env = "SALES_CATEGORIES", value_name = "CSV")]
    pub categories: Option<PathBuf>,

    /// Analysis policy TOML; missing keys use the built-in defaults.
    #[arg(long, env = "SALES_POLICY", value_name = "TOML")]
    pub policy: Option<PathBuf>,

    /// Rows in the top-product table (overrides the policy).
    #[arg(long)]
    pub top: Option<usize>,

    /// Export cleaned records to CSV.
    #[arg(long, value_name = "CSV")]
    pub export_records: Option<PathBuf>,

    /// Export cleaning report, statistics and insights to JSON.
    #[arg(long, value_name = "JSON")]
    pub export_json: Option<PathBuf>,

    /// Do not print the terminal summary.
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Args, Clone)]
pub struct CategorizeArgs {
    /// Sales CSV to read product names from.
    #[arg(short, long, env = "SALES_INPUT", value_name = "CSV")]
    pub input: PathBuf,

    /// Where to write the inferred rule table.
    #[arg(short, long, value_name = "CSV")]
    pub out: PathBuf,
}
