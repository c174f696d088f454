//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - initializes logging
//! - loads the sales file, rule table and policy
//! - runs the pipeline and prints the summary
//! - writes optional exports

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{AnalyzeArgs, CategorizeArgs, Cli, Command};
use crate::domain::AnalysisPolicy;
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `sales` binary.
pub fn run() -> Result<(), AppError> {
    // A missing .env is the normal case; report anything else once logging is up.
    let dotenv = dotenvy::dotenv();

    let cli = Cli::parse();
    crate::logging::init(cli.log_json);
    if let Some(e) = dotenv_failure(dotenv) {
        warn!(error = %e, "failed to load .env");
    }

    match cli.command {
        Command::Analyze(args) => handle_analyze(args),
        Command::Categorize(args) => handle_categorize(args),
    }
}

fn handle_analyze(args: AnalyzeArgs) -> Result<(), AppError> {
    let policy = policy_from_args(&args)?;
    let run = pipeline::run_files(&args.input, args.categories.as_deref(), &policy)?;

    if !args.quiet {
        println!("{}", crate::report::format_run_summary(&run));
    }

    if let Some(path) = &args.export_records {
        crate::io::write_records_csv(path, &run.records)?;
    }
    if let Some(path) = &args.export_json {
        crate::io::write_summary_json(path, &run)?;
    }

    Ok(())
}

fn handle_categorize(args: CategorizeArgs) -> Result<(), AppError> {
    let sales = crate::io::load_sales_csv(&args.input)?;
    let policy = AnalysisPolicy::default();
    let cleaned = crate::clean::clean(&sales.records, None, &policy);

    let inference = crate::catalog::infer_rules(&cleaned.records)?;
    crate::io::write_category_rules(&args.out, &inference.rules)?;

    println!("Inferred {} product rules:", inference.rules.len());
    for c in &inference.distribution {
        println!("- {:<12} {}", c.category, c.products);
    }
    info!(path = %args.out.display(), "category rules written");
    Ok(())
}

/// The error worth reporting from a `.env` load; a missing file is not one.
fn dotenv_failure<T>(result: dotenvy::Result<T>) -> Option<dotenvy::Error> {
    match result {
        Err(e) if !e.not_found() => Some(e),
        _ => None,
    }
}

/// Load the policy file (if any) and apply CLI overrides.
pub fn policy_from_args(args: &AnalyzeArgs) -> Result<AnalysisPolicy, AppError> {
    let mut policy = match &args.policy {
        Some(path) => AnalysisPolicy::from_toml_file(path)?,
        None => AnalysisPolicy::default(),
    };
    if let Some(top) = args.top {
        policy.top_n_products = top;
    }
    policy.validate()?;
    Ok(policy)
}
