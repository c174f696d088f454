//! `sales-insights` library crate.
//!
//! The binary (`sales`) is a thin wrapper around this library so that:
//!
//! - core logic is testable without spawning processes
//! - the pipeline can be embedded (notebook, service) without the CLI
//!
//! Pipeline: raw records -> `clean` -> `stats` -> `insights`, threaded by
//! `app::pipeline`.

pub mod app;
pub mod catalog;
pub mod clean;
pub mod cli;
pub mod domain;
pub mod error;
pub mod insights;
pub mod io;
pub mod logging;
pub mod math;
pub mod report;
pub mod stats;

pub use app::pipeline::{RunOutput, run, run_with_policy};
pub use error::AppError;
