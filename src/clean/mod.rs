//! Record validation and the cleaning pipeline.
//!
//! - per-record checks (`validator`)
//! - deduplication, outliers, derived features and categories (`cleaner`)

pub mod cleaner;
pub mod validator;

pub use cleaner::*;
pub use validator::*;
