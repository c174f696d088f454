//! Domain types used throughout the pipeline.
//!
//! This module defines:
//!
//! - raw and enriched sales records (`RawRecord`, `EnrichedRecord`)
//! - category rules (`CategoryRule`, `CategoryTable`)
//! - the cleaning report and rejection reasons
//! - the tunable analysis policy (`AnalysisPolicy`)

pub mod policy;
pub mod types;

pub use policy::*;
pub use types::*;
