//! Input/output helpers.
//!
//! - sales CSV ingest (`ingest`)
//! - category rule tables (`categories`)
//! - record CSV and summary JSON exports (`export`)

pub mod categories;
pub mod export;
pub mod ingest;

pub use categories::*;
pub use export::*;
pub use ingest::*;
