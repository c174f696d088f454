//! Mathematical utilities: quantiles and medians for outlier bounds and pricing tiers.

pub mod quantile;

pub use quantile::*;
