//! Tiered retention: policy value object and the pure evaluator.
//!
//! - `policy`: the keep-counts and anchors, with validation
//! - `evaluator`: the three zone filters combined by set union

pub mod evaluator;
pub mod policy;

pub use evaluator::{evaluate, monthly_zone, purge_zone, weekly_zone};
pub use policy::{PolicyError, RetentionPolicy};
