//! Survey summary computation.
//!
//! Aggregation of the raw result and grouping of free-text answers.

pub mod aggregator;
pub mod grouper;

pub use aggregator::*;
pub use grouper::*;
