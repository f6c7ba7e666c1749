//! Application layer: fee calculation, batch orchestration and aggregation.
//!
//! `calculator` is the pure pricing function, `engine` drives batches of
//! transactions over a shared channel registry, and `analyzer` folds the
//! priced records into summary tables.

pub mod analyzer;
pub mod calculator;
pub mod engine;
