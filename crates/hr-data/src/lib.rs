//! Data layer for the HR dashboard.
//!
//! Reads the employee workbooks, merges them into one employee table,
//! optionally anonymizes it, aggregates monthly and per-segment figures and
//! exports the monthly summary.

pub mod aggregator;
pub mod analysis;
pub mod anonymizer;
pub mod export;
pub mod reader;
pub mod source;

pub use hr_core as core;
