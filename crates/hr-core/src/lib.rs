//! Core types for the HR dashboard.
//!
//! Holds the error type, the employee and KPI data model, command-line
//! settings, month calendar helpers, rate calculations and number formatting
//! shared by the data and UI crates.

pub mod calculations;
pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
