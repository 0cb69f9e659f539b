//! Terminal UI layer for the HR dashboard.
//!
//! Provides themes, the header and KPI card components, charts, summary and
//! segment tables, the plain-text report and the main application event loop
//! built on top of [`ratatui`].

pub mod app;
pub mod charts;
pub mod components;
pub mod report;
pub mod table_view;
pub mod themes;

pub use hr_core as core;
