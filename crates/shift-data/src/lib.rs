//! Data ingestion layer for the CNC shift report.
//!
//! Responsible for finding and reading spreadsheet exports, turning each
//! into a day summary, keeping the collected days in date order, pivoting
//! them into a date x (machine, shift) table and exporting chart series.

pub mod aggregator;
pub mod collection;
pub mod export;
pub mod extractor;
pub mod reader;

pub use shift_core as core;
