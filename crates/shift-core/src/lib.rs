//! Domain types shared by the CNC shift report crates.
//!
//! Holds the shift/counter model, the error type, calendar-date resolution
//! for uploaded exports, display formatting and command-line settings.

pub mod error;
pub mod formatting;
pub mod models;
pub mod settings;
pub mod time_utils;
