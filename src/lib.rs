//! Cleaning and summarizing of title catalog exports.
//!
//! [`loader`] reads the raw CSV, [`clean`] turns it into one row per
//! (title, genre) with imputed sentinels, resolved dates and estimated
//! minutes, and [`reports`] counts over the cleaned rows.

pub mod clean;
pub mod cli;
pub mod config;
pub mod error;
pub mod loader;
pub mod output;
pub mod reports;
pub mod types;
pub mod util;
