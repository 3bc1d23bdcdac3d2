//! Report sizing.
//!
//! Values come from an optional TOML file and are then overridden by CLI
//! flags. Nothing is read from the environment.

use crate::error::{CatalogError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_genres: usize,
    pub top_countries: usize,
    pub top_directors: usize,
    pub top_ratings: usize,
    /// Rows kept in `top_titles.csv`.
    pub top_titles: usize,
    /// Rows kept in `genre_counts.csv`.
    pub genre_table: usize,
    /// Buckets in the movie duration histogram.
    pub duration_bins: usize,
    /// Rows written to the cleaned preview file.
    pub preview_rows: usize,
    /// Rows of each report echoed to the console.
    pub console_rows: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_genres: 12,
            top_countries: 12,
            top_directors: 15,
            top_ratings: 20,
            top_titles: 50,
            genre_table: 50,
            duration_bins: 30,
            preview_rows: 20,
            console_rows: 5,
        }
    }
}

impl ReportConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: ReportConfig = toml::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<()> {
        if self.duration_bins == 0 {
            return Err(CatalogError::InvalidConfig("duration_bins must be at least 1".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let cfg = ReportConfig::from_toml_str("top_genres = 5\nduration_bins = 10\n").unwrap();
        assert_eq!(cfg.top_genres, 5);
        assert_eq!(cfg.duration_bins, 10);
        assert_eq!(cfg.top_directors, 15);
        assert_eq!(cfg.preview_rows, 20);
    }

    #[test]
    fn zero_bins_rejected() {
        let err = ReportConfig::from_toml_str("duration_bins = 0").unwrap_err();
        assert!(matches!(err, CatalogError::InvalidConfig(_)));
    }

    #[test]
    fn malformed_toml_is_config_error() {
        let err = ReportConfig::from_toml_str("top_genres = \"many\"").unwrap_err();
        assert!(matches!(err, CatalogError::Config(_)));
    }
}
