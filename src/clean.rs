//! Normalization of the raw export into one row per (title, genre).
//!
//! Passes run in a fixed order: imputation, date resolution, duration
//! conversion, genre explosion, column-name lowercasing. Every pass is
//! row-local and total; a bad cell degrades to a sentinel or to `None`
//! and is counted in [`CleanReport`].

use crate::types::{CleanedRecord, CleanedTable, RawRecord, RawTable};
use crate::util::{parse_date_loose, parse_duration, DurationEstimate};
use chrono::NaiveDate;
use tracing::{debug, info};

pub const UNKNOWN: &str = "Unknown";
pub const NOT_RATED: &str = "NR";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub input_rows: usize,
    pub output_rows: usize,
    pub imputed_director: usize,
    pub imputed_cast: usize,
    pub imputed_country: usize,
    pub imputed_rating: usize,
    pub imputed_genres: usize,
    pub parsed_dates: usize,
    pub release_year_dates: usize,
    pub missing_dates: usize,
    pub unparseable_dates: usize,
    pub season_durations: usize,
    pub unparseable_durations: usize,
}

/// How `date_added_resolved` was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateResolution {
    Parsed(NaiveDate),
    /// January 1 of the release year. Only year granularity is consumed
    /// downstream.
    ReleaseYear(NaiveDate),
    Missing,
}

impl DateResolution {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            DateResolution::Parsed(d) | DateResolution::ReleaseYear(d) => Some(d),
            DateResolution::Missing => None,
        }
    }
}

/// The per-row fields shared by every exploded genre row.
#[derive(Debug, Clone)]
struct Imputed {
    director: String,
    cast: String,
    country: String,
    rating: String,
    listed_in: String,
}

fn or_sentinel(v: &Option<String>, sentinel: &str, counter: &mut usize) -> String {
    match v {
        Some(s) => s.clone(),
        None => {
            *counter += 1;
            sentinel.to_string()
        }
    }
}

fn impute(raw: &RawRecord, report: &mut CleanReport) -> Imputed {
    Imputed {
        director: or_sentinel(&raw.director, UNKNOWN, &mut report.imputed_director),
        cast: or_sentinel(&raw.cast, UNKNOWN, &mut report.imputed_cast),
        country: or_sentinel(&raw.country, UNKNOWN, &mut report.imputed_country),
        rating: or_sentinel(&raw.rating, NOT_RATED, &mut report.imputed_rating),
        listed_in: or_sentinel(&raw.listed_in, UNKNOWN, &mut report.imputed_genres),
    }
}

/// Parse `date_added`, falling back to January 1 of `release_year`.
/// A row with neither stays `Missing`; no epoch is substituted.
pub fn resolve_date(date_added: Option<&str>, release_year: Option<i32>) -> DateResolution {
    if let Some(d) = date_added.and_then(parse_date_loose) {
        return DateResolution::Parsed(d);
    }
    release_year
        .and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1))
        .map_or(DateResolution::Missing, DateResolution::ReleaseYear)
}

/// Split a comma-separated genre list. Pieces are trimmed and empty pieces
/// dropped; an empty result becomes a single `Unknown`.
pub fn split_genres(listed_in: &str) -> Vec<String> {
    let genres: Vec<String> = listed_in
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty())
        .map(str::to_string)
        .collect();
    if genres.is_empty() {
        vec![UNKNOWN.to_string()]
    } else {
        genres
    }
}

/// Clean one source row into its exploded genre rows.
pub fn clean_record(source_row: usize, raw: &RawRecord, report: &mut CleanReport) -> Vec<CleanedRecord> {
    let imputed = impute(raw, report);

    let resolution = resolve_date(raw.date_added.as_deref(), raw.release_year);
    match resolution {
        DateResolution::Parsed(_) => report.parsed_dates += 1,
        DateResolution::ReleaseYear(_) => report.release_year_dates += 1,
        DateResolution::Missing => report.missing_dates += 1,
    }
    if raw.date_added.is_some() && !matches!(resolution, DateResolution::Parsed(_)) {
        report.unparseable_dates += 1;
        debug!(row = source_row, value = ?raw.date_added, "unparseable date_added");
    }

    let estimate = raw.duration.as_deref().map(parse_duration);
    match estimate {
        Some(DurationEstimate::Seasons { .. }) => report.season_durations += 1,
        Some(DurationEstimate::Unparseable) => {
            report.unparseable_durations += 1;
            debug!(row = source_row, value = ?raw.duration, "unparseable duration");
        }
        _ => {}
    }
    let duration_minutes = estimate.and_then(DurationEstimate::minutes);

    split_genres(&imputed.listed_in)
        .into_iter()
        .map(|genre| CleanedRecord {
            source_row,
            title: raw.title.clone(),
            kind: raw.kind.clone(),
            director: imputed.director.clone(),
            cast: imputed.cast.clone(),
            country: imputed.country.clone(),
            date_added: raw.date_added.clone(),
            release_year: raw.release_year,
            rating: imputed.rating.clone(),
            duration: raw.duration.clone(),
            listed_in: imputed.listed_in.clone(),
            extra: raw.extra.clone(),
            date_added_resolved: resolution.date(),
            duration_minutes,
            genre,
        })
        .collect()
}

/// Lowercase every column identifier.
pub fn normalize_column_names(columns: &[String]) -> Vec<String> {
    columns.iter().map(|c| c.to_lowercase()).collect()
}

pub fn clean_table(raw: &RawTable) -> (CleanedTable, CleanReport) {
    let mut report = CleanReport { input_rows: raw.records.len(), ..CleanReport::default() };
    let records: Vec<CleanedRecord> = raw
        .records
        .iter()
        .enumerate()
        .flat_map(|(i, r)| clean_record(i, r, &mut report))
        .collect();
    report.output_rows = records.len();

    let table = CleanedTable { extra_columns: normalize_column_names(&raw.extra_columns), records };
    info!(
        "Cleaned {} source rows into {} genre rows ({} dates from release year, {} without a date)",
        report.input_rows, report.output_rows, report.release_year_dates, report.missing_dates
    );
    (table, report)
}
