// Utility helpers for parsing free-text cells and formatting numbers.
//
// This module centralizes all the "dirty" CSV/date/duration handling so the
// cleaning pass can work with typed values. Every parser here returns `None`
// instead of failing.
use chrono::{NaiveDate, NaiveDateTime};
use num_format::{Locale, ToFormattedString};
use once_cell::sync::Lazy;
use regex::Regex;

/// Minutes credited per season for season-based durations: 6 episodes of
/// 30 minutes. A coarse scale estimate, not a runtime.
pub const MINUTES_PER_SEASON: u32 = 180;

static LEADING_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*(\d+)").expect("valid regex"));
static FIRST_INT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)").expect("valid regex"));

static WEEKDAY_PREFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(mon|tue|wed|thu|fri|sat|sun)[a-z]*\.?,?\s+").expect("valid regex")
});
static MONTH_ABBREV: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|jun|jul|aug|sept?|oct|nov|dec)\.").expect("valid regex")
});
static SEPT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bsept\b").expect("valid regex"));
static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}$").expect("valid regex"));

/// Parsed years below this come from `%Y` swallowing a day, month or
/// two-digit year and are rejected.
const MIN_YEAR: i32 = 1000;

// Two-digit year variants come before their four-digit siblings: `%Y` would
// happily read "21" as year 21.
const DATE_FORMATS: &[&str] = &[
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
    "%d %B, %Y",
    "%d-%b-%y",
    "%d-%b-%Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%y",
    "%m/%d/%Y",
    "%d/%m/%y",
    "%d/%m/%Y",
    "%m-%d-%y",
    "%m-%d-%Y",
    "%d-%m-%y",
    "%d-%m-%Y",
    "%m.%d.%y",
    "%m.%d.%Y",
    "%d.%m.%y",
    "%d.%m.%Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Month-and-year forms; parsed as the first of the month.
const MONTH_YEAR_FORMATS: &[&str] = &["%d %B %Y", "%d %b %Y"];

/// Map empty or whitespace-only cells to `None`. Kept values are not trimmed.
pub fn non_blank(s: Option<&str>) -> Option<String> {
    let s = s?;
    if s.trim().is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}

pub fn parse_i32_safe(s: Option<&str>) -> Option<i32> {
    // `?` propagates `None` early if the option is missing.
    let s = s?.trim();
    if s.is_empty() {
        return None;
    }
    // Spreadsheet round-trips turn years into "2019.0".
    s.parse::<i32>().ok().or_else(|| {
        let f = s.parse::<f64>().ok()?;
        if f.fract() == 0.0 && f.abs() <= i32::MAX as f64 {
            Some(f as i32)
        } else {
            None
        }
    })
}

fn plausible(d: NaiveDate) -> Option<NaiveDate> {
    use chrono::Datelike;
    (d.year() >= MIN_YEAR).then_some(d)
}

/// Parse a human-entered date such as `September 9, 2021`, `9/9/2021`,
/// `9-Sep-21` or `2021-09-09`.
///
/// - Whitespace runs are collapsed, a leading weekday is dropped and
///   `Sept`/`Sep.` style abbreviations are normalized.
/// - Numeric dates are read month-first; day-first is tried when the
///   month-first reading is impossible (`13/9/2021`). Two-digit years land
///   in 1970..=2069.
/// - Date-times keep only their date part.
/// - `September 2021` resolves to the first of the month and a bare `2021`
///   to January 1.
/// - Years below 1000 are rejected; anything else unreadable is `None`.
pub fn parse_date_loose(s: &str) -> Option<NaiveDate> {
    let s = s.split_whitespace().collect::<Vec<_>>().join(" ");
    let s = WEEKDAY_PREFIX.replace(&s, "");
    let s = MONTH_ABBREV.replace_all(&s, "$1");
    let s = SEPT.replace_all(&s, "Sep");
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    if BARE_YEAR.is_match(s) {
        return s.parse::<i32>().ok().and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)).and_then(plausible);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok().and_then(plausible))
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
                .map(|dt| dt.date())
                .and_then(plausible)
        })
        .or_else(|| {
            let padded = format!("1 {}", s);
            MONTH_YEAR_FORMATS
                .iter()
                .find_map(|fmt| NaiveDate::parse_from_str(&padded, fmt).ok().and_then(plausible))
        })
}

/// How a duration cell was read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationEstimate {
    /// Runtime given directly, e.g. `90 min`.
    Minutes(u32),
    /// Season count, e.g. `3 Seasons`, converted with `MINUTES_PER_SEASON`.
    Seasons { seasons: u32, minutes: u32 },
    Unparseable,
}

impl DurationEstimate {
    pub fn minutes(self) -> Option<u32> {
        match self {
            DurationEstimate::Minutes(m) => Some(m),
            DurationEstimate::Seasons { minutes, .. } => Some(minutes),
            DurationEstimate::Unparseable => None,
        }
    }
}

/// Convert a free-text duration to estimated minutes.
///
/// Text containing `min` must start with the minute count. Anything else is
/// taken as a season count: the first integer found times
/// `MINUTES_PER_SEASON`.
pub fn parse_duration(s: &str) -> DurationEstimate {
    let s = s.trim();
    if s.contains("min") {
        return LEADING_INT
            .captures(s)
            .and_then(|c| c[1].parse::<u32>().ok())
            .map_or(DurationEstimate::Unparseable, DurationEstimate::Minutes);
    }
    FIRST_INT
        .captures(s)
        .and_then(|c| c[1].parse::<u32>().ok())
        .and_then(|seasons| {
            seasons
                .checked_mul(MINUTES_PER_SEASON)
                .map(|minutes| DurationEstimate::Seasons { seasons, minutes })
        })
        .unwrap_or(DurationEstimate::Unparseable)
}

pub fn average(v: &[f64]) -> f64 {
    // Standard arithmetic mean; returns 0 for an empty slice to avoid NaNs.
    if v.is_empty() {
        return 0.0;
    }
    let sum: f64 = v.iter().copied().sum();
    sum / v.len() as f64
}

pub fn format_number(n: f64, decimals: usize) -> String {
    // Format a floating-point value with:
    // - a fixed number of decimal places, and
    // - locale-aware thousands separators (e.g., `1,234,567.89`).
    let neg = n.is_sign_negative() && n != 0.0;
    let s = format!("{:.*}", decimals, n.abs());
    let mut parts = s.split('.');
    let int_part = parts.next().unwrap_or("0");
    let frac_part = parts.next();
    let int_val: i64 = int_part.parse().unwrap_or(0);
    let mut res = int_val.to_formatted_string(&Locale::en);
    if let Some(frac) = frac_part {
        res.push('.');
        res.push_str(frac);
    }
    if neg {
        format!("-{}", res)
    } else {
        res
    }
}

pub fn format_int<T>(n: T) -> String
where
    T: ToFormattedString,
{
    // Used for counts in console messages (e.g., `8,807 rows loaded`).
    n.to_formatted_string(&Locale::en)
}
