use chrono::NaiveDate;
use serde::Serialize;
use tabled::Tabled;

/// One row of the raw export. Empty cells are `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRecord {
    pub title: Option<String>,
    pub kind: Option<String>,
    pub director: Option<String>,
    pub cast: Option<String>,
    pub country: Option<String>,
    pub date_added: Option<String>,
    pub release_year: Option<i32>,
    pub duration: Option<String>,
    pub listed_in: Option<String>,
    pub rating: Option<String>,
    /// Values of unrecognized columns, aligned with `RawTable::extra_columns`.
    pub extra: Vec<Option<String>>,
}

/// The raw export as loaded: recognized columns are typed on `RawRecord`,
/// anything else is carried by name in source order.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub extra_columns: Vec<String>,
    pub records: Vec<RawRecord>,
}

/// One cleaned row. A source row with N genres becomes N of these.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRecord {
    /// Index of the `RawRecord` this row was derived from.
    pub source_row: usize,
    pub title: Option<String>,
    pub kind: Option<String>,
    pub director: String,
    pub cast: String,
    pub country: String,
    pub date_added: Option<String>,
    pub release_year: Option<i32>,
    pub rating: String,
    pub duration: Option<String>,
    pub listed_in: String,
    pub extra: Vec<Option<String>>,
    pub date_added_resolved: Option<NaiveDate>,
    pub duration_minutes: Option<u32>,
    pub genre: String,
}

#[derive(Debug, Clone, Default)]
pub struct CleanedTable {
    /// Pass-through column names, lowercased.
    pub extra_columns: Vec<String>,
    pub records: Vec<CleanedRecord>,
}

/// Columns the frequency reports can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryColumn {
    Type,
    Genre,
    Country,
    Director,
    Rating,
    Title,
}

impl CategoryColumn {
    pub fn name(self) -> &'static str {
        match self {
            CategoryColumn::Type => "type",
            CategoryColumn::Genre => "genre",
            CategoryColumn::Country => "country",
            CategoryColumn::Director => "director",
            CategoryColumn::Rating => "rating",
            CategoryColumn::Title => "title",
        }
    }

    pub fn value(self, r: &CleanedRecord) -> Option<&str> {
        match self {
            CategoryColumn::Type => r.kind.as_deref(),
            CategoryColumn::Genre => Some(r.genre.as_str()),
            CategoryColumn::Country => Some(r.country.as_str()),
            CategoryColumn::Director => Some(r.director.as_str()),
            CategoryColumn::Rating => Some(r.rating.as_str()),
            CategoryColumn::Title => r.title.as_deref(),
        }
    }
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct CategoryCount {
    #[serde(rename = "category")]
    #[tabled(rename = "Category")]
    pub category: String,
    #[serde(rename = "count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct YearCount {
    #[serde(rename = "year_added")]
    #[tabled(rename = "Year")]
    pub year: i32,
    #[serde(rename = "count")]
    #[tabled(rename = "TitlesAdded")]
    pub count: usize,
}

#[derive(Debug, Serialize, Tabled, Clone, PartialEq)]
pub struct DurationBucket {
    #[serde(rename = "lower_minutes")]
    #[tabled(rename = "From")]
    pub lower: f64,
    #[serde(rename = "upper_minutes")]
    #[tabled(rename = "To")]
    pub upper: f64,
    #[serde(rename = "count")]
    #[tabled(rename = "Count")]
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub source_rows: usize,
    pub cleaned_rows: usize,
    pub distinct_titles: usize,
    pub movies: usize,
    pub tv_shows: usize,
    pub first_year_added: Option<i32>,
    pub last_year_added: Option<i32>,
    pub avg_movie_minutes: Option<f64>,
}
