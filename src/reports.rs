use crate::types::{
    CategoryColumn, CategoryCount, CleanedRecord, DurationBucket, SummaryStats, YearCount,
};
use crate::util::average;
use chrono::Datelike;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Count every value of `column`, most frequent first.
///
/// Categories start in first-appearance order and the sort is stable, so
/// ties keep that order and repeated runs give identical output. Rows
/// where the column is absent are skipped.
pub fn category_counts(data: &[CleanedRecord], column: CategoryColumn) -> Vec<CategoryCount> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<CategoryCount> = Vec::new();
    for r in data {
        let Some(value) = column.value(r) else { continue };
        match index.get(value) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(value, counts.len());
                counts.push(CategoryCount { category: value.to_string(), count: 1 });
            }
        }
    }
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

pub fn top_n(data: &[CleanedRecord], column: CategoryColumn, n: usize) -> Vec<CategoryCount> {
    let mut counts = category_counts(data, column);
    counts.truncate(n);
    counts
}

pub fn type_counts(data: &[CleanedRecord]) -> Vec<CategoryCount> {
    category_counts(data, CategoryColumn::Type)
}

pub fn top_genres(data: &[CleanedRecord], n: usize) -> Vec<CategoryCount> {
    top_n(data, CategoryColumn::Genre, n)
}

pub fn top_countries(data: &[CleanedRecord], n: usize) -> Vec<CategoryCount> {
    top_n(data, CategoryColumn::Country, n)
}

pub fn top_directors(data: &[CleanedRecord], n: usize) -> Vec<CategoryCount> {
    top_n(data, CategoryColumn::Director, n)
}

pub fn rating_distribution(data: &[CleanedRecord], n: usize) -> Vec<CategoryCount> {
    top_n(data, CategoryColumn::Rating, n)
}

pub fn top_titles(data: &[CleanedRecord], n: usize) -> Vec<CategoryCount> {
    top_n(data, CategoryColumn::Title, n)
}

/// Year a row counts as added: the resolved date's year, else the release year.
pub fn year_added(r: &CleanedRecord) -> Option<i32> {
    r.date_added_resolved.map(|d| d.year()).or(r.release_year)
}

/// Rows per `year_added`, ascending by year. Years with no rows are not filled in.
pub fn year_added_series(data: &[CleanedRecord]) -> Vec<YearCount> {
    let mut by_year: BTreeMap<i32, usize> = BTreeMap::new();
    for year in data.iter().filter_map(year_added) {
        *by_year.entry(year).or_default() += 1;
    }
    by_year.into_iter().map(|(year, count)| YearCount { year, count }).collect()
}

pub fn is_movie(r: &CleanedRecord) -> bool {
    r.kind.as_deref().is_some_and(|k| k.trim().eq_ignore_ascii_case("movie"))
}

/// Equal-width histogram of movie durations over `[min, max]`.
///
/// The last bucket is closed on the right. When every duration is the same
/// the range is widened to `value ± 0.5`. A bucket count of zero is read
/// as one.
pub fn duration_histogram(data: &[CleanedRecord], bins: usize) -> Vec<DurationBucket> {
    let values: Vec<f64> = data
        .iter()
        .filter(|r| is_movie(r))
        .filter_map(|r| r.duration_minutes)
        .map(f64::from)
        .collect();
    let (Some(min), Some(max)) = (
        values.iter().copied().reduce(f64::min),
        values.iter().copied().reduce(f64::max),
    ) else {
        return Vec::new();
    };

    let bins = bins.max(1);
    let (lo, hi) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (hi - lo) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in &values {
        let idx = (((v - lo) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| DurationBucket {
            lower: lo + width * i as f64,
            upper: if i + 1 == bins { hi } else { lo + width * (i + 1) as f64 },
            count,
        })
        .collect()
}

/// Headline numbers. Source rows are counted by distinct `source_row`, so a
/// table read back from a cleaned file gives the same summary.
pub fn generate_summary(data: &[CleanedRecord]) -> SummaryStats {
    // Exploded rows repeat their source row; count titles and types once.
    let mut seen: HashSet<usize> = HashSet::new();
    let mut movies = 0usize;
    let mut tv_shows = 0usize;
    let mut movie_minutes: Vec<f64> = Vec::new();
    for r in data {
        if !seen.insert(r.source_row) {
            continue;
        }
        if is_movie(r) {
            movies += 1;
            if let Some(m) = r.duration_minutes {
                movie_minutes.push(f64::from(m));
            }
        } else if r.kind.as_deref().is_some_and(|k| k.trim().eq_ignore_ascii_case("tv show")) {
            tv_shows += 1;
        }
    }
    let titles: HashSet<&str> = data.iter().filter_map(|r| r.title.as_deref()).collect();
    let series = year_added_series(data);

    SummaryStats {
        source_rows: seen.len(),
        cleaned_rows: data.len(),
        distinct_titles: titles.len(),
        movies,
        tv_shows,
        first_year_added: series.first().map(|y| y.year),
        last_year_added: series.last().map(|y| y.year),
        avg_movie_minutes: if movie_minutes.is_empty() { None } else { Some(average(&movie_minutes)) },
    }
}
