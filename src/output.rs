use crate::error::Result;
use crate::types::{CategoryCount, CleanedRecord, CleanedTable};
use serde::Serialize;
use std::io;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

/// Fixed leading columns of the cleaned CSV, before pass-through columns.
pub const CLEANED_HEADER: &[&str] = &[
    "title",
    "type",
    "director",
    "cast",
    "country",
    "date_added",
    "release_year",
    "rating",
    "duration",
    "listed_in",
];

/// Derived columns, after pass-through columns. `source_row` is the 0-based
/// index of the raw row a cleaned row was exploded from.
pub const DERIVED_HEADER: &[&str] = &["source_row", "date_added_resolved", "duration_minutes", "genre"];

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

/// Write `(category, count)` rows with the grouped column's name as header.
pub fn write_counts_csv(path: &Path, column: &str, rows: &[CategoryCount]) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    wtr.write_record([column, "count"])?;
    for r in rows {
        wtr.write_record([r.category.as_str(), r.count.to_string().as_str()])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

fn cleaned_row(r: &CleanedRecord) -> Vec<String> {
    let opt = |v: &Option<String>| v.clone().unwrap_or_default();
    let mut row = vec![
        opt(&r.title),
        opt(&r.kind),
        r.director.clone(),
        r.cast.clone(),
        r.country.clone(),
        opt(&r.date_added),
        r.release_year.map(|y| y.to_string()).unwrap_or_default(),
        r.rating.clone(),
        opt(&r.duration),
        r.listed_in.clone(),
    ];
    row.extend(r.extra.iter().map(opt));
    row.push(r.source_row.to_string());
    row.push(r.date_added_resolved.map(|d| d.format("%Y-%m-%d").to_string()).unwrap_or_default());
    row.push(r.duration_minutes.map(|m| m.to_string()).unwrap_or_default());
    row.push(r.genre.clone());
    row
}

/// Write the cleaned table, optionally only its first `limit` rows.
/// Absent values are empty cells.
pub fn write_cleaned<W: io::Write>(sink: W, table: &CleanedTable, limit: Option<usize>) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(sink);
    let header: Vec<&str> = CLEANED_HEADER
        .iter()
        .copied()
        .chain(table.extra_columns.iter().map(String::as_str))
        .chain(DERIVED_HEADER.iter().copied())
        .collect();
    wtr.write_record(&header)?;
    let take = limit.unwrap_or(table.records.len());
    for r in table.records.iter().take(take) {
        wtr.write_record(cleaned_row(r))?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_cleaned_file(path: &Path, table: &CleanedTable, limit: Option<usize>) -> Result<()> {
    let file = std::fs::File::create(path)?;
    write_cleaned(io::BufWriter::new(file), table, limit)
}

pub fn preview_table<T>(report_no: usize, title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("\nReport {}: {}", report_no, title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    preview_table_rows(rows, max_rows);
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}
