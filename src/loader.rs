use crate::clean::{NOT_RATED, UNKNOWN};
use crate::error::Result;
use crate::types::{CleanedRecord, CleanedTable, RawRecord, RawTable};
use crate::util::{non_blank, parse_date_loose, parse_i32_safe};
use csv::{Reader, ReaderBuilder, StringRecord};
use std::collections::HashSet;
use std::io;
use std::path::Path;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub parse_errors: usize,
    pub bad_release_years: usize,
    /// Pass-through columns dropped because their name collides with a
    /// recognized or derived column.
    pub dropped_columns: usize,
}

/// A table read by [`read_any`]: either a raw export or a file previously
/// written by `output::write_cleaned`.
#[derive(Debug, Clone)]
pub enum Loaded {
    Raw(RawTable),
    Cleaned(CleanedTable),
}

/// Where a source column lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Title,
    Type,
    Director,
    Cast,
    Country,
    DateAdded,
    ReleaseYear,
    Duration,
    ListedIn,
    Rating,
    SourceRow,
    DateAddedResolved,
    DurationMinutes,
    Genre,
    Extra(usize),
    Skip,
}

impl Slot {
    fn is_derived(self) -> bool {
        matches!(self, Slot::SourceRow | Slot::DateAddedResolved | Slot::DurationMinutes | Slot::Genre)
    }
}

fn known_slot(header: &str) -> Option<Slot> {
    let slot = match header.trim().to_lowercase().as_str() {
        "title" => Slot::Title,
        "type" => Slot::Type,
        "director" => Slot::Director,
        "cast" => Slot::Cast,
        "country" => Slot::Country,
        "date_added" => Slot::DateAdded,
        "release_year" => Slot::ReleaseYear,
        "duration" => Slot::Duration,
        "listed_in" => Slot::ListedIn,
        "rating" => Slot::Rating,
        "source_row" => Slot::SourceRow,
        "date_added_resolved" => Slot::DateAddedResolved,
        "duration_minutes" => Slot::DurationMinutes,
        "genre" => Slot::Genre,
        _ => return None,
    };
    Some(slot)
}

/// A cleaned file carries the derived columns; a raw export does not.
pub fn is_cleaned_header(headers: &StringRecord) -> bool {
    let slots: Vec<Slot> = headers.iter().filter_map(known_slot).collect();
    slots.contains(&Slot::Genre) && slots.contains(&Slot::DateAddedResolved)
}

/// Map header names to slots. Names match case-insensitively. A repeated
/// recognized name keeps its first column; derived names in a raw export
/// and lowercase duplicates among pass-through columns are dropped, since
/// the cleaned output would otherwise carry the same header twice.
fn plan_columns(headers: &StringRecord, cleaned: bool, report: &mut LoadReport) -> (Vec<Slot>, Vec<String>) {
    let mut slots = Vec::with_capacity(headers.len());
    let mut extra_columns = Vec::new();
    let mut extra_names: HashSet<String> = HashSet::new();
    for h in headers.iter() {
        let slot = match known_slot(h) {
            Some(slot) if slots.contains(&slot) || (slot.is_derived() && !cleaned) => Slot::Skip,
            Some(slot) => slot,
            None if !extra_names.insert(h.trim().to_lowercase()) => Slot::Skip,
            None => {
                extra_columns.push(h.trim().to_string());
                Slot::Extra(extra_columns.len() - 1)
            }
        };
        if slot == Slot::Skip {
            report.dropped_columns += 1;
            debug!(column = h, "dropping colliding column");
        }
        slots.push(slot);
    }
    (slots, extra_columns)
}

/// One row's cells, placed by slot. Blank cells are `None`.
#[derive(Debug, Default)]
struct Cells {
    title: Option<String>,
    kind: Option<String>,
    director: Option<String>,
    cast: Option<String>,
    country: Option<String>,
    date_added: Option<String>,
    release_year: Option<String>,
    duration: Option<String>,
    listed_in: Option<String>,
    rating: Option<String>,
    source_row: Option<String>,
    date_added_resolved: Option<String>,
    duration_minutes: Option<String>,
    genre: Option<String>,
    extra: Vec<Option<String>>,
}

fn place(row: &StringRecord, slots: &[Slot], extra_len: usize) -> Cells {
    let mut cells = Cells { extra: vec![None; extra_len], ..Cells::default() };
    // Ragged rows: missing trailing cells stay `None`.
    for (slot, cell) in slots.iter().zip(row.iter()) {
        let value = non_blank(Some(cell));
        match *slot {
            Slot::Title => cells.title = value,
            Slot::Type => cells.kind = value,
            Slot::Director => cells.director = value,
            Slot::Cast => cells.cast = value,
            Slot::Country => cells.country = value,
            Slot::DateAdded => cells.date_added = value,
            Slot::ReleaseYear => cells.release_year = value,
            Slot::Duration => cells.duration = value,
            Slot::ListedIn => cells.listed_in = value,
            Slot::Rating => cells.rating = value,
            Slot::SourceRow => cells.source_row = value,
            Slot::DateAddedResolved => cells.date_added_resolved = value,
            Slot::DurationMinutes => cells.duration_minutes = value,
            Slot::Genre => cells.genre = value,
            Slot::Extra(i) => cells.extra[i] = value,
            Slot::Skip => {}
        }
    }
    cells
}

fn release_year(cell: Option<&str>, report: &mut LoadReport) -> Option<i32> {
    let year = parse_i32_safe(cell);
    if cell.is_some() && year.is_none() {
        report.bad_release_years += 1;
        debug!(value = ?cell, "release_year is not an integer");
    }
    year
}

fn to_raw(cells: Cells, report: &mut LoadReport) -> RawRecord {
    RawRecord {
        release_year: release_year(cells.release_year.as_deref(), report),
        title: cells.title,
        kind: cells.kind,
        director: cells.director,
        cast: cells.cast,
        country: cells.country,
        date_added: cells.date_added,
        duration: cells.duration,
        listed_in: cells.listed_in,
        rating: cells.rating,
        extra: cells.extra,
    }
}

/// Rebuild a cleaned row. Sentinels are reapplied to blank cells, so a
/// hand-edited file still honours the cleaned-table guarantees.
fn to_cleaned(cells: Cells, index: usize, report: &mut LoadReport) -> CleanedRecord {
    let or = |v: Option<String>, sentinel: &str| v.unwrap_or_else(|| sentinel.to_string());
    CleanedRecord {
        source_row: cells
            .source_row
            .as_deref()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(index),
        release_year: release_year(cells.release_year.as_deref(), report),
        date_added_resolved: cells.date_added_resolved.as_deref().and_then(parse_date_loose),
        // Spreadsheet round-trips write "90.0".
        duration_minutes: parse_i32_safe(cells.duration_minutes.as_deref())
            .and_then(|m| u32::try_from(m).ok()),
        title: cells.title,
        kind: cells.kind,
        director: or(cells.director, UNKNOWN),
        cast: or(cells.cast, UNKNOWN),
        country: or(cells.country, UNKNOWN),
        date_added: cells.date_added,
        rating: or(cells.rating, NOT_RATED),
        duration: cells.duration,
        listed_in: or(cells.listed_in, UNKNOWN),
        extra: cells.extra,
        genre: or(cells.genre, UNKNOWN),
    }
}

/// Decode every row, skipping (and counting) rows the CSV reader rejects.
fn read_rows<R, T>(
    rdr: &mut Reader<R>,
    slots: &[Slot],
    extra_len: usize,
    report: &mut LoadReport,
    mut build: impl FnMut(Cells, usize, &mut LoadReport) -> T,
) -> Vec<T>
where
    R: io::Read,
{
    let mut out = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(e) => {
                warn!("Skipping undecodable row {}: {}", report.total_rows, e);
                report.parse_errors += 1;
                continue;
            }
        };
        let index = out.len();
        out.push(build(place(&row, slots, extra_len), index, report));
    }
    report.loaded_rows = out.len();
    out
}

fn reader<R: io::Read>(source: R) -> Reader<R> {
    ReaderBuilder::new().flexible(true).from_reader(source)
}

fn raw_from(rdr: &mut Reader<impl io::Read>) -> Result<(RawTable, LoadReport)> {
    let mut report = LoadReport::default();
    let (slots, extra_columns) = plan_columns(rdr.headers()?, false, &mut report);
    let records = read_rows(rdr, &slots, extra_columns.len(), &mut report, |cells, _, report| {
        to_raw(cells, report)
    });
    Ok((RawTable { extra_columns, records }, report))
}

fn cleaned_from(rdr: &mut Reader<impl io::Read>) -> Result<(CleanedTable, LoadReport)> {
    let mut report = LoadReport::default();
    let (slots, extra_columns) = plan_columns(rdr.headers()?, true, &mut report);
    let records = read_rows(rdr, &slots, extra_columns.len(), &mut report, to_cleaned);
    let extra_columns = extra_columns.iter().map(|c| c.to_lowercase()).collect();
    Ok((CleanedTable { extra_columns, records }, report))
}

/// Read a raw catalog export from any CSV source with a header row.
pub fn read_raw<R: io::Read>(source: R) -> Result<(RawTable, LoadReport)> {
    raw_from(&mut reader(source))
}

/// Read a cleaned table as written by `output::write_cleaned`.
pub fn read_cleaned<R: io::Read>(source: R) -> Result<(CleanedTable, LoadReport)> {
    cleaned_from(&mut reader(source))
}

/// Read either kind of table, deciding by its header.
pub fn read_any<R: io::Read>(source: R) -> Result<(Loaded, LoadReport)> {
    let mut rdr = reader(source);
    if is_cleaned_header(rdr.headers()?) {
        let (table, report) = cleaned_from(&mut rdr)?;
        Ok((Loaded::Cleaned(table), report))
    } else {
        let (table, report) = raw_from(&mut rdr)?;
        Ok((Loaded::Raw(table), report))
    }
}

fn open(path: &Path) -> Result<io::BufReader<std::fs::File>> {
    info!("Loading CSV: {}", path.display());
    Ok(io::BufReader::new(std::fs::File::open(path)?))
}

pub fn load_raw(path: &Path) -> Result<(RawTable, LoadReport)> {
    let loaded = read_raw(open(path)?)?;
    info!(
        "Loaded {} of {} rows ({} pass-through columns)",
        loaded.1.loaded_rows,
        loaded.1.total_rows,
        loaded.0.extra_columns.len()
    );
    Ok(loaded)
}

pub fn load_any(path: &Path) -> Result<(Loaded, LoadReport)> {
    let loaded = read_any(open(path)?)?;
    let kind = match loaded.0 {
        Loaded::Raw(_) => "raw export",
        Loaded::Cleaned(_) => "cleaned table",
    };
    info!("Loaded {} of {} rows as {}", loaded.1.loaded_rows, loaded.1.total_rows, kind);
    Ok(loaded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn headers_match_case_insensitively_and_extras_pass_through() {
        let data = "show_id,Title,TYPE,Release_Year,Description\n\
                    s1,Dick Johnson Is Dead,Movie,2020,A documentary\n";
        let (table, report) = read_raw(data.as_bytes()).unwrap();
        assert_eq!(table.extra_columns, vec!["show_id", "Description"]);
        assert_eq!(report.loaded_rows, 1);
        let rec = &table.records[0];
        assert_eq!(rec.title.as_deref(), Some("Dick Johnson Is Dead"));
        assert_eq!(rec.kind.as_deref(), Some("Movie"));
        assert_eq!(rec.release_year, Some(2020));
        assert_eq!(rec.extra, vec![Some("s1".to_string()), Some("A documentary".to_string())]);
        assert_eq!(rec.director, None);
    }

    #[test]
    fn blank_cells_and_short_rows_are_absent() {
        let data = "title,director,cast,rating\nX,,  ,\nY\n";
        let (table, _) = read_raw(data.as_bytes()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].director, None);
        assert_eq!(table.records[0].cast, None);
        assert_eq!(table.records[0].rating, None);
        assert_eq!(table.records[1].title.as_deref(), Some("Y"));
        assert_eq!(table.records[1].rating, None);
    }

    #[test]
    fn kept_values_are_not_trimmed() {
        let data = "title,cast\n Padded Title ,\" Ama Qamata\"\n";
        let (table, _) = read_raw(data.as_bytes()).unwrap();
        assert_eq!(table.records[0].title.as_deref(), Some(" Padded Title "));
        assert_eq!(table.records[0].cast.as_deref(), Some(" Ama Qamata"));
    }

    #[test]
    fn bad_release_year_is_counted_not_fatal() {
        let data = "title,release_year\nA,unknown\nB,1999\n";
        let (table, report) = read_raw(data.as_bytes()).unwrap();
        assert_eq!(report.bad_release_years, 1);
        assert_eq!(table.records[0].release_year, None);
        assert_eq!(table.records[1].release_year, Some(1999));
    }

    #[test]
    fn colliding_columns_are_dropped() {
        let data = "title,Title,Genre,duration_minutes,Notes,notes\nA,B,Dramas,90,n1,n2\n";
        let (table, report) = read_raw(data.as_bytes()).unwrap();
        assert_eq!(table.extra_columns, vec!["Notes"]);
        assert_eq!(report.dropped_columns, 4);
        let rec = &table.records[0];
        assert_eq!(rec.title.as_deref(), Some("A"));
        assert_eq!(rec.extra, vec![Some("n1".to_string())]);
    }

    #[test]
    fn reads_cleaned_table_back() {
        let data = "title,type,director,cast,country,date_added,release_year,rating,duration,listed_in,Show_ID,source_row,date_added_resolved,duration_minutes,genre\n\
                    X,Movie,Unknown,Unknown,Unknown,,2019,NR,90 min,\"Dramas, Comedies\",s1,4,2019-01-01,90.0,Comedies\n\
                    Y,TV Show,,,,,,,,,s2,,,,\n";
        let (table, report) = read_cleaned(data.as_bytes()).unwrap();
        assert_eq!(report.loaded_rows, 2);
        assert_eq!(table.extra_columns, vec!["show_id"]);
        let x = &table.records[0];
        assert_eq!(x.source_row, 4);
        assert_eq!(x.date_added_resolved, NaiveDate::from_ymd_opt(2019, 1, 1));
        assert_eq!(x.duration_minutes, Some(90));
        assert_eq!(x.genre, "Comedies");
        assert_eq!(x.listed_in, "Dramas, Comedies");
        let y = &table.records[1];
        assert_eq!(y.source_row, 1);
        assert_eq!(y.director, UNKNOWN);
        assert_eq!(y.rating, NOT_RATED);
        assert_eq!(y.genre, UNKNOWN);
        assert_eq!(y.date_added_resolved, None);
    }

    #[test]
    fn read_any_detects_table_kind() {
        let raw = "title,listed_in\nA,Dramas\n";
        let cleaned = "title,genre,date_added_resolved\nA,Dramas,2020-01-01\n";
        assert!(matches!(read_any(raw.as_bytes()).unwrap().0, Loaded::Raw(_)));
        assert!(matches!(read_any(cleaned.as_bytes()).unwrap().0, Loaded::Cleaned(_)));
    }
}
