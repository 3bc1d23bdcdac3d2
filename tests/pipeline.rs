use catalog_report::clean::{clean_table, NOT_RATED, UNKNOWN};
use catalog_report::loader::{load_any, load_raw, Loaded};
use catalog_report::output::{write_cleaned_file, write_counts_csv};
use catalog_report::reports;
use catalog_report::types::CategoryColumn;
use chrono::NaiveDate;
use std::fs;

const RAW: &str = "\
show_id,type,title,director,cast,country,date_added,release_year,rating,duration,listed_in,description
s1,Movie,Dick Johnson Is Dead,Kirsten Johnson,,United States,\"September 25, 2021\",2020,PG-13,90 min,Documentaries,A son films his father
s2,TV Show,Blood & Water,,\"Ama Qamata, Khosi Ngema\",South Africa,\"September 24, 2021\",2021,TV-MA,2 Seasons,\"International TV Shows, TV Dramas, TV Mysteries\",Cape Town teens
s3,TV Show,Ganglands,Julien Leclercq,Sami Bouajila,,not a date,2021,,1 Season,\"Crime TV Shows, International TV Shows, TV Action & Adventure\",A heist
s4,Movie,Untitled,,,,,,,abc,,
";

#[test]
fn load_clean_write_and_report() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    fs::write(&input, RAW).unwrap();

    let (raw, load_report) = load_raw(&input).unwrap();
    assert_eq!(load_report.loaded_rows, 4);
    assert_eq!(raw.extra_columns, vec!["show_id", "description"]);

    let (cleaned, report) = clean_table(&raw);
    let rows = &cleaned.records;
    assert_eq!(rows.len(), 1 + 3 + 3 + 1);
    assert_eq!(report.output_rows, rows.len());

    for r in rows {
        assert!(!r.director.is_empty());
        assert!(!r.cast.is_empty());
        assert!(!r.country.is_empty());
        assert!(!r.rating.is_empty());
    }

    let first = &rows[0];
    assert_eq!(first.date_added_resolved, NaiveDate::from_ymd_opt(2021, 9, 25));
    assert_eq!(first.duration_minutes, Some(90));
    assert_eq!(first.cast, UNKNOWN);

    let ganglands: Vec<_> = rows.iter().filter(|r| r.source_row == 2).collect();
    assert_eq!(ganglands.len(), 3);
    assert_eq!(ganglands[0].date_added_resolved, NaiveDate::from_ymd_opt(2021, 1, 1));
    assert_eq!(ganglands[0].duration_minutes, Some(180));
    assert_eq!(ganglands[0].rating, NOT_RATED);
    assert_eq!(ganglands[0].country, UNKNOWN);

    let untitled = rows.last().unwrap();
    assert_eq!(untitled.date_added_resolved, None);
    assert_eq!(untitled.duration_minutes, None);
    assert_eq!(untitled.genre, UNKNOWN);

    let cleaned_path = dir.path().join("cleaned.csv");
    write_cleaned_file(&cleaned_path, &cleaned, None).unwrap();
    let text = fs::read_to_string(&cleaned_path).unwrap();
    let header = text.lines().next().unwrap();
    assert!(header.ends_with("show_id,description,source_row,date_added_resolved,duration_minutes,genre"));
    assert_eq!(text.lines().count(), rows.len() + 1);

    let genres = reports::top_genres(rows, 1);
    assert_eq!(genres[0].category, "International TV Shows");
    assert_eq!(genres[0].count, 2);

    let types = reports::type_counts(rows);
    assert_eq!(types[0].category, "TV Show");
    assert_eq!(types[0].count, 6);

    let series = reports::year_added_series(rows);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].year, 2021);
    assert_eq!(series[0].count, 7);
    assert_eq!(reports::year_added_series(rows), series);

    let hist = reports::duration_histogram(rows, 30);
    assert_eq!(hist.iter().map(|b| b.count).sum::<usize>(), 1);

    let counts_path = dir.path().join("genre_counts.csv");
    let counts = reports::category_counts(rows, CategoryColumn::Genre);
    write_counts_csv(&counts_path, CategoryColumn::Genre.name(), &counts).unwrap();
    let written = fs::read_to_string(&counts_path).unwrap();
    assert!(written.starts_with("genre,count\nInternational TV Shows,2\n"));

    let summary = reports::generate_summary(rows);
    assert_eq!(summary.movies, 2);
    assert_eq!(summary.tv_shows, 2);
    assert_eq!(summary.source_rows, load_report.loaded_rows);
    assert_eq!(summary.avg_movie_minutes, Some(90.0));
}

#[test]
fn cleaned_file_reads_back_to_same_reports() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("raw.csv");
    fs::write(&input, RAW).unwrap();

    let (raw, _) = load_raw(&input).unwrap();
    let (cleaned, _) = clean_table(&raw);
    let cleaned_path = dir.path().join("cleaned.csv");
    write_cleaned_file(&cleaned_path, &cleaned, None).unwrap();

    let (loaded, report) = load_any(&cleaned_path).unwrap();
    let Loaded::Cleaned(reread) = loaded else { panic!("cleaned file read as raw export") };
    assert_eq!(report.loaded_rows, cleaned.records.len());
    assert_eq!(reread.extra_columns, cleaned.extra_columns);
    assert_eq!(reread.records, cleaned.records);

    let (a, b) = (&cleaned.records, &reread.records);
    for column in [
        CategoryColumn::Type,
        CategoryColumn::Genre,
        CategoryColumn::Country,
        CategoryColumn::Director,
        CategoryColumn::Rating,
        CategoryColumn::Title,
    ] {
        assert_eq!(reports::category_counts(a, column), reports::category_counts(b, column));
    }
    assert_eq!(reports::year_added_series(a), reports::year_added_series(b));
    assert_eq!(reports::duration_histogram(a, 30), reports::duration_histogram(b, 30));
    let (sa, sb) = (reports::generate_summary(a), reports::generate_summary(b));
    assert_eq!(sa.source_rows, sb.source_rows);
    assert_eq!(sa.movies, sb.movies);
    assert_eq!(sa.distinct_titles, sb.distinct_titles);

    let (loaded_raw, _) = load_any(&input).unwrap();
    assert!(matches!(loaded_raw, Loaded::Raw(_)));
}
