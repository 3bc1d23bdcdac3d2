// Entry point and high-level CLI flow.
//
// - `clean` loads the raw export, normalizes it and writes the cleaned CSV
//   plus a short preview file.
// - `report` loads either a raw export (normalizing it first) or a cleaned
//   table written by `clean`, then writes one CSV per summary table and a
//   JSON summary, echoing each table to the console.
use anyhow::{Context, Result};
use catalog_report::clean::clean_table;
use catalog_report::cli::{CleanArgs, Cli, Command, ReportArgs};
use catalog_report::config::ReportConfig;
use catalog_report::loader::{self, LoadReport, Loaded};
use catalog_report::types::{CategoryColumn, CleanedTable, RawTable};
use catalog_report::{output, reports, util};
use clap::Parser;
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

fn init_logging(cli: &Cli) {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(cli.log_level()).into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

fn load_config(path: Option<&Path>) -> Result<ReportConfig> {
    match path {
        Some(p) => ReportConfig::load(p).with_context(|| format!("Failed to load config {}", p.display())),
        None => Ok(ReportConfig::default()),
    }
}

fn print_load_report(load_report: &LoadReport) {
    if load_report.parse_errors > 0 {
        println!(
            "Note: {} rows skipped because they could not be decoded.",
            util::format_int(load_report.parse_errors)
        );
    }
    if load_report.dropped_columns > 0 {
        println!(
            "Note: {} columns dropped because their names collide with cleaned columns.",
            util::format_int(load_report.dropped_columns)
        );
    }
}

/// Normalize a raw table, printing what happened along the way.
fn clean_and_print(raw: &RawTable, load_report: &LoadReport) -> CleanedTable {
    let (cleaned, clean_report) = clean_table(raw);

    println!(
        "Processing dataset... ({} rows loaded, {} rows after genre explosion)",
        util::format_int(load_report.loaded_rows),
        util::format_int(clean_report.output_rows)
    );
    print_load_report(load_report);
    println!(
        "Info: imputed director/cast/country/rating for {}/{}/{}/{} rows.",
        util::format_int(clean_report.imputed_director),
        util::format_int(clean_report.imputed_cast),
        util::format_int(clean_report.imputed_country),
        util::format_int(clean_report.imputed_rating)
    );
    println!(
        "Info: {} dates parsed, {} set to January 1 of release year, {} left empty.",
        util::format_int(clean_report.parsed_dates),
        util::format_int(clean_report.release_year_dates),
        util::format_int(clean_report.missing_dates)
    );
    if clean_report.unparseable_durations > 0 {
        println!(
            "Info: {} durations could not be read.",
            util::format_int(clean_report.unparseable_durations)
        );
    }
    debug!(?load_report, ?clean_report, "cleaning finished");
    cleaned
}

fn load_and_clean(input: &Path) -> Result<CleanedTable> {
    let (raw, load_report) =
        loader::load_raw(input).with_context(|| format!("Failed to load {}", input.display()))?;
    Ok(clean_and_print(&raw, &load_report))
}

/// Accept either the raw export or a cleaned table written by `clean`.
fn load_for_report(input: &Path) -> Result<CleanedTable> {
    let (loaded, load_report) =
        loader::load_any(input).with_context(|| format!("Failed to load {}", input.display()))?;
    match loaded {
        Loaded::Raw(raw) => Ok(clean_and_print(&raw, &load_report)),
        Loaded::Cleaned(table) => {
            println!(
                "Loaded cleaned table ({} rows, no normalization needed)",
                util::format_int(load_report.loaded_rows)
            );
            print_load_report(&load_report);
            Ok(table)
        }
    }
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(())
}

fn handle_clean(args: &CleanArgs) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(n) = args.preview_rows {
        cfg.preview_rows = n;
    }
    let cleaned = load_and_clean(&args.input)?;

    ensure_parent(&args.output)?;
    output::write_cleaned_file(&args.output, &cleaned, None)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    println!("Cleaned CSV saved to {}", args.output.display());

    ensure_parent(&args.preview)?;
    output::write_cleaned_file(&args.preview, &cleaned, Some(cfg.preview_rows))
        .with_context(|| format!("Failed to write {}", args.preview.display()))?;
    println!("Preview ({} rows) saved to {}", cfg.preview_rows, args.preview.display());
    Ok(())
}

fn handle_report(args: &ReportArgs) -> Result<()> {
    let mut cfg = load_config(args.config.as_deref())?;
    if let Some(bins) = args.bins {
        cfg.duration_bins = bins;
    }
    if let Some(n) = args.top {
        cfg.top_genres = n;
        cfg.top_countries = n;
        cfg.top_directors = n;
        cfg.top_ratings = n;
    }
    cfg.validate()?;

    let cleaned = load_for_report(&args.input)?;
    let data = &cleaned.records;
    let out = args.out.as_path();
    std::fs::create_dir_all(out).with_context(|| format!("Failed to create {}", out.display()))?;
    info!("Writing reports to {}", out.display());
    println!("\nGenerating reports...");

    let counts = [
        ("Movies vs TV Shows", "movies_vs_tv.csv", CategoryColumn::Type, None, reports::type_counts(data)),
        (
            "Top Genres",
            "top_genres.csv",
            CategoryColumn::Genre,
            Some(cfg.top_genres),
            reports::top_genres(data, cfg.top_genres),
        ),
        (
            "Top Countries",
            "top_countries.csv",
            CategoryColumn::Country,
            Some(cfg.top_countries),
            reports::top_countries(data, cfg.top_countries),
        ),
        (
            "Top Directors by Count",
            "top_directors.csv",
            CategoryColumn::Director,
            Some(cfg.top_directors),
            reports::top_directors(data, cfg.top_directors),
        ),
        (
            "Rating Distribution",
            "rating_distribution.csv",
            CategoryColumn::Rating,
            Some(cfg.top_ratings),
            reports::rating_distribution(data, cfg.top_ratings),
        ),
        (
            "Top Titles",
            "top_titles.csv",
            CategoryColumn::Title,
            Some(cfg.top_titles),
            reports::top_titles(data, cfg.top_titles),
        ),
        (
            "Genre Counts",
            "genre_counts.csv",
            CategoryColumn::Genre,
            Some(cfg.genre_table),
            reports::top_genres(data, cfg.genre_table),
        ),
    ];

    let mut report_no = 0;
    for (title, file, column, top, rows) in &counts {
        report_no += 1;
        let path = out.join(file);
        output::write_counts_csv(&path, column.name(), rows)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        let note = top.map(|n| format!("Top {} by count", n));
        output::preview_table(report_no, title, note.as_deref(), rows, cfg.console_rows);
        println!("(Full table exported to {})", path.display());
    }

    let series = reports::year_added_series(data);
    let path = out.join("content_added_over_time.csv");
    output::write_csv(&path, &series).with_context(|| format!("Failed to write {}", path.display()))?;
    report_no += 1;
    output::preview_table(report_no, "Content Added by Year", Some("Ascending by year"), &series, cfg.console_rows);
    println!("(Full table exported to {})", path.display());

    let hist = reports::duration_histogram(data, cfg.duration_bins);
    let path = out.join("duration_distribution.csv");
    output::write_csv(&path, &hist).with_context(|| format!("Failed to write {}", path.display()))?;
    report_no += 1;
    let note = format!("Movies only, {} buckets", cfg.duration_bins);
    output::preview_table(report_no, "Movie Duration Distribution", Some(note.as_str()), &hist, cfg.console_rows);
    println!("(Full table exported to {})", path.display());

    let summary = reports::generate_summary(data);
    let path = out.join("summary.json");
    output::write_json(&path, &summary).with_context(|| format!("Failed to write {}", path.display()))?;
    println!("\nSummary Stats ({}):", path.display());
    println!(
        "{{\"titles\": {}, \"movies\": {}, \"tv_shows\": {}, \"avg_movie_minutes\": {}}}\n",
        util::format_int(summary.distinct_titles),
        util::format_int(summary.movies),
        util::format_int(summary.tv_shows),
        summary
            .avg_movie_minutes
            .map_or_else(|| "null".to_string(), |m| util::format_number(m, 2))
    );
    println!("All reports saved to {}", out.display());
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli);
    info!("catalog_report v{}", env!("CARGO_PKG_VERSION"));

    match &cli.command {
        Command::Clean(args) => handle_clean(args),
        Command::Report(args) => handle_report(args),
    }
}
