//! Commands that work directly on the local `DuckDB` file.

use std::fs::File;
use std::path::{Path, PathBuf};

use crime_browser_cli_utils::{IndicatifProgress, MultiProgress};
use crime_browser_database::{db, import};

fn resolve_path(db_path: Option<PathBuf>) -> PathBuf {
    db_path.unwrap_or_else(db::path_from_env)
}

/// Creates the database (if needed) and seeds the catalog.
pub fn seed(db_path: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_path(db_path);
    db::open(&path)?;
    println!("Database ready at {}", path.display());
    Ok(())
}

/// Imports an incident CSV into the database.
pub fn import(
    multi: &MultiProgress,
    file: &Path,
    db_path: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let path = resolve_path(db_path);
    let conn = db::open(&path)?;
    let reader = File::open(file)?;

    let progress = IndicatifProgress::rows_bar(multi, &format!("Reading {}", file.display()));
    let summary = import::import_incidents_csv(&conn, reader, progress.as_ref())?;

    log::info!(
        "Import of {} finished: {} inserted, {} duplicates, {} invalid",
        file.display(),
        summary.inserted,
        summary.duplicates,
        summary.invalid
    );
    println!(
        "{} inserted, {} duplicate, {} invalid",
        summary.inserted, summary.duplicates, summary.invalid
    );
    Ok(())
}
