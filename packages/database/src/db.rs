//! Database connection utilities.

use std::path::{Path, PathBuf};

use duckdb::Connection;

use crate::DbError;

/// Environment variable naming the `DuckDB` file to open.
pub const DATABASE_PATH_ENV: &str = "CRIME_BROWSER_DB";

/// Database file name under the workspace `data/` directory.
const DEFAULT_FILE_NAME: &str = "crime_browser.duckdb";

/// Opens (or creates) the crime browser database at `path`, ensures the
/// schema exists, and seeds the reference catalog.
///
/// # Errors
///
/// Returns [`DbError`] if the directory, connection, schema, or seed step
/// fails.
pub fn open(path: &Path) -> Result<Connection, DbError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    log::debug!("Opening database at {}", path.display());
    let conn = Connection::open(path)?;
    prepare(&conn)?;
    Ok(conn)
}

/// Opens a throwaway in-memory database with schema and seed catalog.
///
/// # Errors
///
/// Returns [`DbError`] if schema creation or seeding fails.
pub fn open_in_memory() -> Result<Connection, DbError> {
    let conn = Connection::open_in_memory()?;
    prepare(&conn)?;
    Ok(conn)
}

/// `data/crime_browser.duckdb` under the workspace root, which is two
/// levels above this crate's manifest.
#[must_use]
pub fn default_path() -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    manifest
        .parent()
        .and_then(Path::parent)
        .unwrap_or(manifest)
        .join("data")
        .join(DEFAULT_FILE_NAME)
}

/// Resolves the database path from [`DATABASE_PATH_ENV`], falling back to
/// [`default_path`].
#[must_use]
pub fn path_from_env() -> PathBuf {
    std::env::var(DATABASE_PATH_ENV).map_or_else(|_| default_path(), PathBuf::from)
}

/// Opens the database named by the environment (see [`path_from_env`]).
///
/// # Errors
///
/// Returns [`DbError`] if opening the database fails.
pub fn open_from_env() -> Result<Connection, DbError> {
    open(&path_from_env())
}

fn prepare(conn: &Connection) -> Result<(), DbError> {
    crate::schema::create_schema(conn)?;
    let (codes, neighborhoods) = crate::schema::seed_catalog(conn)?;
    if codes + neighborhoods > 0 {
        log::info!("Seeded catalog with {codes} codes and {neighborhoods} neighborhoods");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_path_is_under_workspace_data_dir() {
        let path = default_path();
        assert!(path.ends_with("data/crime_browser.duckdb"));
        let root = path.parent().and_then(Path::parent).unwrap();
        assert!(root.join("Cargo.toml").exists());
    }

    #[test]
    fn open_creates_missing_directories_and_seeds() {
        let tmp = std::env::temp_dir().join("crime_browser_db_open_test");
        let _ = std::fs::remove_dir_all(&tmp);
        let path = tmp.join("nested").join("test.duckdb");

        let conn = open(&path).unwrap();
        assert!(path.exists());
        let codes = crate::catalog::list_codes(&conn, &std::collections::BTreeSet::new()).unwrap();
        assert!(!codes.is_empty());

        drop(conn);
        let _ = std::fs::remove_dir_all(&tmp);
    }
}
