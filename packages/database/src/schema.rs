//! Table definitions and reference catalog seeding.
//!
//! The catalog (`codes`, `neighborhoods`) is embedded at compile time from
//! `seed/*.csv` and inserted idempotently every time a database is opened.
//! There are no foreign keys from `incidents` into the catalog: orphan
//! codes or neighborhood numbers are stored as-is and resolved
//! best-effort at display time.

use crime_browser_incident_models::{IncidentCode, Neighborhood};
use duckdb::Connection;

use crate::DbError;

const CODES_CSV: &str = include_str!("../seed/codes.csv");
const NEIGHBORHOODS_CSV: &str = include_str!("../seed/neighborhoods.csv");

/// Creates the `codes`, `neighborhoods`, and `incidents` tables if they do
/// not exist.
///
/// # Errors
///
/// Returns [`DbError`] if any statement fails.
pub fn create_schema(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS codes (
            code INTEGER PRIMARY KEY,
            incident_type TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS neighborhoods (
            neighborhood_number INTEGER PRIMARY KEY,
            neighborhood_name TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS incidents (
            case_number TEXT NOT NULL PRIMARY KEY,
            incident_date TEXT NOT NULL,
            incident_time TEXT NOT NULL,
            code INTEGER NOT NULL,
            incident TEXT NOT NULL,
            police_grid INTEGER NOT NULL,
            neighborhood_number INTEGER NOT NULL,
            block TEXT NOT NULL
        );",
    )?;

    Ok(())
}

/// Parses the embedded incident code seed.
///
/// # Errors
///
/// Returns [`DbError::Csv`] if the embedded CSV is malformed.
pub fn seed_codes() -> Result<Vec<IncidentCode>, DbError> {
    let mut reader = csv::Reader::from_reader(CODES_CSV.as_bytes());
    let codes = reader.deserialize().collect::<Result<Vec<IncidentCode>, _>>()?;
    Ok(codes)
}

/// Parses the embedded neighborhood seed.
///
/// # Errors
///
/// Returns [`DbError::Csv`] if the embedded CSV is malformed.
pub fn seed_neighborhoods() -> Result<Vec<Neighborhood>, DbError> {
    let mut reader = csv::Reader::from_reader(NEIGHBORHOODS_CSV.as_bytes());
    let neighborhoods = reader
        .deserialize()
        .collect::<Result<Vec<Neighborhood>, _>>()?;
    Ok(neighborhoods)
}

/// Inserts the embedded catalog, skipping rows that already exist.
///
/// Returns the number of `(codes, neighborhoods)` rows newly inserted.
///
/// # Errors
///
/// Returns [`DbError`] if parsing the seed or any insert fails.
pub fn seed_catalog(conn: &Connection) -> Result<(usize, usize), DbError> {
    let mut code_stmt = conn.prepare(
        "INSERT INTO codes (code, incident_type) VALUES (?, ?)
         ON CONFLICT DO NOTHING",
    )?;
    let mut inserted_codes = 0;
    for code in seed_codes()? {
        inserted_codes += code_stmt.execute(duckdb::params![code.code, code.incident_type])?;
    }

    let mut neighborhood_stmt = conn.prepare(
        "INSERT INTO neighborhoods (neighborhood_number, neighborhood_name) VALUES (?, ?)
         ON CONFLICT DO NOTHING",
    )?;
    let mut inserted_neighborhoods = 0;
    for neighborhood in seed_neighborhoods()? {
        inserted_neighborhoods +=
            neighborhood_stmt.execute(duckdb::params![neighborhood.id, neighborhood.name])?;
    }

    Ok((inserted_codes, inserted_neighborhoods))
}
