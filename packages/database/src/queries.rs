//! Incident queries: filtered fetch, create, and delete.
//!
//! Dates are stored as `YYYY-MM-DD` text and times as `HH:MM:SS`, so
//! lexicographic comparison and ordering match chronological order.

use std::collections::BTreeSet;
use std::fmt::Write as _;

use chrono::Datelike;

use crime_browser_database_models::IncidentQuery;
use crime_browser_incident_models::submission::{DATE_FORMAT, TIME_FORMAT, parse_date, parse_time};
use crime_browser_incident_models::{IncidentRecord, IncidentSubmission, ValidationError};
use duckdb::Connection;

use crate::DbError;

const SELECT_INCIDENTS: &str = "SELECT case_number, incident_date, incident_time, code, \
     incident, police_grid, neighborhood_number, block FROM incidents";

/// A positional parameter for a dynamically built statement.
enum Param {
    Text(String),
    Int(i32),
}

/// Queries incidents matching every non-empty dimension of `query`.
///
/// Rows come back most-recent-first by date then time (ties broken by
/// case number descending) and are capped at `query.limit` after
/// ordering.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails or a stored row cannot be
/// converted.
pub fn fetch_incidents(
    conn: &Connection,
    query: &IncidentQuery,
) -> Result<Vec<IncidentRecord>, DbError> {
    let mut sql = String::from(SELECT_INCIDENTS);
    sql.push_str(" WHERE 1=1");
    let mut params: Vec<Param> = Vec::new();

    if let Some(start) = query.start_date {
        sql.push_str(" AND incident_date >= ?");
        params.push(Param::Text(start.format(DATE_FORMAT).to_string()));
    }

    if let Some(end) = query.end_date {
        sql.push_str(" AND incident_date <= ?");
        params.push(Param::Text(end.format(DATE_FORMAT).to_string()));
    }

    push_membership(&mut sql, &mut params, "code", &query.codes)?;
    push_membership(&mut sql, &mut params, "police_grid", &query.grids)?;
    push_membership(
        &mut sql,
        &mut params,
        "neighborhood_number",
        &query.neighborhoods,
    )?;

    write!(
        sql,
        " ORDER BY incident_date DESC, incident_time DESC, case_number DESC LIMIT {}",
        query.limit
    )
    .map_err(build_error)?;

    log::debug!("fetch_incidents: {sql} ({} params)", params.len());

    let mut stmt = conn.prepare(&sql)?;
    for (i, param) in params.iter().enumerate() {
        match param {
            Param::Text(s) => stmt.raw_bind_parameter(i + 1, s.as_str())?,
            Param::Int(n) => stmt.raw_bind_parameter(i + 1, *n)?,
        }
    }

    stmt.raw_execute()?;
    let mut rows = stmt.raw_query();
    let mut incidents = Vec::new();
    while let Some(row) = rows.next()? {
        let date: String = row.get(1)?;
        let time: String = row.get(2)?;
        incidents.push(IncidentRecord {
            case_number: row.get(0)?,
            date: parse_date(&date).map_err(conversion)?,
            time: parse_time(&time).map_err(conversion)?,
            code: row.get(3)?,
            incident: row.get(4)?,
            police_grid: row.get(5)?,
            neighborhood_number: row.get(6)?,
            block: row.get(7)?,
        });
    }

    Ok(incidents)
}

/// Appends ` AND column IN (?, ...)` for a non-empty set.
fn push_membership(
    sql: &mut String,
    params: &mut Vec<Param>,
    column: &str,
    values: &BTreeSet<i32>,
) -> Result<(), DbError> {
    if values.is_empty() {
        return Ok(());
    }
    let placeholders = vec!["?"; values.len()].join(", ");
    write!(sql, " AND {column} IN ({placeholders})").map_err(build_error)?;
    params.extend(values.iter().copied().map(Param::Int));
    Ok(())
}

fn build_error(e: std::fmt::Error) -> DbError {
    DbError::Conversion {
        message: format!("Failed to build incident query: {e}"),
    }
}

fn conversion(e: ValidationError) -> DbError {
    DbError::Conversion {
        message: format!("Stored incident is malformed: {e}"),
    }
}

/// Returns whether an incident with `case_number` exists.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn incident_exists(conn: &Connection, case_number: &str) -> Result<bool, DbError> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM incidents WHERE case_number = ?",
        duckdb::params![case_number],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Validates `submission` and inserts it as a new incident.
///
/// Validation happens before the store is touched. A case number that is
/// already present fails with [`DbError::DuplicateKey`] and leaves the
/// table unchanged.
///
/// # Errors
///
/// Returns [`DbError::Validation`] for missing/malformed fields,
/// [`DbError::DuplicateKey`] if the case number exists, or
/// [`DbError::Database`] if the insert fails.
pub fn create_incident(
    conn: &Connection,
    submission: &IncidentSubmission,
) -> Result<IncidentRecord, DbError> {
    let record = submission.validate()?;
    insert_incident(conn, &record)?;
    Ok(record)
}

/// Inserts an already-validated record.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if the year does not fit the stored
/// `YYYY-MM-DD` text, [`DbError::DuplicateKey`] if the case number exists,
/// or [`DbError::Database`] if the insert fails.
pub fn insert_incident(conn: &Connection, record: &IncidentRecord) -> Result<(), DbError> {
    if !(0..=9999).contains(&record.date.year()) {
        return Err(ValidationError::InvalidDate {
            value: record.date.to_string(),
        }
        .into());
    }

    if incident_exists(conn, &record.case_number)? {
        return Err(DbError::DuplicateKey {
            case_number: record.case_number.clone(),
        });
    }

    conn.execute(
        "INSERT INTO incidents (
            case_number, incident_date, incident_time, code,
            incident, police_grid, neighborhood_number, block
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        duckdb::params![
            record.case_number,
            record.date.format(DATE_FORMAT).to_string(),
            record.time.format(TIME_FORMAT).to_string(),
            record.code,
            record.incident,
            record.police_grid,
            record.neighborhood_number,
            record.block,
        ],
    )?;

    log::info!("Created incident {}", record.case_number);
    Ok(())
}

/// Deletes exactly one incident by case number.
///
/// # Errors
///
/// Returns [`DbError::Validation`] if `case_number` is blank,
/// [`DbError::NotFound`] if no such incident exists, or
/// [`DbError::Database`] if the delete fails.
pub fn delete_incident(conn: &Connection, case_number: &str) -> Result<(), DbError> {
    let case_number = case_number.trim();
    if case_number.is_empty() {
        return Err(ValidationError::MissingFields {
            missing: vec!["case_number"],
        }
        .into());
    }

    if !incident_exists(conn, case_number)? {
        return Err(DbError::NotFound {
            case_number: case_number.to_string(),
        });
    }

    let removed = conn.execute(
        "DELETE FROM incidents WHERE case_number = ?",
        duckdb::params![case_number],
    )?;

    if removed == 0 {
        // Lost a race with another delete between the check and the delete.
        return Err(DbError::NotFound {
            case_number: case_number.to_string(),
        });
    }

    log::info!("Deleted incident {case_number}");
    Ok(())
}
