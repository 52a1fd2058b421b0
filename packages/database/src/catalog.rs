//! Read-only access to the reference catalog.

use std::collections::BTreeSet;

use crime_browser_incident_models::{IncidentCode, Neighborhood};
use duckdb::Connection;

use crate::DbError;

/// Lists incident codes ascending by code.
///
/// An empty `filter` returns every code; otherwise only codes in `filter`
/// that exist in the catalog are returned.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn list_codes(conn: &Connection, filter: &BTreeSet<i32>) -> Result<Vec<IncidentCode>, DbError> {
    let sql = format!(
        "SELECT code, incident_type FROM codes{} ORDER BY code",
        in_clause("code", filter.len())
    );

    let mut stmt = conn.prepare(&sql)?;
    for (i, code) in filter.iter().enumerate() {
        stmt.raw_bind_parameter(i + 1, *code)?;
    }

    stmt.raw_execute()?;
    let mut rows = stmt.raw_query();
    let mut codes = Vec::new();
    while let Some(row) = rows.next()? {
        codes.push(IncidentCode {
            code: row.get(0)?,
            incident_type: row.get(1)?,
        });
    }

    Ok(codes)
}

/// Lists neighborhoods ascending by id.
///
/// An empty `filter` returns every neighborhood.
///
/// # Errors
///
/// Returns [`DbError`] if the query fails.
pub fn list_neighborhoods(
    conn: &Connection,
    filter: &BTreeSet<i32>,
) -> Result<Vec<Neighborhood>, DbError> {
    let sql = format!(
        "SELECT neighborhood_number, neighborhood_name FROM neighborhoods{} \
         ORDER BY neighborhood_number",
        in_clause("neighborhood_number", filter.len())
    );

    let mut stmt = conn.prepare(&sql)?;
    for (i, id) in filter.iter().enumerate() {
        stmt.raw_bind_parameter(i + 1, *id)?;
    }

    stmt.raw_execute()?;
    let mut rows = stmt.raw_query();
    let mut neighborhoods = Vec::new();
    while let Some(row) = rows.next()? {
        neighborhoods.push(Neighborhood {
            id: row.get(0)?,
            name: row.get(1)?,
        });
    }

    Ok(neighborhoods)
}

/// Builds ` WHERE column IN (?, ...)` for `count` placeholders, or an
/// empty string when `count` is zero.
fn in_clause(column: &str, count: usize) -> String {
    if count == 0 {
        return String::new();
    }
    let placeholders = vec!["?"; count].join(", ");
    format!(" WHERE {column} IN ({placeholders})")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lists_all_codes_ascending() {
        let conn = crate::db::open_in_memory().unwrap();
        let codes = list_codes(&conn, &BTreeSet::new()).unwrap();
        assert!(!codes.is_empty());
        assert!(codes.windows(2).all(|w| w[0].code < w[1].code));
    }

    #[test]
    fn filters_codes_by_set() {
        let conn = crate::db::open_in_memory().unwrap();
        let codes = list_codes(&conn, &BTreeSet::from([600, 110, 424_242])).unwrap();
        let got: Vec<i32> = codes.iter().map(|c| c.code).collect();
        assert_eq!(got, vec![110, 600]);
        assert_eq!(codes[1].incident_type, "Theft");
    }

    #[test]
    fn filters_neighborhoods_by_set() {
        let conn = crate::db::open_in_memory().unwrap();
        let all = list_neighborhoods(&conn, &BTreeSet::new()).unwrap();
        assert_eq!(all.len(), 17);
        assert!(all.windows(2).all(|w| w[0].id < w[1].id));

        let some = list_neighborhoods(&conn, &BTreeSet::from([14, 16])).unwrap();
        let names: Vec<&str> = some.iter().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["Macalester-Groveland", "Summit Hill"]);
    }
}
