//! Bulk import of incident records from CSV.
//!
//! The expected header is
//! `case_number,date,time,code,incident,police_grid,neighborhood_number,block`.
//! Every row goes through the same validation and duplicate check as a
//! single submission. Bad rows are counted and skipped; they never abort
//! the import.

use std::io::Read;

use crime_browser_incident_models::IncidentSubmission;
use duckdb::Connection;

use crate::DbError;
use crate::progress::ProgressCallback;

/// Outcome counts of an import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows inserted as new incidents.
    pub inserted: u64,
    /// Rows skipped because the case number already existed.
    pub duplicates: u64,
    /// Rows skipped because they failed to parse or validate.
    pub invalid: u64,
}

/// Imports incidents from CSV data.
///
/// # Errors
///
/// Returns [`DbError`] if a storage operation fails. Per-row parse,
/// validation, and duplicate failures are tallied in the summary instead.
pub fn import_incidents_csv<R: Read>(
    conn: &Connection,
    reader: R,
    progress: &dyn ProgressCallback,
) -> Result<ImportSummary, DbError> {
    let mut csv_reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    let rows: Vec<Result<IncidentSubmission, csv::Error>> = csv_reader.deserialize().collect();

    progress.set_total(u64::try_from(rows.len()).unwrap_or(u64::MAX));
    progress.set_message("Importing incidents".to_string());

    let mut summary = ImportSummary::default();

    for (line, row) in rows.into_iter().enumerate() {
        progress.inc(1);

        let submission = match row {
            Ok(submission) => submission,
            Err(e) => {
                log::warn!("Skipping CSV row {}: {e}", line + 2);
                summary.invalid += 1;
                continue;
            }
        };

        match crate::queries::create_incident(conn, &submission) {
            Ok(_) => summary.inserted += 1,
            Err(DbError::DuplicateKey { case_number }) => {
                log::debug!("Skipping duplicate case {case_number}");
                summary.duplicates += 1;
            }
            Err(DbError::Validation(e)) => {
                log::warn!("Skipping CSV row {}: {e}", line + 2);
                summary.invalid += 1;
            }
            Err(e) => return Err(e),
        }
    }

    progress.finish(format!(
        "Imported {} incidents ({} duplicates, {} invalid)",
        summary.inserted, summary.duplicates, summary.invalid
    ));

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use crime_browser_database_models::IncidentQuery;

    use super::*;
    use crate::progress::NullProgress;

    const CSV: &str = "\
case_number,date,time,code,incident,police_grid,neighborhood_number,block
23000001,2023-01-02,10:00:00,600,Theft,87,14,17XX GRAND AV
23000002,2023-01-03,11:30:00,110,Homicide,65,11,98X UNIVERSITY AV W
23000001,2023-01-04,12:00:00,600,Theft,87,14,17XX GRAND AV
23000003,2023-01-05,09:00:00,600,Theft,87,14,
23000004,2023-01-06,09:00:00,abc,Theft,87,14,1XX MAIN ST
";

    #[test]
    fn imports_valid_rows_and_tallies_the_rest() {
        let conn = crate::db::open_in_memory().unwrap();
        let summary = import_incidents_csv(&conn, CSV.as_bytes(), &NullProgress).unwrap();

        assert_eq!(
            summary,
            ImportSummary {
                inserted: 2,
                duplicates: 1,
                invalid: 2,
            }
        );

        let rows = crate::queries::fetch_incidents(&conn, &IncidentQuery::default()).unwrap();
        let cases: BTreeSet<&str> = rows.iter().map(|r| r.case_number.as_str()).collect();
        assert_eq!(cases, BTreeSet::from(["23000001", "23000002"]));

        let first = rows.iter().find(|r| r.case_number == "23000001").unwrap();
        assert_eq!(first.date.to_string(), "2023-01-02");
    }
}
