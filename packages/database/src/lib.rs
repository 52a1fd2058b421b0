#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! `DuckDB` persistence for the crime browser.
//!
//! A single `DuckDB` file holds the two reference tables (`codes`,
//! `neighborhoods`) and the `incidents` table. All functions take a
//! borrowed [`duckdb::Connection`]; callers that share a connection
//! across threads wrap it in a `Mutex`, which also gives create/delete
//! their single-writer semantics.

pub mod catalog;
pub mod db;
pub mod import;
pub mod progress;
pub mod queries;
pub mod schema;

use crime_browser_incident_models::ValidationError;

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    /// Required input was missing or malformed. No mutation was attempted.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// An incident with this case number already exists.
    #[error("Case number {case_number} already exists")]
    DuplicateKey {
        /// The conflicting case number.
        case_number: String,
    },

    /// No incident with this case number exists.
    #[error("Case number {case_number} does not exist")]
    NotFound {
        /// The missing case number.
        case_number: String,
    },

    /// Underlying `DuckDB` failure.
    #[error("Database error: {0}")]
    Database(#[from] duckdb::Error),

    /// Filesystem error while preparing the data directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV parsing error (seed or import data).
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Data conversion error.
    #[error("Data conversion error: {message}")]
    Conversion {
        /// Description of what went wrong.
        message: String,
    },
}
