//! The incident service boundary as seen from the client.

use std::collections::BTreeSet;

use async_trait::async_trait;
use crime_browser_database_models::IncidentQuery;
use crime_browser_geocoder::GeocodeError;
use crime_browser_incident_models::{IncidentCode, IncidentRecord, Neighborhood, ValidationError};
use thiserror::Error;

/// Errors surfaced by [`IncidentApi`] calls and the explorer pipeline.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejected locally before any request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Input rejected by the server.
    #[error("{message}")]
    Rejected {
        /// Server-provided message.
        message: String,
    },

    /// A record with this case number already exists.
    #[error("Case number {case_number} already exists")]
    DuplicateKey {
        /// The conflicting key.
        case_number: String,
    },

    /// No record with this case number exists.
    #[error("Case number {case_number} not found")]
    NotFound {
        /// The missing key.
        case_number: String,
    },

    /// The server failed while handling the request.
    #[error("Server error ({status}): {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Server-provided message.
        message: String,
    },

    /// The request never produced a usable response.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The geocoding collaborator failed.
    #[error("Geocoding unavailable: {0}")]
    Geocode(#[from] GeocodeError),
}

/// Operations exposed by the incident service.
#[async_trait]
pub trait IncidentApi: Send + Sync {
    /// Lists incident codes ascending. An empty filter returns all codes.
    async fn list_codes(&self, filter: &BTreeSet<i32>) -> Result<Vec<IncidentCode>, ApiError>;

    /// Lists neighborhoods ascending. An empty filter returns all.
    async fn list_neighborhoods(
        &self,
        filter: &BTreeSet<i32>,
    ) -> Result<Vec<Neighborhood>, ApiError>;

    /// Fetches incidents matching `query`, newest first.
    async fn fetch_incidents(&self, query: &IncidentQuery)
    -> Result<Vec<IncidentRecord>, ApiError>;

    /// Creates a new incident.
    async fn create_incident(&self, record: &IncidentRecord) -> Result<(), ApiError>;

    /// Deletes the incident with `case_number`.
    async fn delete_incident(&self, case_number: &str) -> Result<(), ApiError>;
}
