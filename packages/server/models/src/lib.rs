#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! REST request and response types for the crime browser server.
//!
//! Query parameters arrive as raw strings so that malformed input is
//! reported as a [`ValidationError`] by the handler instead of a generic
//! extractor rejection. The same types are serialized by the HTTP client
//! in the explorer, so both sides agree on the wire format.

use std::collections::BTreeSet;

use crime_browser_database_models::{IncidentQuery, parse_limit};
use crime_browser_incident_models::ValidationError;
use crime_browser_incident_models::submission::{DATE_FORMAT, parse_date};
use serde::{Deserialize, Serialize};

/// Query parameters for `GET /api/codes`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CodesQueryParams {
    /// Comma-separated incident codes. Absent or empty returns every code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl CodesQueryParams {
    /// Parses the requested code set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if any element is not an
    /// integer.
    pub fn codes(&self) -> Result<BTreeSet<i32>, ValidationError> {
        parse_id_list("code", self.code.as_deref())
    }
}

/// Query parameters for `GET /api/neighborhoods`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NeighborhoodsQueryParams {
    /// Comma-separated neighborhood ids. Absent or empty returns all.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

impl NeighborhoodsQueryParams {
    /// Parses the requested id set.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidValue`] if any element is not an
    /// integer.
    pub fn ids(&self) -> Result<BTreeSet<i32>, ValidationError> {
        parse_id_list("id", self.id.as_deref())
    }
}

/// Query parameters for `GET /api/incidents`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentQueryParams {
    /// Inclusive lower bound, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    /// Inclusive upper bound, `YYYY-MM-DD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    /// Comma-separated incident codes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Comma-separated police grids.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub grid: Option<String>,
    /// Comma-separated neighborhood numbers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neighborhood: Option<String>,
    /// Maximum number of rows. Invalid values fall back to 1000.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<String>,
}

impl IncidentQueryParams {
    /// Normalizes the raw parameters into an [`IncidentQuery`].
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] if a date is malformed or a list holds
    /// a non-integer element.
    pub fn to_query(&self) -> Result<IncidentQuery, ValidationError> {
        Ok(IncidentQuery {
            start_date: optional_date(self.start_date.as_deref())?,
            end_date: optional_date(self.end_date.as_deref())?,
            codes: parse_id_list("code", self.code.as_deref())?,
            grids: parse_id_list("grid", self.grid.as_deref())?,
            neighborhoods: parse_id_list("neighborhood", self.neighborhood.as_deref())?,
            limit: parse_limit(self.limit.as_deref()),
        })
    }
}

impl From<&IncidentQuery> for IncidentQueryParams {
    fn from(query: &IncidentQuery) -> Self {
        Self {
            start_date: query.start_date.map(|d| d.format(DATE_FORMAT).to_string()),
            end_date: query.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            code: join_ids(&query.codes),
            grid: join_ids(&query.grids),
            neighborhood: join_ids(&query.neighborhoods),
            limit: Some(query.limit.to_string()),
        }
    }
}

/// Body of `DELETE /api/remove-incident`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteIncidentRequest {
    /// Case number of the record to remove.
    pub case_number: Option<String>,
}

/// Success body for create and delete.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiMutation {
    /// Case number that was created or removed.
    pub case_number: String,
}

/// Error body returned with every non-2xx status.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    /// Human-readable message.
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// Parses a comma-separated integer list. Blank input and blank elements
/// are ignored; any other unparseable element is an error.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidValue`] naming `field` and the
/// offending element.
pub fn parse_id_list(field: &'static str, raw: Option<&str>) -> Result<BTreeSet<i32>, ValidationError> {
    let Some(raw) = raw else {
        return Ok(BTreeSet::new());
    };

    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse::<i32>()
                .map_err(|_| ValidationError::InvalidValue {
                    field,
                    value: part.to_string(),
                })
        })
        .collect()
}

fn optional_date(raw: Option<&str>) -> Result<Option<chrono::NaiveDate>, ValidationError> {
    match raw.map(str::trim) {
        Some(value) if !value.is_empty() => parse_date(value).map(Some),
        _ => Ok(None),
    }
}

fn join_ids(ids: &BTreeSet<i32>) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(
        ids.iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(","),
    )
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use crime_browser_database_models::DEFAULT_LIMIT;

    use super::*;

    #[test]
    fn parses_id_lists_and_ignores_blanks() {
        assert_eq!(
            parse_id_list("code", Some("600, 110,,110 ")).unwrap(),
            BTreeSet::from([110, 600])
        );
        assert!(parse_id_list("code", Some("")).unwrap().is_empty());
        assert!(parse_id_list("code", None).unwrap().is_empty());
    }

    #[test]
    fn rejects_non_integer_list_elements() {
        assert_eq!(
            parse_id_list("neighborhood", Some("11,abc")),
            Err(ValidationError::InvalidValue {
                field: "neighborhood",
                value: "abc".to_string(),
            })
        );
    }

    #[test]
    fn normalizes_query_params() {
        let params = IncidentQueryParams {
            start_date: Some("2023-01-01".to_string()),
            end_date: Some("2023-01-31".to_string()),
            neighborhood: Some("14,11".to_string()),
            limit: Some("-3".to_string()),
            ..IncidentQueryParams::default()
        };

        let query = params.to_query().unwrap();
        assert_eq!(query.start_date, NaiveDate::from_ymd_opt(2023, 1, 1));
        assert_eq!(query.end_date, NaiveDate::from_ymd_opt(2023, 1, 31));
        assert_eq!(query.neighborhoods, BTreeSet::from([11, 14]));
        assert!(query.codes.is_empty());
        assert_eq!(query.limit, DEFAULT_LIMIT);
    }

    #[test]
    fn rejects_malformed_dates() {
        let params = IncidentQueryParams {
            start_date: Some("01/05/2023".to_string()),
            ..IncidentQueryParams::default()
        };
        assert!(matches!(
            params.to_query(),
            Err(ValidationError::InvalidDate { .. })
        ));
    }

    #[test]
    fn query_survives_param_conversion() {
        let query = IncidentQuery {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            codes: BTreeSet::from([110, 600]),
            neighborhoods: BTreeSet::from([11, 14]),
            limit: 50,
            ..IncidentQuery::default()
        };

        let params = IncidentQueryParams::from(&query);
        assert_eq!(params.code.as_deref(), Some("110,600"));
        assert_eq!(params.grid, None);
        assert_eq!(params.to_query().unwrap(), query);
    }

    #[test]
    fn empty_dimensions_are_omitted_from_the_wire() {
        let params = IncidentQueryParams::from(&IncidentQuery::default());
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({ "limit": "1000" }));
    }
}
