//! [`IncidentApi`] over the crime browser REST service.

use std::collections::BTreeSet;
use std::time::Duration;

use async_trait::async_trait;
use crime_browser_database_models::IncidentQuery;
use crime_browser_incident_models::{
    IncidentCode, IncidentRecord, IncidentSubmission, Neighborhood,
};
use crime_browser_server_models::{
    ApiErrorBody, CodesQueryParams, DeleteIncidentRequest, IncidentQueryParams,
    NeighborhoodsQueryParams,
};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

use crate::api::{ApiError, IncidentApi};

/// Timeout applied to every request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// REST client for a running crime browser server.
pub struct HttpIncidentApi {
    client: reqwest::Client,
    base_url: String,
}

impl HttpIncidentApi {
    /// Creates a client for the server at `base_url`
    /// (e.g. `http://127.0.0.1:8000`).
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Transport`] if the HTTP client cannot be built.
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{path}", self.base_url)
    }
}

fn join(ids: &BTreeSet<i32>) -> Option<String> {
    if ids.is_empty() {
        return None;
    }
    Some(ids.iter().map(ToString::to_string).collect::<Vec<_>>().join(","))
}

/// Decodes a success body, or maps an error status to a typed
/// [`ApiError`]. `case_number` names the key for 404/409 responses.
async fn decode<T: DeserializeOwned>(
    resp: reqwest::Response,
    case_number: Option<&str>,
) -> Result<T, ApiError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp.json().await?);
    }

    let body = resp.bytes().await?;
    Err(error_for_status(status, &body, case_number))
}

/// Maps a non-success response to the error the server meant: 400 is a
/// rejected request, 404 and 409 name `case_number`, anything else is a
/// server failure. A body that is not an `{"error"}` object falls back to
/// the status reason.
fn error_for_status(status: StatusCode, body: &[u8], case_number: Option<&str>) -> ApiError {
    let message = serde_json::from_slice::<ApiErrorBody>(body).map_or_else(
        |_| {
            status
                .canonical_reason()
                .unwrap_or("unknown error")
                .to_string()
        },
        |body| body.error,
    );
    log::debug!("Server responded {status}: {message}");

    let case_number = case_number.unwrap_or_default().to_string();
    match status {
        StatusCode::BAD_REQUEST => ApiError::Rejected { message },
        StatusCode::NOT_FOUND => ApiError::NotFound { case_number },
        StatusCode::CONFLICT => ApiError::DuplicateKey { case_number },
        _ => ApiError::Server {
            status: status.as_u16(),
            message,
        },
    }
}

#[async_trait]
impl IncidentApi for HttpIncidentApi {
    async fn list_codes(&self, filter: &BTreeSet<i32>) -> Result<Vec<IncidentCode>, ApiError> {
        let params = CodesQueryParams { code: join(filter) };
        let resp = self.client.get(self.url("codes")).query(&params).send().await?;
        decode(resp, None).await
    }

    async fn list_neighborhoods(
        &self,
        filter: &BTreeSet<i32>,
    ) -> Result<Vec<Neighborhood>, ApiError> {
        let params = NeighborhoodsQueryParams { id: join(filter) };
        let resp = self
            .client
            .get(self.url("neighborhoods"))
            .query(&params)
            .send()
            .await?;
        decode(resp, None).await
    }

    async fn fetch_incidents(
        &self,
        query: &IncidentQuery,
    ) -> Result<Vec<IncidentRecord>, ApiError> {
        let params = IncidentQueryParams::from(query);
        let resp = self
            .client
            .get(self.url("incidents"))
            .query(&params)
            .send()
            .await?;
        decode(resp, None).await
    }

    async fn create_incident(&self, record: &IncidentRecord) -> Result<(), ApiError> {
        let resp = self
            .client
            .put(self.url("new-incident"))
            .json(&IncidentSubmission::from(record))
            .send()
            .await?;
        decode::<serde_json::Value>(resp, Some(&record.case_number)).await?;
        Ok(())
    }

    async fn delete_incident(&self, case_number: &str) -> Result<(), ApiError> {
        let resp = self
            .client
            .delete(self.url("remove-incident"))
            .json(&DeleteIncidentRequest {
                case_number: Some(case_number.to_string()),
            })
            .send()
            .await?;
        decode::<serde_json::Value>(resp, Some(case_number)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bad_request_carries_server_message() {
        let err = error_for_status(
            StatusCode::BAD_REQUEST,
            br#"{"error":"Missing required fields: block"}"#,
            None,
        );
        assert!(
            matches!(err, ApiError::Rejected { ref message } if message == "Missing required fields: block")
        );
    }

    #[test]
    fn not_found_and_conflict_name_the_case() {
        let body = br#"{"error":"ignored"}"#;
        assert!(matches!(
            error_for_status(StatusCode::NOT_FOUND, body, Some("23001234")),
            ApiError::NotFound { ref case_number } if case_number == "23001234"
        ));

        let dup = error_for_status(StatusCode::CONFLICT, body, Some("23001234"));
        assert_eq!(dup.to_string(), "Case number 23001234 already exists");
    }

    #[test]
    fn other_statuses_are_server_errors() {
        let err = error_for_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            br#"{"error":"Failed to fetch incidents"}"#,
            None,
        );
        assert!(matches!(
            err,
            ApiError::Server { status: 500, ref message } if message == "Failed to fetch incidents"
        ));
    }

    #[test]
    fn non_json_body_falls_back_to_status_reason() {
        let err = error_for_status(StatusCode::BAD_GATEWAY, b"<html>upstream</html>", None);
        assert!(matches!(
            err,
            ApiError::Server { status: 502, ref message } if message == "Bad Gateway"
        ));

        let err = error_for_status(StatusCode::BAD_REQUEST, b"", None);
        assert!(matches!(err, ApiError::Rejected { ref message } if message == "Bad Request"));
    }

    #[test]
    fn joins_ids_in_ascending_order() {
        assert_eq!(join(&BTreeSet::new()), None);
        assert_eq!(join(&BTreeSet::from([14, 3, 11])), Some("3,11,14".to_string()));
    }
}
