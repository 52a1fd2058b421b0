//! Nominatim / OpenStreetMap geocoder client.
//!
//! The public instance allows at most one request per second; the
//! [`crate::cache::CachedGeocoder`] wrapper keeps repeated lookups off the
//! wire.
//!
//! See <https://nominatim.org/release-docs/develop/api/Search/>

use std::time::Duration;

use async_trait::async_trait;
use crime_browser_geography_models::{BoundingBox, LatLng};

use crate::service::GeocodingService;
use crate::{GeocodeError, GeocodeResult, Geocoder};

/// HTTP client for a Nominatim instance.
pub struct NominatimClient {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimClient {
    /// Builds a client from a service configuration.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the HTTP client cannot be built.
    pub fn new(service: &GeocodingService) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .user_agent(service.user_agent.clone())
            .timeout(Duration::from_secs(service.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: service.base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn get_json(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<serde_json::Value, GeocodeError> {
        let resp = self
            .client
            .get(format!("{}/{path}", self.base_url))
            .query(query)
            .send()
            .await?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited);
        }
        if !status.is_success() {
            return Err(GeocodeError::Status {
                status: status.as_u16(),
            });
        }

        Ok(resp.json().await?)
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(
        &self,
        text: &str,
        bounds: Option<&BoundingBox>,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let mut query = vec![
            ("q", text.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", "1".to_string()),
        ];
        if let Some(b) = bounds {
            // viewbox is x1,y1,x2,y2 (lon/lat of two opposite corners).
            query.push((
                "viewbox",
                format!("{},{},{},{}", b.west, b.north, b.east, b.south),
            ));
            query.push(("bounded", "1".to_string()));
        }

        let body = self.get_json("search", &query).await?;
        parse_search_response(&body)
    }

    async fn reverse(&self, point: LatLng) -> Result<Option<String>, GeocodeError> {
        let query = [
            ("lat", point.lat.to_string()),
            ("lon", point.lng.to_string()),
            ("format", "jsonv2".to_string()),
        ];

        let body = self.get_json("reverse", &query).await?;
        parse_reverse_response(&body)
    }
}

/// Parses a Nominatim search response (a JSON array of places).
fn parse_search_response(body: &serde_json::Value) -> Result<Option<GeocodeResult>, GeocodeError> {
    let results = body.as_array().ok_or_else(|| GeocodeError::Parse {
        message: "Nominatim response is not an array".to_string(),
    })?;

    let Some(first) = results.first() else {
        return Ok(None);
    };

    let lat = first["lat"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lat in Nominatim response".to_string(),
        })?;

    let lon = first["lon"]
        .as_str()
        .and_then(|s| s.parse::<f64>().ok())
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing lon in Nominatim response".to_string(),
        })?;

    let label = first["display_name"].as_str().unwrap_or_default().to_string();

    Ok(Some(GeocodeResult {
        location: LatLng::new(lat, lon),
        label,
    }))
}

/// Parses a Nominatim reverse response. `{"error": ...}` means no match.
fn parse_reverse_response(body: &serde_json::Value) -> Result<Option<String>, GeocodeError> {
    if body.get("error").is_some() {
        return Ok(None);
    }

    body["display_name"]
        .as_str()
        .map(|s| Some(s.to_string()))
        .ok_or_else(|| GeocodeError::Parse {
            message: "Missing display_name in Nominatim reverse response".to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_result() {
        let body = serde_json::json!([{
            "lat": "44.9559",
            "lon": "-93.1343",
            "display_name": "980, University Avenue West, Saint Paul, MN, USA"
        }]);
        let result = parse_search_response(&body).unwrap().unwrap();
        assert!((result.location.lat - 44.9559).abs() < 1e-4);
        assert!((result.location.lng - -93.1343).abs() < 1e-4);
        assert!(result.label.starts_with("980"));
    }

    #[test]
    fn empty_search_is_not_an_error() {
        let body = serde_json::json!([]);
        assert!(parse_search_response(&body).unwrap().is_none());
    }

    #[test]
    fn malformed_search_is_a_parse_error() {
        let body = serde_json::json!({ "unexpected": true });
        assert!(matches!(
            parse_search_response(&body),
            Err(GeocodeError::Parse { .. })
        ));
    }

    #[test]
    fn parses_reverse_result() {
        let body = serde_json::json!({ "display_name": "Summit Avenue, Saint Paul" });
        assert_eq!(
            parse_reverse_response(&body).unwrap().as_deref(),
            Some("Summit Avenue, Saint Paul")
        );
    }

    #[test]
    fn reverse_error_body_means_no_match() {
        let body = serde_json::json!({ "error": "Unable to geocode" });
        assert!(parse_reverse_response(&body).unwrap().is_none());
    }
}
