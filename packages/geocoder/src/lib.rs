#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Geocoding collaborator for the crime browser.
//!
//! Resolves free text (usually a cleaned incident block) to a coordinate
//! and label, and coordinates back to a label. Finding nothing is a
//! normal outcome (`Ok(None)`); a transport failure is a recoverable
//! [`GeocodeError`] that callers surface as "upstream unavailable" without
//! touching any filter or query state.
//!
//! The only provider is [`nominatim::NominatimClient`]. Wrap it in
//! [`cache::CachedGeocoder`] to bound repeated lookups.

pub mod address;
pub mod cache;
pub mod nominatim;
pub mod service;

use async_trait::async_trait;
use crime_browser_geography_models::{BoundingBox, LatLng};
use thiserror::Error;

/// A successful forward geocode.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeResult {
    /// Resolved position.
    pub location: LatLng,
    /// Display label returned by the provider.
    pub label: String,
}

/// Errors from geocoding operations.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("Geocoder returned HTTP {status}")]
    Status {
        /// HTTP status code.
        status: u16,
    },

    /// Response parsing failed.
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the parsing failure.
        message: String,
    },

    /// Rate limit exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

impl GeocodeError {
    /// Whether the failure is an upstream availability problem that the
    /// user may retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Http(_) | Self::Status { .. } | Self::RateLimited
        )
    }
}

/// A forward and reverse geocoding provider.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves `text` to a position, optionally restricted to `bounds`.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider cannot be reached or its
    /// response cannot be parsed.
    async fn search(
        &self,
        text: &str,
        bounds: Option<&BoundingBox>,
    ) -> Result<Option<GeocodeResult>, GeocodeError>;

    /// Resolves a position to a display label.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError`] if the provider cannot be reached or its
    /// response cannot be parsed.
    async fn reverse(&self, point: LatLng) -> Result<Option<String>, GeocodeError>;
}
