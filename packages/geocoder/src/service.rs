//! Compile-time embedded geocoding service configuration.
//!
//! The Nominatim provider is described by `services/nominatim.toml`. The
//! base URL can be pointed at a self-hosted instance through
//! [`BASE_URL_ENV`].

use serde::Deserialize;

/// Environment variable overriding the embedded base URL.
pub const BASE_URL_ENV: &str = "NOMINATIM_URL";

const NOMINATIM_TOML: &str = include_str!("../services/nominatim.toml");

/// A geocoding service configuration loaded from TOML.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodingService {
    /// Unique identifier.
    pub id: String,
    /// Human-readable name.
    pub name: String,
    /// API base URL; `/search` and `/reverse` are appended.
    pub base_url: String,
    /// `User-Agent` header sent with every request (required by the
    /// public Nominatim usage policy).
    pub user_agent: String,
    /// Suffix appended to block addresses before searching.
    pub city_suffix: String,
    /// Entries kept per LRU cache.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Per-request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

const fn default_cache_capacity() -> usize {
    256
}

const fn default_timeout_secs() -> u64 {
    10
}

impl GeocodingService {
    /// Parses a service definition from TOML.
    ///
    /// # Errors
    ///
    /// Returns a [`toml::de::Error`] if the document is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(toml_str)
    }

    /// Returns the embedded Nominatim configuration with the
    /// [`BASE_URL_ENV`] override applied.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time
    /// guarantee since the config is embedded).
    #[must_use]
    pub fn nominatim() -> Self {
        let mut service = Self::from_toml(NOMINATIM_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse geocoding service 'nominatim': {e}"));
        if let Ok(url) = std::env::var(BASE_URL_ENV) {
            service.base_url = url;
        }
        service
    }
}
