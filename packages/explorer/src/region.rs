//! Map region configuration: neighborhood anchors and default extents.
//!
//! Regions are embedded TOML files under `anchors/`. The only region
//! shipped is St. Paul, MN.

use crime_browser_geography_models::{BoundingBox, LatLng, NeighborhoodAnchor};
use serde::Deserialize;

const SAINT_PAUL_TOML: &str = include_str!("../anchors/saint_paul.toml");

/// A latitude/longitude extent in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Span {
    /// Latitude extent.
    pub lat: f64,
    /// Longitude extent.
    pub lng: f64,
}

/// The fixed geography the explorer works within.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Region {
    /// Display name.
    pub name: String,
    /// Appended to block addresses before geocoding.
    pub geocode_suffix: String,
    /// Initial map center.
    pub center: LatLng,
    /// Extent used to restrict geocoder searches.
    pub bounds: BoundingBox,
    /// Extent of the initial viewport around [`Self::center`].
    pub initial_span: Span,
    /// Extent of the viewport after locating a single incident.
    pub locate_span: Span,
    /// One anchor point per neighborhood.
    pub anchors: Vec<NeighborhoodAnchor>,
}

impl Region {
    /// Parses a region definition from TOML.
    ///
    /// # Errors
    ///
    /// Returns a [`toml::de::Error`] if the document is malformed.
    pub fn from_toml(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::de::from_str(toml_str)
    }

    /// The embedded St. Paul region.
    ///
    /// # Panics
    ///
    /// Panics if the embedded TOML is malformed (a compile-time guarantee
    /// since the file is embedded).
    #[must_use]
    pub fn saint_paul() -> Self {
        Self::from_toml(SAINT_PAUL_TOML)
            .unwrap_or_else(|e| panic!("Failed to parse region 'saint_paul': {e}"))
    }

    /// Viewport shown before the user moves the map.
    #[must_use]
    pub fn initial_viewport(&self) -> BoundingBox {
        BoundingBox::centered_on(self.center, self.initial_span.lat, self.initial_span.lng)
    }

    /// Viewport used when recentering on a located incident.
    #[must_use]
    pub fn locate_viewport(&self, target: LatLng) -> BoundingBox {
        BoundingBox::centered_on(target, self.locate_span.lat, self.locate_span.lng)
    }
}
