#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Map viewport and neighborhood anchor geometry types.
//!
//! Containment is plain bounding-box arithmetic in WGS84 degrees. There is
//! no spatial index: the neighborhood set is small and fixed.

use serde::{Deserialize, Serialize};

/// A WGS84 coordinate pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    /// Latitude.
    pub lat: f64,
    /// Longitude.
    pub lng: f64,
}

impl LatLng {
    /// Creates a new coordinate pair.
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A geographic bounding box in WGS84 coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Western longitude boundary.
    pub west: f64,
    /// Southern latitude boundary.
    pub south: f64,
    /// Eastern longitude boundary.
    pub east: f64,
    /// Northern latitude boundary.
    pub north: f64,
}

impl BoundingBox {
    /// Creates a new bounding box from the given coordinates.
    #[must_use]
    pub const fn new(west: f64, south: f64, east: f64, north: f64) -> Self {
        Self {
            west,
            south,
            east,
            north,
        }
    }

    /// Builds a box of the given extent (in degrees) centered on `center`.
    #[must_use]
    pub fn centered_on(center: LatLng, lat_span: f64, lng_span: f64) -> Self {
        let half_lat = lat_span.abs() / 2.0;
        let half_lng = lng_span.abs() / 2.0;
        Self::new(
            center.lng - half_lng,
            center.lat - half_lat,
            center.lng + half_lng,
            center.lat + half_lat,
        )
    }

    /// Parses a `"west,south,east,north"` string.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        let parts: Vec<f64> = s
            .split(',')
            .map(|p| p.trim().parse().ok())
            .collect::<Option<_>>()?;
        if parts.len() == 4 {
            Some(Self::new(parts[0], parts[1], parts[2], parts[3]))
        } else {
            None
        }
    }

    /// Returns whether `point` lies inside the box. Edges are inclusive.
    #[must_use]
    pub fn contains(&self, point: LatLng) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lng >= self.west
            && point.lng <= self.east
    }
}

/// The fixed reference point used to decide whether a neighborhood is
/// on screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeighborhoodAnchor {
    /// Neighborhood number.
    pub id: i32,
    /// Anchor latitude.
    pub lat: f64,
    /// Anchor longitude.
    pub lng: f64,
}

impl NeighborhoodAnchor {
    /// Anchor position as a coordinate pair.
    #[must_use]
    pub const fn position(&self) -> LatLng {
        LatLng::new(self.lat, self.lng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_is_edge_inclusive() {
        let bbox = BoundingBox::new(-93.2, 44.9, -93.0, 45.0);
        assert!(bbox.contains(LatLng::new(44.95, -93.1)));
        assert!(bbox.contains(LatLng::new(44.9, -93.2)));
        assert!(!bbox.contains(LatLng::new(45.01, -93.1)));
        assert!(!bbox.contains(LatLng::new(44.95, -92.99)));
    }

    #[test]
    fn parses_bbox_string() {
        let bbox = BoundingBox::parse("-93.2, 44.9, -93.0, 45.0").unwrap();
        assert!((bbox.west - -93.2).abs() < f64::EPSILON);
        assert!((bbox.north - 45.0).abs() < f64::EPSILON);
        assert!(BoundingBox::parse("-93.2,44.9,-93.0").is_none());
        assert!(BoundingBox::parse("a,b,c,d").is_none());
    }

    #[test]
    fn centered_box_keeps_center() {
        let center = LatLng::new(44.94, -93.17);
        let bbox = BoundingBox::centered_on(center, 0.02, 0.04);
        assert!((bbox.south - 44.93).abs() < 1e-9);
        assert!((bbox.north - 44.95).abs() < 1e-9);
        assert!((bbox.west - -93.19).abs() < 1e-9);
        assert!((bbox.east - -93.15).abs() < 1e-9);
        assert!(bbox.contains(center));
    }
}
