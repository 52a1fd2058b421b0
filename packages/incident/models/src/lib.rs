#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Incident record, reference catalog, and classification types.
//!
//! These are the shapes shared across the whole crime browser: the fixed
//! reference tables (incident codes and neighborhoods), the persisted
//! incident record, and the display-enriched incident produced by the
//! explorer's projector.

pub mod category;
pub mod submission;

pub use category::IncidentCategory;
pub use submission::{IncidentSubmission, ValidationError};

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// An incident code reference row, e.g. `110 -> "Homicide"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IncidentCode {
    /// Numeric incident code (unique).
    pub code: i32,
    /// Human-readable incident type name.
    #[serde(rename = "type")]
    pub incident_type: String,
}

/// A neighborhood reference row, e.g. `14 -> "Macalester-Groveland"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Neighborhood {
    /// Neighborhood number (unique).
    pub id: i32,
    /// Neighborhood display name.
    pub name: String,
}

/// A persisted crime incident.
///
/// Records are created by explicit submission and removed by explicit
/// deletion. They are never updated in place.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentRecord {
    /// Globally unique case number.
    pub case_number: String,
    /// Date the incident occurred.
    pub date: NaiveDate,
    /// Time of day the incident occurred.
    pub time: NaiveTime,
    /// Incident code (logical reference into the code catalog).
    pub code: i32,
    /// Free-text incident detail.
    pub incident: String,
    /// Police grid number.
    pub police_grid: i32,
    /// Neighborhood number (logical reference into the neighborhood catalog).
    pub neighborhood_number: i32,
    /// Block-level address (house numbers masked with `X`).
    pub block: String,
}

impl IncidentRecord {
    /// Combined date and time, used for chronological ordering.
    #[must_use]
    pub fn occurred_at(&self) -> chrono::NaiveDateTime {
        self.date.and_time(self.time)
    }
}

/// An [`IncidentRecord`] with display fields resolved against the
/// reference catalogs.
///
/// Recomputed on every fetch and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichedIncident {
    /// The raw persisted record.
    #[serde(flatten)]
    pub record: IncidentRecord,
    /// Incident type name, or the stringified code when unresolved.
    pub incident_type: String,
    /// Neighborhood name, or the stringified number when unresolved.
    pub neighborhood_name: String,
    /// Keyword-derived category.
    pub category: IncidentCategory,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_code_serializes_type_field() {
        let code = IncidentCode {
            code: 110,
            incident_type: "Theft".to_string(),
        };
        let json = serde_json::to_value(&code).unwrap();
        assert_eq!(json, serde_json::json!({ "code": 110, "type": "Theft" }));
    }

    #[test]
    fn enriched_incident_flattens_record() {
        let enriched = EnrichedIncident {
            record: IncidentRecord {
                case_number: "23000123".to_string(),
                date: NaiveDate::from_ymd_opt(2023, 1, 5).unwrap(),
                time: NaiveTime::from_hms_opt(13, 15, 0).unwrap(),
                code: 600,
                incident: "Theft".to_string(),
                police_grid: 87,
                neighborhood_number: 14,
                block: "17XX GRAND AV".to_string(),
            },
            incident_type: "Theft".to_string(),
            neighborhood_name: "Macalester-Groveland".to_string(),
            category: IncidentCategory::Property,
        };

        let json = serde_json::to_value(&enriched).unwrap();
        assert_eq!(json["case_number"], "23000123");
        assert_eq!(json["date"], "2023-01-05");
        assert_eq!(json["time"], "13:15:00");
        assert_eq!(json["category"], "property");
    }
}
