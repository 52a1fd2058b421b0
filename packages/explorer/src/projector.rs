//! Result projection: display enrichment and per-neighborhood counts.

use std::collections::BTreeMap;

use crime_browser_incident_models::{EnrichedIncident, IncidentCategory, IncidentRecord};

use crate::catalog::Catalog;

/// Enriched rows plus marker weights.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    /// Rows in the order the query engine returned them.
    pub incidents: Vec<EnrichedIncident>,
    /// Number of projected rows per neighborhood id.
    pub counts: BTreeMap<i32, u64>,
}

impl Projection {
    /// Whether the projection holds no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.incidents.is_empty()
    }

    /// Count for one neighborhood, zero when absent.
    #[must_use]
    pub fn count_for(&self, neighborhood: i32) -> u64 {
        self.counts.get(&neighborhood).copied().unwrap_or(0)
    }
}

/// Enriches a single record. Unknown codes and neighborhood ids are shown
/// as their numeric value.
#[must_use]
pub fn enrich(record: IncidentRecord, catalog: &Catalog) -> EnrichedIncident {
    let incident_type = catalog.incident_type(record.code).map_or_else(
        || {
            log::debug!("Unknown incident code {} on case {}", record.code, record.case_number);
            record.code.to_string()
        },
        str::to_string,
    );
    let neighborhood_name = catalog
        .neighborhood_name(record.neighborhood_number)
        .map_or_else(|| record.neighborhood_number.to_string(), str::to_string);
    let category = IncidentCategory::classify(&incident_type, &record.incident);

    EnrichedIncident {
        record,
        incident_type,
        neighborhood_name,
        category,
    }
}

/// Enriches every row and tallies rows per neighborhood.
#[must_use]
pub fn project(rows: Vec<IncidentRecord>, catalog: &Catalog) -> Projection {
    let mut counts = BTreeMap::new();
    let incidents = rows
        .into_iter()
        .map(|record| {
            *counts.entry(record.neighborhood_number).or_insert(0) += 1;
            enrich(record, catalog)
        })
        .collect();

    Projection { incidents, counts }
}
