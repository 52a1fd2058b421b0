//! In-memory view of the reference catalog.

use std::collections::{BTreeMap, BTreeSet};

use crime_browser_incident_models::{IncidentCode, Neighborhood};

/// Incident codes and neighborhoods loaded once at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    code_types: BTreeMap<i32, String>,
    codes_by_type: BTreeMap<String, BTreeSet<i32>>,
    neighborhoods: BTreeMap<i32, String>,
}

impl Catalog {
    /// Builds a catalog from reference rows. Later duplicates of a key
    /// replace earlier ones.
    #[must_use]
    pub fn new(codes: Vec<IncidentCode>, neighborhoods: Vec<Neighborhood>) -> Self {
        let mut code_types = BTreeMap::new();
        for code in codes {
            code_types.insert(code.code, code.incident_type);
        }

        let mut codes_by_type: BTreeMap<String, BTreeSet<i32>> = BTreeMap::new();
        for (code, incident_type) in &code_types {
            codes_by_type
                .entry(incident_type.clone())
                .or_default()
                .insert(*code);
        }

        Self {
            code_types,
            codes_by_type,
            neighborhoods: neighborhoods.into_iter().map(|n| (n.id, n.name)).collect(),
        }
    }

    /// Type name for `code`, if known.
    #[must_use]
    pub fn incident_type(&self, code: i32) -> Option<&str> {
        self.code_types.get(&code).map(String::as_str)
    }

    /// Name of neighborhood `id`, if known.
    #[must_use]
    pub fn neighborhood_name(&self, id: i32) -> Option<&str> {
        self.neighborhoods.get(&id).map(String::as_str)
    }

    /// All codes mapped to the type `name`, or `None` for an unknown type.
    #[must_use]
    pub fn codes_for_type(&self, name: &str) -> Option<&BTreeSet<i32>> {
        self.codes_by_type.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn groups_codes_by_type() {
        let catalog = Catalog::new(
            vec![
                IncidentCode {
                    code: 600,
                    incident_type: "Theft".to_string(),
                },
                IncidentCode {
                    code: 110,
                    incident_type: "Homicide".to_string(),
                },
                IncidentCode {
                    code: 611,
                    incident_type: "Theft".to_string(),
                },
            ],
            vec![Neighborhood {
                id: 14,
                name: "Macalester-Groveland".to_string(),
            }],
        );

        assert_eq!(
            catalog.codes_for_type("Theft"),
            Some(&BTreeSet::from([600, 611]))
        );
        assert_eq!(catalog.codes_for_type("Homicide"), Some(&BTreeSet::from([110])));
        assert_eq!(catalog.codes_for_type("Arson"), None);
        assert_eq!(catalog.incident_type(110), Some("Homicide"));
        assert_eq!(catalog.neighborhood_name(14), Some("Macalester-Groveland"));
        assert_eq!(catalog.neighborhood_name(99), None);
    }
}
