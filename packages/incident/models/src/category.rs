//! Keyword-based incident category classification.

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// Keywords that mark an incident as violent. Checked before
/// [`PROPERTY_KEYWORDS`].
const VIOLENT_KEYWORDS: &[&str] = &[
    "homicide",
    "murder",
    "rape",
    "sexual",
    "robbery",
    "assault",
    "shooting",
    "shots fired",
    "discharge",
    "weapon",
    "kidnap",
    "domestic",
];

/// Keywords that mark an incident as a property crime.
const PROPERTY_KEYWORDS: &[&str] = &[
    "theft",
    "burglary",
    "larceny",
    "shoplift",
    "stolen",
    "vandalism",
    "graffiti",
    "damage",
    "arson",
    "motor vehicle",
];

/// Display classification for an incident.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum IncidentCategory {
    /// Crimes against persons.
    Violent,
    /// Crimes against property.
    Property,
    /// Everything else (proactive visits, community events, narcotics...).
    Other,
}

impl IncidentCategory {
    /// Classifies an incident from its type name and free-text detail.
    ///
    /// Performs a case-insensitive substring match over the concatenation
    /// of both strings. Violent keywords take precedence over property
    /// keywords; anything unmatched is [`Self::Other`].
    #[must_use]
    pub fn classify(incident_type: &str, detail: &str) -> Self {
        let haystack = format!("{incident_type} {detail}").to_lowercase();

        if VIOLENT_KEYWORDS.iter().any(|k| haystack.contains(k)) {
            Self::Violent
        } else if PROPERTY_KEYWORDS.iter().any(|k| haystack.contains(k)) {
            Self::Property
        } else {
            Self::Other
        }
    }

    /// Returns all variants of this enum.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Violent, Self::Property, Self::Other]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_by_type_name() {
        assert_eq!(
            IncidentCategory::classify("Agg. Assault", ""),
            IncidentCategory::Violent
        );
        assert_eq!(
            IncidentCategory::classify("Burglary", ""),
            IncidentCategory::Property
        );
        assert_eq!(
            IncidentCategory::classify("Proactive Police Visit", ""),
            IncidentCategory::Other
        );
    }

    #[test]
    fn classifies_from_detail_when_type_is_unresolved() {
        assert_eq!(
            IncidentCategory::classify("9999", "Theft from motor vehicle"),
            IncidentCategory::Property
        );
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(
            IncidentCategory::classify("ROBBERY", "STREET"),
            IncidentCategory::Violent
        );
        assert_eq!(
            IncidentCategory::classify("graffiti", ""),
            IncidentCategory::Property
        );
    }

    #[test]
    fn violent_wins_over_property() {
        assert_eq!(
            IncidentCategory::classify("Robbery", "Stolen wallet"),
            IncidentCategory::Violent
        );
    }

    #[test]
    fn category_string_forms_agree() {
        for category in IncidentCategory::all() {
            let parsed: IncidentCategory = category.as_ref().parse().unwrap();
            assert_eq!(parsed, *category);
        }
    }
}
