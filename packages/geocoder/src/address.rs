//! Block address cleaning for geocoding.
//!
//! Incident blocks come from the police records system in masked form:
//! - Trailing-X house numbers: `"98X UNIVERSITY AV W"`, `"17XX GRAND AV"`
//! - Leading-X house numbers: `"XX00 MAIN ST"`
//! - Intersections: `"SNELLING AV N & UNIVERSITY AV W"`
//!
//! This module normalizes these into a form suitable for a geocoder query.

use regex::{Captures, Regex};
use std::sync::LazyLock;

/// Regex for trailing-X masked house numbers (e.g. "98X", "17XX").
static TRAILING_X_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(X+)\b").expect("valid regex"));

/// Regex for leading-X masked house numbers (e.g. "XX00").
static LEADING_X_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^X+(\d+)\b").expect("valid regex"));

/// Regex for runs of whitespace.
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Regex for travel-direction suffixes ("EB", "WB", "NB", "SB").
static DIRECTION_SUFFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+(EB|WB|NB|SB)$").expect("valid regex"));

/// Non-geocodable address patterns.
static SKIP_PATTERNS: &[&str] = &["UNKNOWN", "N/A", "NA", "NONE", "UNDETERMINED"];

/// Result of cleaning a block address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CleanedAddress {
    /// A street address suitable for geocoding.
    Street(String),
    /// An intersection of two streets, geocoded as a free-form query.
    Intersection {
        /// First street.
        street1: String,
        /// Second street.
        street2: String,
    },
    /// The address is not geocodable (empty, unknown, garbage).
    NotGeocodable,
}

impl CleanedAddress {
    /// Builds the free-form geocoder query, appending `city_suffix`
    /// (e.g. `", St. Paul, MN"`).
    #[must_use]
    pub fn to_query(&self, city_suffix: &str) -> Option<String> {
        match self {
            Self::Street(street) => Some(format!("{street}{city_suffix}")),
            Self::Intersection { street1, street2 } => {
                Some(format!("{street1} & {street2}{city_suffix}"))
            }
            Self::NotGeocodable => None,
        }
    }
}

/// Cleans and normalizes a block address for geocoding.
#[must_use]
pub fn clean_block_address(raw: &str) -> CleanedAddress {
    let addr = WHITESPACE_RE
        .replace_all(raw.trim(), " ")
        .to_uppercase();

    if addr.is_empty() || SKIP_PATTERNS.iter().any(|p| addr == *p) {
        return CleanedAddress::NotGeocodable;
    }

    let addr = DIRECTION_SUFFIX_RE.replace_all(&addr, "").to_string();

    for sep in [" & ", " AND ", " / "] {
        if let Some(idx) = addr.find(sep) {
            let street1 = unmask_house_number(addr[..idx].trim());
            let street2 = unmask_house_number(addr[idx + sep.len()..].trim());
            if !street1.is_empty() && !street2.is_empty() {
                return CleanedAddress::Intersection { street1, street2 };
            }
        }
    }

    let addr = unmask_house_number(&addr);
    if addr.is_empty() {
        return CleanedAddress::NotGeocodable;
    }

    CleanedAddress::Street(addr)
}

/// Replaces masked house-number digits with zeros: `"98X"` → `"980"`,
/// `"XX00"` → `"100"`.
fn unmask_house_number(addr: &str) -> String {
    let addr = TRAILING_X_RE.replace(addr, |caps: &Captures<'_>| {
        format!("{}{}", &caps[1], "0".repeat(caps[2].len()))
    });
    let addr = LEADING_X_RE.replace(&addr, "1$1");
    addr.trim().to_string()
}

/// Normalizes free text into a cache key: trimmed, lowercased, single
/// spaces.
#[must_use]
pub fn normalize_key(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unmasks_trailing_x() {
        assert_eq!(
            clean_block_address("98X UNIVERSITY AV W"),
            CleanedAddress::Street("980 UNIVERSITY AV W".to_string())
        );
        assert_eq!(
            clean_block_address("17xx  grand av"),
            CleanedAddress::Street("1700 GRAND AV".to_string())
        );
    }

    #[test]
    fn unmasks_leading_x() {
        assert_eq!(
            clean_block_address("XX00 MAIN ST"),
            CleanedAddress::Street("100 MAIN ST".to_string())
        );
    }

    #[test]
    fn leaves_street_names_with_x_alone() {
        assert_eq!(
            clean_block_address("4XX EXCHANGE ST N"),
            CleanedAddress::Street("400 EXCHANGE ST N".to_string())
        );
    }

    #[test]
    fn detects_intersection() {
        assert_eq!(
            clean_block_address("SNELLING AV N & UNIVERSITY AV W"),
            CleanedAddress::Intersection {
                street1: "SNELLING AV N".to_string(),
                street2: "UNIVERSITY AV W".to_string(),
            }
        );
    }

    #[test]
    fn strips_direction_suffixes() {
        assert_eq!(
            clean_block_address("I94 WB"),
            CleanedAddress::Street("I94".to_string())
        );
    }

    #[test]
    fn skips_unknown_and_empty() {
        assert_eq!(clean_block_address("UNKNOWN"), CleanedAddress::NotGeocodable);
        assert_eq!(clean_block_address("   "), CleanedAddress::NotGeocodable);
    }

    #[test]
    fn builds_queries_with_city_suffix() {
        let suffix = ", St. Paul, MN";
        assert_eq!(
            clean_block_address("98X UNIVERSITY AV W").to_query(suffix),
            Some("980 UNIVERSITY AV W, St. Paul, MN".to_string())
        );
        assert_eq!(
            clean_block_address("A ST & B ST").to_query(suffix),
            Some("A ST & B ST, St. Paul, MN".to_string())
        );
        assert_eq!(CleanedAddress::NotGeocodable.to_query(suffix), None);
    }

    #[test]
    fn normalizes_cache_keys() {
        assert_eq!(normalize_key("  980 University  AV W "), "980 university av w");
    }
}
