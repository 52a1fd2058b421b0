#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions)]

//! Normalized incident query descriptor.
//!
//! [`IncidentQuery`] is the single shape every incident fetch is reduced
//! to, whether it arrives as REST query parameters or is resolved from the
//! explorer's filter state. Set-valued dimensions are `BTreeSet`s so the
//! descriptor is duplicate-free and order-independent by construction.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Result cap applied when no valid limit is supplied.
pub const DEFAULT_LIMIT: u32 = 1000;

/// Parameters for querying incidents.
///
/// An empty set means "no restriction on this dimension", never "match
/// nothing".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentQuery {
    /// Inclusive lower date bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end_date: Option<NaiveDate>,
    /// Incident codes to include.
    pub codes: BTreeSet<i32>,
    /// Police grids to include.
    pub grids: BTreeSet<i32>,
    /// Neighborhood numbers to include.
    pub neighborhoods: BTreeSet<i32>,
    /// Maximum number of rows returned, most recent first.
    pub limit: u32,
}

impl Default for IncidentQuery {
    fn default() -> Self {
        Self {
            start_date: None,
            end_date: None,
            codes: BTreeSet::new(),
            grids: BTreeSet::new(),
            neighborhoods: BTreeSet::new(),
            limit: DEFAULT_LIMIT,
        }
    }
}

impl IncidentQuery {
    /// Returns whether the given record fields satisfy every dimension of
    /// this query (ignoring the limit).
    #[must_use]
    pub fn matches(&self, date: NaiveDate, code: i32, grid: i32, neighborhood: i32) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
            && (self.codes.is_empty() || self.codes.contains(&code))
            && (self.grids.is_empty() || self.grids.contains(&grid))
            && (self.neighborhoods.is_empty() || self.neighborhoods.contains(&neighborhood))
    }
}

/// Normalizes a requested limit: missing, zero, or negative values fall
/// back to [`DEFAULT_LIMIT`]; values beyond `u32::MAX` saturate.
#[must_use]
pub fn effective_limit(requested: Option<i64>) -> u32 {
    match requested {
        Some(n) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX),
        _ => DEFAULT_LIMIT,
    }
}

/// Parses a raw `limit` parameter. Anything that is not a positive
/// integer yields [`DEFAULT_LIMIT`].
#[must_use]
pub fn parse_limit(raw: Option<&str>) -> u32 {
    effective_limit(raw.and_then(|s| s.trim().parse::<i64>().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_limits_fall_back_to_default() {
        assert_eq!(effective_limit(None), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(0)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(-5)), DEFAULT_LIMIT);
        assert_eq!(effective_limit(Some(25)), 25);
        assert_eq!(parse_limit(Some("abc")), DEFAULT_LIMIT);
        assert_eq!(parse_limit(Some(" 50 ")), 50);
        assert_eq!(parse_limit(None), DEFAULT_LIMIT);
    }

    #[test]
    fn empty_dimensions_do_not_restrict() {
        let query = IncidentQuery::default();
        let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
        assert!(query.matches(date, 110, 87, 14));
    }

    #[test]
    fn dimensions_are_conjunctive_and_bounds_inclusive() {
        let query = IncidentQuery {
            start_date: NaiveDate::from_ymd_opt(2023, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2023, 1, 31),
            codes: BTreeSet::from([110, 600]),
            neighborhoods: BTreeSet::from([11, 14]),
            ..IncidentQuery::default()
        };
        let jan_31 = NaiveDate::from_ymd_opt(2023, 1, 31).unwrap();
        let feb_1 = NaiveDate::from_ymd_opt(2023, 2, 1).unwrap();

        assert!(query.matches(jan_31, 600, 1, 14));
        assert!(!query.matches(feb_1, 600, 1, 14));
        assert!(!query.matches(jan_31, 700, 1, 14));
        assert!(!query.matches(jan_31, 600, 1, 5));
    }

    #[test]
    fn descriptor_serializes_sets_sorted() {
        let query = IncidentQuery {
            codes: [600, 110, 600].into_iter().collect(),
            ..IncidentQuery::default()
        };
        let json = serde_json::to_value(&query).unwrap();
        assert_eq!(json["codes"], serde_json::json!([110, 600]));
        assert_eq!(json["limit"], 1000);
    }
}
