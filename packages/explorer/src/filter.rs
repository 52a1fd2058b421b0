//! Filter resolution.
//!
//! Combines the independent filter dimensions held in [`FilterState`]
//! into one normalized [`IncidentQuery`]. The effective neighborhood
//! filter is always a subset of the visible neighborhoods: a neighborhood
//! that is not on screen never contributes results, whatever the manual
//! selection says.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use crime_browser_database_models::{DEFAULT_LIMIT, IncidentQuery, effective_limit};

use crate::catalog::Catalog;

/// Client-side filter state. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterState {
    /// Incident type names chosen by the user.
    pub selected_types: BTreeSet<String>,
    /// Neighborhood ids chosen by the user.
    pub selected_neighborhoods: BTreeSet<i32>,
    /// Inclusive lower date bound.
    pub start_date: Option<NaiveDate>,
    /// Inclusive upper date bound.
    pub end_date: Option<NaiveDate>,
    /// Requested result cap. Zero falls back to [`DEFAULT_LIMIT`].
    pub limit: u32,
    /// Neighborhoods whose anchors are inside the current viewport.
    pub visible_neighborhoods: BTreeSet<i32>,
}

impl Default for FilterState {
    fn default() -> Self {
        Self {
            selected_types: BTreeSet::new(),
            selected_neighborhoods: BTreeSet::new(),
            start_date: None,
            end_date: None,
            limit: DEFAULT_LIMIT,
            visible_neighborhoods: BTreeSet::new(),
        }
    }
}

/// Union of the codes of every selected type.
///
/// An empty result means "no code restriction". Type names unknown to the
/// catalog contribute nothing.
#[must_use]
pub fn effective_codes(selected_types: &BTreeSet<String>, catalog: &Catalog) -> BTreeSet<i32> {
    let mut codes = BTreeSet::new();
    for name in selected_types {
        match catalog.codes_for_type(name) {
            Some(type_codes) => codes.extend(type_codes.iter().copied()),
            None => log::warn!("Selected incident type '{name}' is not in the catalog"),
        }
    }
    codes
}

/// The neighborhoods results may come from: `selection ∩ visible`, or all
/// of `visible` when nothing is selected.
#[must_use]
pub fn effective_neighborhoods(
    selected: &BTreeSet<i32>,
    visible: &BTreeSet<i32>,
) -> BTreeSet<i32> {
    if selected.is_empty() {
        visible.clone()
    } else {
        selected.intersection(visible).copied().collect()
    }
}

/// Resolves the filter state into a query descriptor.
///
/// Returns `None` when the effective neighborhood set is empty, or when
/// types are selected but none of them has a code in the catalog. An empty
/// set in an [`IncidentQuery`] would instead mean "no restriction".
#[must_use]
pub fn resolve(state: &FilterState, catalog: &Catalog) -> Option<IncidentQuery> {
    let neighborhoods =
        effective_neighborhoods(&state.selected_neighborhoods, &state.visible_neighborhoods);
    if neighborhoods.is_empty() {
        log::debug!("No visible neighborhood matches the selection; skipping fetch");
        return None;
    }

    let codes = effective_codes(&state.selected_types, catalog);
    if codes.is_empty() && !state.selected_types.is_empty() {
        log::debug!("No selected incident type has a catalog code; skipping fetch");
        return None;
    }

    Some(IncidentQuery {
        start_date: state.start_date,
        end_date: state.end_date,
        codes,
        grids: BTreeSet::new(),
        neighborhoods,
        limit: effective_limit(Some(i64::from(state.limit))),
    })
}
