//! Viewport sync: which neighborhoods are on screen.
//!
//! A neighborhood is visible when its anchor point lies inside the
//! current viewport. The visible set must be recomputed before the filter
//! is resolved, on every viewport change.

use std::collections::BTreeSet;

use crime_browser_geography_models::{BoundingBox, NeighborhoodAnchor};

/// Why the viewport moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewportCause {
    /// The user panned, zoomed, or navigated to a searched address. The
    /// result set follows the new viewport.
    UserPan,
    /// The map was recentered to display a specific incident. The visible
    /// set is updated but the result set is left untouched.
    ProgrammaticRecenter,
}

/// A viewport change event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportChange {
    /// New visible region.
    pub bounds: BoundingBox,
    /// What triggered the change.
    pub cause: ViewportCause,
}

impl ViewportChange {
    /// A user-driven change.
    #[must_use]
    pub const fn user_pan(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            cause: ViewportCause::UserPan,
        }
    }

    /// A display-only recenter.
    #[must_use]
    pub const fn recenter(bounds: BoundingBox) -> Self {
        Self {
            bounds,
            cause: ViewportCause::ProgrammaticRecenter,
        }
    }

    /// Whether this change should trigger a re-fetch.
    #[must_use]
    pub const fn refetches(&self) -> bool {
        matches!(self.cause, ViewportCause::UserPan)
    }
}

/// Returns the ids of every neighborhood whose anchor lies in `bounds`.
#[must_use]
pub fn visible_neighborhoods(bounds: &BoundingBox, anchors: &[NeighborhoodAnchor]) -> BTreeSet<i32> {
    anchors
        .iter()
        .filter(|a| bounds.contains(a.position()))
        .map(|a| a.id)
        .collect()
}
