//! The ordered refresh pipeline.
//!
//! Every triggering event runs the same fixed sequence of stages:
//! viewport sync, filter resolution, fetch, projection. Fetches are
//! tagged with a monotonically increasing sequence number; a response is
//! applied only if no newer response has been applied already, so the
//! last issued request always wins regardless of completion order.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use crime_browser_database_models::IncidentQuery;
use crime_browser_geocoder::Geocoder;
use crime_browser_geocoder::address::clean_block_address;
use crime_browser_geography_models::{BoundingBox, LatLng};
use crime_browser_incident_models::{IncidentRecord, IncidentSubmission, ValidationError};

use crate::api::{ApiError, IncidentApi};
use crate::catalog::Catalog;
use crate::filter::{FilterState, resolve};
use crate::projector::{Projection, project};
use crate::region::Region;
use crate::viewport::{ViewportChange, visible_neighborhoods};

/// Independent channels of user-visible status text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StatusChannel {
    /// Incident fetches triggered by filter or viewport changes.
    Fetch,
    /// Incident creation and removal.
    Mutation,
    /// Address search, locate, and reverse lookups.
    Geocode,
}

/// A change to one filter dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterChange {
    /// Replace the selected incident types.
    Types(BTreeSet<String>),
    /// Replace the selected neighborhoods.
    Neighborhoods(BTreeSet<i32>),
    /// Replace both date bounds.
    DateRange {
        /// Inclusive lower bound.
        start: Option<NaiveDate>,
        /// Inclusive upper bound.
        end: Option<NaiveDate>,
    },
    /// Replace the result cap.
    Limit(u32),
}

/// Events pushed into the explorer by the presentation layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ExplorerEvent {
    /// The map viewport moved.
    Viewport(ViewportChange),
    /// A filter control changed.
    Filter(FilterChange),
}

/// A fetch to perform, tagged with its sequence number.
///
/// `query` is `None` when the filter excludes every neighborhood; the
/// result is then empty without contacting the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefreshRequest {
    /// Sequence number, increasing with every issued request.
    pub seq: u64,
    /// Resolved descriptor, if any neighborhood is in scope.
    pub query: Option<IncidentQuery>,
}

/// What happened to a completed fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response replaced the current result set (or its error status
    /// was recorded).
    Applied,
    /// A newer response had already been applied; this one was dropped.
    Stale,
}

/// Client-side incident explorer state.
pub struct Explorer {
    catalog: Catalog,
    region: Region,
    filter: FilterState,
    viewport: BoundingBox,
    projection: Projection,
    next_seq: u64,
    applied_seq: u64,
    status: BTreeMap<StatusChannel, String>,
}

impl Explorer {
    /// Creates an explorer showing the region's initial viewport.
    #[must_use]
    pub fn new(catalog: Catalog, region: Region) -> Self {
        let viewport = region.initial_viewport();
        let filter = FilterState {
            visible_neighborhoods: visible_neighborhoods(&viewport, &region.anchors),
            ..FilterState::default()
        };

        Self {
            catalog,
            region,
            filter,
            viewport,
            projection: Projection::default(),
            next_seq: 0,
            applied_seq: 0,
            status: BTreeMap::new(),
        }
    }

    /// Loads the reference catalog from `api` and creates an explorer.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError`] if either catalog table cannot be listed.
    pub async fn load<A: IncidentApi + ?Sized>(api: &A, region: Region) -> Result<Self, ApiError> {
        let codes = api.list_codes(&BTreeSet::new()).await?;
        let neighborhoods = api.list_neighborhoods(&BTreeSet::new()).await?;
        log::info!(
            "Loaded catalog: {} codes, {} neighborhoods",
            codes.len(),
            neighborhoods.len()
        );
        Ok(Self::new(Catalog::new(codes, neighborhoods), region))
    }

    /// Reference catalog.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Region configuration.
    #[must_use]
    pub const fn region(&self) -> &Region {
        &self.region
    }

    /// Current filter state.
    #[must_use]
    pub const fn filter(&self) -> &FilterState {
        &self.filter
    }

    /// Current viewport.
    #[must_use]
    pub const fn viewport(&self) -> &BoundingBox {
        &self.viewport
    }

    /// Currently displayed result set.
    #[must_use]
    pub const fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Status text for `channel`, if an error is outstanding.
    #[must_use]
    pub fn status(&self, channel: StatusChannel) -> Option<&str> {
        self.status.get(&channel).map(String::as_str)
    }

    fn set_error(&mut self, channel: StatusChannel, error: &ApiError) {
        log::error!("{channel:?} failed: {error}");
        self.status.insert(channel, error.to_string());
    }

    fn clear_status(&mut self, channel: StatusChannel) {
        self.status.remove(&channel);
    }

    fn next_request(&mut self) -> RefreshRequest {
        self.next_seq += 1;
        RefreshRequest {
            seq: self.next_seq,
            query: resolve(&self.filter, &self.catalog),
        }
    }

    /// Request for the initial result set.
    pub fn initial_request(&mut self) -> RefreshRequest {
        self.next_request()
    }

    /// Applies an event and returns the fetch it requires, if any.
    ///
    /// Viewport changes update the visible set before anything else reads
    /// it. A [`crate::viewport::ViewportCause::ProgrammaticRecenter`]
    /// stops there and returns `None`.
    pub fn handle(&mut self, event: ExplorerEvent) -> Option<RefreshRequest> {
        match event {
            ExplorerEvent::Viewport(change) => {
                self.viewport = change.bounds;
                self.filter.visible_neighborhoods =
                    visible_neighborhoods(&change.bounds, &self.region.anchors);
                if !change.refetches() {
                    log::debug!("Viewport recentered for display; keeping current results");
                    return None;
                }
            }
            ExplorerEvent::Filter(change) => match change {
                FilterChange::Types(types) => self.filter.selected_types = types,
                FilterChange::Neighborhoods(ids) => self.filter.selected_neighborhoods = ids,
                FilterChange::DateRange { start, end } => {
                    self.filter.start_date = start;
                    self.filter.end_date = end;
                }
                FilterChange::Limit(limit) => self.filter.limit = limit,
            },
        }

        Some(self.next_request())
    }

    /// Applies the result of fetch `seq`.
    ///
    /// Responses older than the last applied one are dropped. An error
    /// keeps the current result set and replaces the fetch status text; a
    /// success clears it.
    pub fn complete(
        &mut self,
        seq: u64,
        result: Result<Vec<IncidentRecord>, ApiError>,
    ) -> RefreshOutcome {
        if seq <= self.applied_seq {
            log::debug!(
                "Dropping stale response {seq} (already applied {})",
                self.applied_seq
            );
            return RefreshOutcome::Stale;
        }
        self.applied_seq = seq;

        match result {
            Ok(rows) => {
                self.projection = project(rows, &self.catalog);
                self.clear_status(StatusChannel::Fetch);
                log::debug!(
                    "Applied response {seq}: {} incidents",
                    self.projection.incidents.len()
                );
            }
            Err(e) => self.set_error(StatusChannel::Fetch, &e),
        }

        RefreshOutcome::Applied
    }

    /// Performs `request` against `api` and applies the result.
    pub async fn refresh<A: IncidentApi + ?Sized>(
        &mut self,
        api: &A,
        request: RefreshRequest,
    ) -> RefreshOutcome {
        let result = match &request.query {
            Some(query) => api.fetch_incidents(query).await,
            None => Ok(Vec::new()),
        };
        self.complete(request.seq, result)
    }

    /// Handles `event` and, when it requires one, runs the fetch.
    pub async fn dispatch<A: IncidentApi + ?Sized>(
        &mut self,
        api: &A,
        event: ExplorerEvent,
    ) -> Option<RefreshOutcome> {
        let request = self.handle(event)?;
        Some(self.refresh(api, request).await)
    }

    /// Geocodes a displayed incident's block and recenters the map on it
    /// without changing the result set.
    ///
    /// Returns the located point, or `None` when the block cannot be
    /// geocoded or the geocoder has no match.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if `case_number` is not displayed,
    /// or [`ApiError::Geocode`] if the geocoder fails.
    pub async fn locate_incident<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        case_number: &str,
    ) -> Result<Option<LatLng>, ApiError> {
        let Some(block) = self
            .projection
            .incidents
            .iter()
            .find(|i| i.record.case_number == case_number)
            .map(|i| i.record.block.clone())
        else {
            return Err(ApiError::NotFound {
                case_number: case_number.to_string(),
            });
        };

        let Some(query) = clean_block_address(&block).to_query(&self.region.geocode_suffix) else {
            log::warn!("Block '{block}' of case {case_number} is not geocodable");
            self.clear_status(StatusChannel::Geocode);
            return Ok(None);
        };

        let Some(location) = self.search(geocoder, &query).await? else {
            return Ok(None);
        };

        let bounds = self.region.locate_viewport(location);
        let request = self.handle(ExplorerEvent::Viewport(ViewportChange::recenter(bounds)));
        debug_assert!(request.is_none());
        Ok(Some(location))
    }

    /// Geocodes free text and pans the map there as a user navigation.
    ///
    /// Returns the fetch the new viewport requires, or `None` when the
    /// geocoder has no match.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Geocode`] if the geocoder fails.
    pub async fn go_to_address<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        text: &str,
    ) -> Result<Option<RefreshRequest>, ApiError> {
        let Some(location) = self.search(geocoder, text).await? else {
            return Ok(None);
        };
        let bounds = self.region.locate_viewport(location);
        Ok(self.handle(ExplorerEvent::Viewport(ViewportChange::user_pan(bounds))))
    }

    /// Looks up a label for a map point, e.g. to prefill a block address.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Geocode`] if the geocoder fails.
    pub async fn reverse_label<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        point: LatLng,
    ) -> Result<Option<String>, ApiError> {
        match geocoder.reverse(point).await {
            Ok(label) => {
                self.clear_status(StatusChannel::Geocode);
                Ok(label)
            }
            Err(e) => {
                let e = ApiError::from(e);
                self.set_error(StatusChannel::Geocode, &e);
                Err(e)
            }
        }
    }

    async fn search<G: Geocoder + ?Sized>(
        &mut self,
        geocoder: &G,
        text: &str,
    ) -> Result<Option<LatLng>, ApiError> {
        match geocoder.search(text, Some(&self.region.bounds)).await {
            Ok(found) => {
                self.clear_status(StatusChannel::Geocode);
                if found.is_none() {
                    log::info!("No geocoder match for '{text}'");
                }
                Ok(found.map(|r| r.location))
            }
            Err(e) => {
                let e = ApiError::from(e);
                self.set_error(StatusChannel::Geocode, &e);
                Err(e)
            }
        }
    }

    /// Validates and submits a new incident, then returns the refresh that
    /// shows it.
    ///
    /// Validation runs before any network call.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for incomplete input, or the
    /// server's rejection (e.g. [`ApiError::DuplicateKey`]).
    pub async fn submit_incident<A: IncidentApi + ?Sized>(
        &mut self,
        api: &A,
        submission: &IncidentSubmission,
    ) -> Result<RefreshRequest, ApiError> {
        let result = match submission.validate() {
            Ok(record) => api.create_incident(&record).await,
            Err(e) => Err(e.into()),
        };
        self.finish_mutation(result)
    }

    /// Removes an incident, then returns the refresh that hides it.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Validation`] for a blank case number, or the
    /// server's rejection (e.g. [`ApiError::NotFound`]).
    pub async fn remove_incident<A: IncidentApi + ?Sized>(
        &mut self,
        api: &A,
        case_number: &str,
    ) -> Result<RefreshRequest, ApiError> {
        let case_number = case_number.trim();
        let result = if case_number.is_empty() {
            Err(ValidationError::MissingFields {
                missing: vec!["case_number"],
            }
            .into())
        } else {
            api.delete_incident(case_number).await
        };
        self.finish_mutation(result)
    }

    fn finish_mutation(&mut self, result: Result<(), ApiError>) -> Result<RefreshRequest, ApiError> {
        match result {
            Ok(()) => {
                self.clear_status(StatusChannel::Mutation);
                Ok(self.next_request())
            }
            Err(e) => {
                self.set_error(StatusChannel::Mutation, &e);
                Err(e)
            }
        }
    }
}
