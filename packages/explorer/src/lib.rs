#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Client core of the crime browser.
//!
//! Turns viewport and filter events into one deterministic result set:
//!
//! 1. [`viewport`] recomputes which neighborhoods are on screen
//! 2. [`filter`] resolves the selections into an
//!    [`crime_browser_database_models::IncidentQuery`]
//! 3. an [`api::IncidentApi`] fetches matching records
//! 4. [`projector`] enriches rows and tallies per-neighborhood counts
//!
//! [`pipeline::Explorer`] runs these stages in order on every event and
//! applies responses latest-wins.

pub mod api;
pub mod catalog;
pub mod filter;
pub mod http;
pub mod pipeline;
pub mod projector;
pub mod region;
pub mod viewport;

pub use api::{ApiError, IncidentApi};
pub use catalog::Catalog;
pub use pipeline::{Explorer, ExplorerEvent, FilterChange, RefreshOutcome, StatusChannel};
pub use region::Region;
pub use viewport::{ViewportCause, ViewportChange};
