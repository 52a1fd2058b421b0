//! Client commands that drive the explorer pipeline against a server.

use chrono::NaiveDate;
use clap::Args;
use crime_browser_cli_utils::{MultiProgress, spinner};
use crime_browser_explorer::http::HttpIncidentApi;
use crime_browser_explorer::{
    Explorer, ExplorerEvent, FilterChange, Region, StatusChannel, ViewportChange,
};
use crime_browser_geocoder::address::clean_block_address;
use crime_browser_geocoder::cache::CachedGeocoder;
use crime_browser_geocoder::nominatim::NominatimClient;
use crime_browser_geocoder::service::GeocodingService;
use crime_browser_geocoder::Geocoder as _;
use crime_browser_geography_models::{BoundingBox, LatLng};

/// Filter flags shared by `query` and `locate`.
#[derive(Debug, Clone, Args)]
pub struct FilterArgs {
    /// Server base URL
    #[arg(long, default_value = crate::DEFAULT_SERVER)]
    pub server: String,
    /// Viewport as `west,south,east,north` (default: the whole city)
    #[arg(long, value_parser = crate::parse_bbox, allow_hyphen_values = true)]
    pub bbox: Option<BoundingBox>,
    /// Incident type names to include
    #[arg(long, value_delimiter = ',')]
    pub types: Vec<String>,
    /// Neighborhood numbers to include (clipped to the viewport)
    #[arg(long, value_delimiter = ',')]
    pub neighborhoods: Vec<i32>,
    /// Inclusive start date, `YYYY-MM-DD`
    #[arg(long, value_parser = crate::parse_date)]
    pub start: Option<NaiveDate>,
    /// Inclusive end date, `YYYY-MM-DD`
    #[arg(long, value_parser = crate::parse_date)]
    pub end: Option<NaiveDate>,
    /// Maximum number of incidents (default 1000)
    #[arg(long)]
    pub limit: Option<u32>,
}

impl FilterArgs {
    /// Events that bring a fresh explorer to this filter state, viewport
    /// first.
    fn events(&self) -> Vec<ExplorerEvent> {
        let mut events = Vec::new();
        if let Some(bbox) = self.bbox {
            events.push(ExplorerEvent::Viewport(ViewportChange::user_pan(bbox)));
        }
        if !self.types.is_empty() {
            events.push(ExplorerEvent::Filter(FilterChange::Types(
                self.types.iter().cloned().collect(),
            )));
        }
        if !self.neighborhoods.is_empty() {
            events.push(ExplorerEvent::Filter(FilterChange::Neighborhoods(
                self.neighborhoods.iter().copied().collect(),
            )));
        }
        if self.start.is_some() || self.end.is_some() {
            events.push(ExplorerEvent::Filter(FilterChange::DateRange {
                start: self.start,
                end: self.end,
            }));
        }
        if let Some(limit) = self.limit {
            events.push(ExplorerEvent::Filter(FilterChange::Limit(limit)));
        }
        events
    }
}

/// Loads the catalog, applies the filter, and runs the one fetch it needs.
async fn explore(
    multi: &MultiProgress,
    api: &HttpIncidentApi,
    filter: &FilterArgs,
) -> Result<Explorer, Box<dyn std::error::Error>> {
    let bar = spinner(multi, &format!("Querying {}", filter.server));
    let mut explorer = Explorer::load(api, Region::saint_paul()).await?;

    let mut request = explorer.initial_request();
    for event in filter.events() {
        if let Some(next) = explorer.handle(event) {
            request = next;
        }
    }
    explorer.refresh(api, request).await;
    bar.finish_and_clear();

    if let Some(error) = explorer.status(StatusChannel::Fetch) {
        return Err(error.to_string().into());
    }
    Ok(explorer)
}

fn print_visible(explorer: &Explorer) {
    let names: Vec<String> = explorer
        .filter()
        .visible_neighborhoods
        .iter()
        .map(|id| {
            explorer
                .catalog()
                .neighborhood_name(*id)
                .map_or_else(|| id.to_string(), |name| format!("{id} {name}"))
        })
        .collect();
    println!("Visible neighborhoods: {}", names.join(", "));
}

/// `crime_browser query`
pub async fn query(
    multi: &MultiProgress,
    filter: &FilterArgs,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpIncidentApi::new(&filter.server)?;
    let explorer = explore(multi, &api, filter).await?;
    let projection = explorer.projection();

    if json {
        println!("{}", serde_json::to_string_pretty(&projection.incidents)?);
        return Ok(());
    }

    print_visible(&explorer);
    println!();
    println!(
        "{:<10} {:<8} {:<12} {:<28} {:<24} {:<9} BLOCK",
        "DATE", "TIME", "CASE", "TYPE", "NEIGHBORHOOD", "CATEGORY"
    );
    println!("{}", "-".repeat(120));
    for incident in &projection.incidents {
        println!(
            "{:<10} {:<8} {:<12} {:<28} {:<24} {:<9} {}",
            incident.record.date,
            incident.record.time,
            incident.record.case_number,
            incident.incident_type,
            incident.neighborhood_name,
            incident.category,
            incident.record.block
        );
    }

    println!("\n{} incident(s)", projection.incidents.len());
    for (id, count) in &projection.counts {
        let name = explorer.catalog().neighborhood_name(*id).unwrap_or("?");
        println!("  {id:>3} {name:<28} {count}");
    }
    Ok(())
}

fn geocoder() -> Result<CachedGeocoder<NominatimClient>, Box<dyn std::error::Error>> {
    let service = GeocodingService::nominatim();
    let client = NominatimClient::new(&service)?;
    Ok(CachedGeocoder::new(client, service.cache_capacity))
}

/// `crime_browser locate`
pub async fn locate(
    multi: &MultiProgress,
    filter: &FilterArgs,
    case_number: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let api = HttpIncidentApi::new(&filter.server)?;
    let mut explorer = explore(multi, &api, filter).await?;

    let bar = spinner(multi, &format!("Locating case {case_number}"));
    let located = explorer.locate_incident(&geocoder()?, case_number).await;
    bar.finish_and_clear();

    match located? {
        Some(point) => {
            println!("Case {case_number} is near {:.6}, {:.6}", point.lat, point.lng);
            let v = explorer.viewport();
            println!(
                "Viewport recentered to {:.6},{:.6},{:.6},{:.6}",
                v.west, v.south, v.east, v.north
            );
            print_visible(&explorer);
            println!(
                "Result set unchanged: {} incident(s)",
                explorer.projection().incidents.len()
            );
        }
        None => println!("No location found for case {case_number}"),
    }
    Ok(())
}

/// `crime_browser geocode`
pub async fn geocode(
    multi: &MultiProgress,
    text: Option<&str>,
    reverse: Option<LatLng>,
) -> Result<(), Box<dyn std::error::Error>> {
    let service = GeocodingService::nominatim();
    let geocoder = geocoder()?;

    if let Some(point) = reverse {
        let bar = spinner(multi, "Reverse geocoding");
        let label = geocoder.reverse(point).await;
        bar.finish_and_clear();
        match label? {
            Some(label) => println!("{label}"),
            None => println!("No address found at {}, {}", point.lat, point.lng),
        }
        return Ok(());
    }

    let Some(text) = text else {
        return Err("either an address or --reverse is required".into());
    };
    let query = clean_block_address(text)
        .to_query(&service.city_suffix)
        .unwrap_or_else(|| text.to_string());
    let bounds = Region::saint_paul().bounds;

    let bar = spinner(multi, &format!("Geocoding '{query}'"));
    let found = geocoder.search(&query, Some(&bounds)).await;
    bar.finish_and_clear();
    match found? {
        Some(result) => println!(
            "{:.6}, {:.6}  {}",
            result.location.lat, result.location.lng, result.label
        ),
        None => println!("No match for '{query}'"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;

    fn args() -> FilterArgs {
        FilterArgs {
            server: crate::DEFAULT_SERVER.to_string(),
            bbox: None,
            types: Vec::new(),
            neighborhoods: Vec::new(),
            start: None,
            end: None,
            limit: None,
        }
    }

    #[test]
    fn no_flags_means_no_events() {
        assert!(args().events().is_empty());
    }

    #[test]
    fn viewport_event_comes_first() {
        let filter = FilterArgs {
            bbox: BoundingBox::parse("-93.2,44.9,-93.1,45.0"),
            neighborhoods: vec![11],
            types: vec!["Theft".to_string()],
            ..args()
        };
        let events = filter.events();
        assert_eq!(events.len(), 3);
        assert!(matches!(events[0], ExplorerEvent::Viewport(_)));
        assert_eq!(
            events[2],
            ExplorerEvent::Filter(FilterChange::Neighborhoods(BTreeSet::from([11])))
        );
    }
}
