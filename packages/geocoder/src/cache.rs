//! Bounded LRU cache for geocoding lookups.
//!
//! [`CachedGeocoder`] wraps any [`Geocoder`] and remembers both hits and
//! misses (a `None` result is a valid answer) keyed by normalized query
//! text. Transport errors are never cached.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use async_trait::async_trait;
use crime_browser_geography_models::{BoundingBox, LatLng};
use lru::LruCache;

use crate::address::normalize_key;
use crate::{GeocodeError, GeocodeResult, Geocoder};

/// A [`Geocoder`] wrapper that caches results in bounded LRU maps.
pub struct CachedGeocoder<G> {
    inner: G,
    searches: Mutex<LruCache<String, Option<GeocodeResult>>>,
    reverses: Mutex<LruCache<String, Option<String>>>,
}

impl<G: Geocoder> CachedGeocoder<G> {
    /// Wraps `inner` with caches of `capacity` entries each (minimum 1).
    #[must_use]
    pub fn new(inner: G, capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            inner,
            searches: Mutex::new(LruCache::new(capacity)),
            reverses: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Returns the wrapped geocoder.
    #[must_use]
    pub const fn inner(&self) -> &G {
        &self.inner
    }
}

fn search_key(text: &str, bounds: Option<&BoundingBox>) -> String {
    let text = normalize_key(text);
    bounds.map_or_else(|| text.clone(), |b| {
        format!(
            "{text}|{:.5},{:.5},{:.5},{:.5}",
            b.west, b.south, b.east, b.north
        )
    })
}

#[async_trait]
impl<G: Geocoder> Geocoder for CachedGeocoder<G> {
    async fn search(
        &self,
        text: &str,
        bounds: Option<&BoundingBox>,
    ) -> Result<Option<GeocodeResult>, GeocodeError> {
        let key = search_key(text, bounds);
        if let Some(hit) = self.searches.lock().ok().and_then(|mut c| c.get(&key).cloned()) {
            log::debug!("Geocode cache hit for '{key}'");
            return Ok(hit);
        }

        let result = self.inner.search(text, bounds).await?;
        if let Ok(mut cache) = self.searches.lock() {
            cache.put(key, result.clone());
        }
        Ok(result)
    }

    async fn reverse(&self, point: LatLng) -> Result<Option<String>, GeocodeError> {
        let key = format!("{:.6},{:.6}", point.lat, point.lng);
        if let Some(hit) = self.reverses.lock().ok().and_then(|mut c| c.get(&key).cloned()) {
            return Ok(hit);
        }

        let result = self.inner.reverse(point).await?;
        if let Ok(mut cache) = self.reverses.lock() {
            cache.put(key, result.clone());
        }
        Ok(result)
    }
}
