pub mod yandex;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tracing::debug;

use crate::clock::Clock;

/// Current conditions at a point, as reported by the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub observed_at: DateTime<Utc>,
    /// Degrees Celsius
    pub temperature: i32,
    pub feels_like: i32,
    /// Provider condition code, e.g. "clear" or "light-snow"
    pub condition: String,
    /// Meters per second
    pub wind_speed: f64,
    /// Percent
    pub humidity: u8,
    pub pressure_mm: u32,
}

/// Upstream weather source.
#[async_trait]
pub trait WeatherFetcher: Send + Sync {
    async fn fetch(&self, api_key: &str, lat: f64, lon: f64) -> Result<WeatherSnapshot>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    snapshot: WeatherSnapshot,
    fetched_at: DateTime<Utc>,
}

impl CacheEntry {
    /// An entry fetched "in the future" (the clock stepped back since) is stale,
    /// since its real age cannot be known.
    fn is_fresh(&self, now: DateTime<Utc>, max_age: Duration) -> bool {
        match (now - self.fetched_at).to_std() {
            Ok(age) => age < max_age,
            Err(_) => false,
        }
    }
}

/// Exact coordinate key. No rounding, so 53.3 and 53.30000001 are different places.
type CoordKey = (u64, u64);

fn coord_key(lat: f64, lon: f64) -> CoordKey {
    (lat.to_bits(), lon.to_bits())
}

type Slot = Arc<Mutex<Option<CacheEntry>>>;

/// Read-through cache in front of a [`WeatherFetcher`].
///
/// Each coordinate pair owns a slot guarded by its own async lock, held across
/// the upstream fetch. Concurrent lookups for the same pair therefore wait for
/// the in-flight fetch and reuse its result instead of issuing their own.
pub struct WeatherCache {
    fetcher: Arc<dyn WeatherFetcher>,
    clock: Arc<dyn Clock>,
    slots: Mutex<HashMap<CoordKey, Slot>>,
}

impl WeatherCache {
    pub fn new(fetcher: Arc<dyn WeatherFetcher>, clock: Arc<dyn Clock>) -> Self {
        Self {
            fetcher,
            clock,
            slots: Mutex::new(HashMap::new()),
        }
    }

    async fn slot(&self, key: CoordKey) -> Slot {
        let mut slots = self.slots.lock().await;
        slots.entry(key).or_default().clone()
    }

    /// Return the snapshot for `(lat, lon)`, fetching only if there is no entry
    /// younger than `max_age`. Failed fetches are never cached.
    pub async fn get_weather(
        &self,
        api_key: &str,
        lat: f64,
        lon: f64,
        max_age: Duration,
    ) -> Result<WeatherSnapshot> {
        let slot = self.slot(coord_key(lat, lon)).await;
        let mut entry = slot.lock().await;

        let now = self.clock.now();
        if let Some(cached) = &*entry {
            if cached.is_fresh(now, max_age) {
                debug!("Weather cache hit for ({}, {})", lat, lon);
                return Ok(cached.snapshot.clone());
            }
        }

        debug!("Weather cache miss for ({}, {}), fetching", lat, lon);
        // Stale entries are never served, drop it before the fetch can fail.
        *entry = None;
        let snapshot = self.fetcher.fetch(api_key, lat, lon).await?;
        debug!("Fetched weather observed at {}", snapshot.observed_at);
        *entry = Some(CacheEntry {
            snapshot: snapshot.clone(),
            fetched_at: now,
        });
        Ok(snapshot)
    }

    /// Number of coordinate pairs currently holding an entry (fresh or not).
    #[cfg(test)]
    pub async fn cached_entries(&self) -> usize {
        let slots: Vec<Slot> = self.slots.lock().await.values().cloned().collect();
        let mut count = 0;
        for slot in slots {
            if slot.lock().await.is_some() {
                count += 1;
            }
        }
        count
    }
}
