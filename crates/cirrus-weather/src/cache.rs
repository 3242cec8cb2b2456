//! TTL cache with request coalescing.
//!
//! Fetches are keyed by quantized coordinates (plus unit for weather) and
//! stay valid for a stale window. A hit inside the window suppresses the
//! network call entirely; concurrent misses for the identical key are
//! coalesced into a single underlying fetch by a per-key guard held across
//! the fetch. Snapshots are immutable and replaced wholesale.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;

use crate::types::{Coordinates, TemperatureUnit, WeatherData};

/// Coordinates quantized to 4 decimal places for use in hash keys.
pub fn quantize(coord: f64) -> i64 {
    (coord * 10_000.0).round() as i64
}

/// Cache key for weather fetches: the unit is part of the key because the
/// fetched values are unit-baked.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WeatherKey {
    lat_q: i64,
    lon_q: i64,
    unit: TemperatureUnit,
}

impl WeatherKey {
    pub fn new(coords: &Coordinates, unit: TemperatureUnit) -> Self {
        Self {
            lat_q: quantize(coords.latitude),
            lon_q: quantize(coords.longitude),
            unit,
        }
    }
}

struct Entry<V> {
    value: V,
    fetched_at: Instant,
}

/// Generic single-flight TTL cache.
pub struct FetchCache<K, V> {
    ttl: Duration,
    entries: Mutex<HashMap<K, Entry<V>>>,
    guards: Mutex<HashMap<K, Arc<Mutex<()>>>>,
}

impl<K, V> FetchCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
            guards: Mutex::new(HashMap::new()),
        }
    }

    /// Value for `key` if it is still inside the stale window.
    pub async fn get_if_fresh(&self, key: &K) -> Option<V> {
        let entries = self.entries.lock().await;
        entries
            .get(key)
            .filter(|e| e.fetched_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Return the cached value or run `fetch` exactly once per key at a time.
    ///
    /// A second caller arriving while a fetch for the same key is in flight
    /// waits on the key guard and then reads the freshly stored snapshot
    /// instead of issuing its own call. Failed fetches store nothing, so the
    /// next caller retries.
    ///
    /// # Errors
    /// Propagates the fetch error unchanged.
    pub async fn get_or_fetch<E, F, Fut>(&self, key: K, fetch: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get_if_fresh(&key).await {
            tracing::debug!("Cache hit inside stale window");
            return Ok(value);
        }

        let guard = {
            let mut guards = self.guards.lock().await;
            guards
                .entry(key.clone())
                .or_insert_with(|| Arc::new(Mutex::new(())))
                .clone()
        };
        let _in_flight = guard.lock().await;

        // A coalesced waiter finds the snapshot the leader just stored
        if let Some(value) = self.get_if_fresh(&key).await {
            tracing::debug!("Coalesced onto in-flight fetch");
            return Ok(value);
        }

        let value = fetch().await?;
        self.entries.lock().await.insert(
            key,
            Entry {
                value: value.clone(),
                fetched_at: Instant::now(),
            },
        );
        Ok(value)
    }

    /// Drop one key.
    pub async fn invalidate(&self, key: &K) {
        self.entries.lock().await.remove(key);
    }

    /// Drop everything.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
        self.guards.lock().await.clear();
    }
}

pub type WeatherCache = FetchCache<WeatherKey, WeatherData>;

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn key(lat: f64, lon: f64, unit: TemperatureUnit) -> WeatherKey {
        WeatherKey::new(&Coordinates::new(lat, lon).unwrap(), unit)
    }

    #[test]
    fn test_key_includes_unit() {
        assert_ne!(
            key(52.52, 13.405, TemperatureUnit::Celsius),
            key(52.52, 13.405, TemperatureUnit::Fahrenheit)
        );
    }

    #[test]
    fn test_key_quantizes_to_four_decimals() {
        assert_eq!(
            key(52.52001, 13.405, TemperatureUnit::Celsius),
            key(52.520009, 13.405, TemperatureUnit::Celsius)
        );
        assert_ne!(
            key(52.5201, 13.405, TemperatureUnit::Celsius),
            key(52.5202, 13.405, TemperatureUnit::Celsius)
        );
    }

    #[tokio::test]
    async fn test_fresh_hit_suppresses_fetch() {
        let cache: FetchCache<&str, u32> = FetchCache::new(Duration::from_secs(60));
        let calls = AtomicU32::new(0);

        for _ in 0..3 {
            let value: Result<u32, String> = cache
                .get_or_fetch("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(7)
                })
                .await;
            assert_eq!(value.unwrap(), 7);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_zero_ttl_always_refetches() {
        let cache: FetchCache<&str, u32> = FetchCache::new(Duration::ZERO);
        let calls = AtomicU32::new(0);

        for _ in 0..2 {
            let _: Result<u32, String> = cache
                .get_or_fetch("k", || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(1)
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_requests_coalesce() {
        let cache: Arc<FetchCache<&str, u32>> =
            Arc::new(FetchCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicU32::new(0));

        let slow_fetch = |calls: Arc<AtomicU32>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(50)).await;
            Ok::<u32, String>(9)
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k", || slow_fetch(calls.clone())),
            cache.get_or_fetch("k", || slow_fetch(calls.clone())),
        );

        assert_eq!(a.unwrap(), 9);
        assert_eq!(b.unwrap(), 9);
        // Exactly one underlying fetch for the identical key
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_different_keys_do_not_coalesce() {
        let cache: Arc<FetchCache<&str, u32>> =
            Arc::new(FetchCache::new(Duration::from_secs(60)));
        let calls = Arc::new(AtomicU32::new(0));

        let fetch = |calls: Arc<AtomicU32>| async move {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<u32, String>(1)
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("a", || fetch(calls.clone())),
            cache.get_or_fetch("b", || fetch(calls.clone())),
        );
        assert!(a.is_ok() && b.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_failed_fetch_stores_nothing() {
        let cache: FetchCache<&str, u32> = FetchCache::new(Duration::from_secs(60));
        let calls = AtomicU32::new(0);

        let err: Result<u32, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err("boom".to_string())
            })
            .await;
        assert!(err.is_err());

        let ok: Result<u32, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(3)
            })
            .await;
        assert_eq!(ok.unwrap(), 3);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_invalidate_forces_refetch() {
        let cache: FetchCache<&str, u32> = FetchCache::new(Duration::from_secs(60));
        let calls = AtomicU32::new(0);

        let _: Result<u32, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await;
        cache.invalidate(&"k").await;
        let _: Result<u32, String> = cache
            .get_or_fetch("k", || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .await;

        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
