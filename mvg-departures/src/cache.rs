//! Caching layer for location search.
//!
//! Station search results change rarely, while the search box fires a
//! request for every settled keystroke. Location responses are cached by
//! normalised query. Departures are never cached: every poll must reach
//! the service.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache as MokaCache;
use tracing::trace;

use crate::domain::{Departure, Station};
use crate::mvg::{DepartureQuery, MvgClient, MvgError, TransitApi};

/// Configuration for the cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// TTL for cached entries.
    pub ttl: Duration,

    /// Maximum number of cached entries.
    pub max_capacity: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_capacity: 500,
        }
    }
}

/// Cache of location search results.
pub struct LocationCache {
    entries: MokaCache<String, Arc<Vec<Station>>>,
}

impl LocationCache {
    /// Create a new cache with the given configuration.
    pub fn new(config: &CacheConfig) -> Self {
        let entries = MokaCache::builder()
            .time_to_live(config.ttl)
            .max_capacity(config.max_capacity)
            .build();

        Self { entries }
    }

    /// Cache key for a query: trimmed and lowercased.
    fn key(query: &str) -> String {
        query.trim().to_lowercase()
    }

    pub async fn get(&self, query: &str) -> Option<Arc<Vec<Station>>> {
        self.entries.get(&Self::key(query)).await
    }

    pub async fn insert(&self, query: &str, stations: Arc<Vec<Station>>) {
        self.entries.insert(Self::key(query), stations).await;
    }
}

/// Transit client with a location search cache.
///
/// Wraps any [`TransitApi`] (the live [`MvgClient`] by default).
pub struct CachedMvgClient<A = MvgClient> {
    client: A,
    cache: LocationCache,
}

impl<A: TransitApi> CachedMvgClient<A> {
    /// Create a new cached client.
    pub fn new(client: A, cache_config: &CacheConfig) -> Self {
        Self {
            client,
            cache: LocationCache::new(cache_config),
        }
    }

    /// Access the underlying client for operations that bypass cache.
    pub fn client(&self) -> &A {
        &self.client
    }
}

impl<A: TransitApi> TransitApi for CachedMvgClient<A> {
    async fn departures(&self, query: &DepartureQuery) -> Result<Vec<Departure>, MvgError> {
        self.client.departures(query).await
    }

    async fn locations(&self, query: &str) -> Result<Vec<Station>, MvgError> {
        if let Some(cached) = self.cache.get(query).await {
            trace!(query, "location cache hit");
            return Ok(cached.as_ref().clone());
        }

        // Errors propagate without touching the cache
        let stations = self.client.locations(query).await?;
        self.cache.insert(query, Arc::new(stations.clone())).await;

        Ok(stations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LocationType;
    use crate::testing::{Outcome, ScriptedApi, gid, station};

    #[test]
    fn default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.ttl, Duration::from_secs(300));
        assert_eq!(config.max_capacity, 500);
    }

    #[test]
    fn key_normalisation() {
        assert_eq!(LocationCache::key("  Marienplatz "), "marienplatz");
        assert_eq!(LocationCache::key("HBF"), LocationCache::key("hbf"));
    }

    #[tokio::test]
    async fn repeated_query_served_from_cache() {
        let api = ScriptedApi::new();
        api.script(
            "Odeon",
            0,
            Outcome::Stations(vec![station("de:09162:3", "Odeonsplatz", LocationType::Station)]),
        );
        let cached = CachedMvgClient::new(api, &CacheConfig::default());

        let first = cached.locations("Odeon").await.unwrap();
        let second = cached.locations("Odeon").await.unwrap();

        assert_eq!(first, second);
        assert_eq!(cached.client().call_count(), 1);
    }

    #[tokio::test]
    async fn errors_are_not_cached() {
        let api = ScriptedApi::new();
        api.script("Odeon", 0, Outcome::Status(503));
        api.script(
            "Odeon",
            0,
            Outcome::Stations(vec![station("de:09162:3", "Odeonsplatz", LocationType::Station)]),
        );
        let cached = CachedMvgClient::new(api, &CacheConfig::default());

        assert!(cached.locations("Odeon").await.is_err());
        assert_eq!(cached.locations("Odeon").await.unwrap().len(), 1);
        assert_eq!(cached.client().call_count(), 2);
    }

    #[tokio::test]
    async fn departures_always_hit_the_client() {
        let api = ScriptedApi::new();
        let cached = CachedMvgClient::new(api, &CacheConfig::default());
        let query = DepartureQuery::new(gid("de:09162:2"));

        cached.departures(&query).await.unwrap();
        cached.departures(&query).await.unwrap();

        assert_eq!(cached.client().call_count(), 2);
    }
}
