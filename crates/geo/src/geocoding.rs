//! Cached, rate-limited geocoding
//!
//! [`GeocodingService`] maps free-text addresses to coordinates through a
//! [`GeocodeProvider`]. Results, including failures, are cached for the
//! configured TTL. Uncached lookups are retried with doubling backoff, and
//! batch resolution is strictly sequential with a pause after every lookup
//! that went to the network.

use crate::provider::GeocodeProvider;
use crate::{Coordinate, GeocodedLocation};
use std::collections::{HashMap, HashSet};
use std::time::Duration;
use tracing::{debug, warn};
use workorder_api_client::models::WorkOrder;
use workorder_core::cache::TtlCache;
use workorder_core::config::GeocodingSettings;
use workorder_core::retry::{retry_async, RetryConfig};

/// Tuning for [`GeocodingService`]
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodingConfig {
    /// How long a cached result (hit or miss) stays fresh
    pub ttl: Duration,
    /// Pause between consecutive network lookups in a batch
    pub request_delay: Duration,
    /// Attempt ceiling and backoff for a single lookup
    pub retry: RetryConfig,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(24 * 60 * 60),
            request_delay: Duration::from_millis(100),
            retry: RetryConfig::doubling(3, Duration::from_millis(100)),
        }
    }
}

impl GeocodingConfig {
    /// Build from the `[geocoding]` settings; the request delay doubles as
    /// the backoff base
    pub fn from_settings(settings: &GeocodingSettings) -> Self {
        let request_delay = Duration::from_millis(settings.request_delay_ms);
        Self {
            ttl: Duration::from_secs(settings.cache_ttl_secs),
            request_delay,
            retry: RetryConfig::doubling(settings.max_attempts.max(1), request_delay),
        }
    }
}

/// Cache key for an address: trimmed, inner whitespace collapsed, lowercased
pub fn normalize_address(address: &str) -> String {
    address
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Address geocoder with a TTL cache
pub struct GeocodingService<P> {
    provider: P,
    cache: TtlCache<String, Option<Coordinate>>,
    config: GeocodingConfig,
}

impl<P: GeocodeProvider> GeocodingService<P> {
    /// Create a service with default tuning
    pub fn new(provider: P) -> Self {
        Self::with_config(provider, GeocodingConfig::default())
    }

    /// Create a service with explicit tuning
    pub fn with_config(provider: P, config: GeocodingConfig) -> Self {
        Self {
            provider,
            cache: TtlCache::new(config.ttl),
            config,
        }
    }

    /// Current tuning
    pub fn config(&self) -> &GeocodingConfig {
        &self.config
    }

    /// Resolve one address.
    ///
    /// Returns the cached result while it is fresh, which may be `None`.
    /// Blank addresses resolve to `None` without a lookup.
    pub async fn resolve(&self, address: &str) -> Option<Coordinate> {
        self.resolve_tracked(address).await.0
    }

    /// Resolve each distinct address in order, one at a time.
    ///
    /// After a lookup that went to the network the next address waits for
    /// `request_delay`; cache hits add no delay.
    pub async fn resolve_many<I, S>(&self, addresses: I) -> HashMap<String, Option<Coordinate>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.resolve_many_with_progress(addresses, |_, _| {}).await
    }

    /// [`resolve_many`](Self::resolve_many), calling `on_resolved` after
    /// each distinct address
    pub async fn resolve_many_with_progress<I, S, F>(
        &self,
        addresses: I,
        mut on_resolved: F,
    ) -> HashMap<String, Option<Coordinate>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: FnMut(&str, Option<Coordinate>),
    {
        let mut seen = HashSet::new();
        let mut results = HashMap::new();
        let mut pause_before_next = false;

        for address in addresses {
            let address = address.as_ref();
            if !seen.insert(address.to_string()) {
                continue;
            }

            if pause_before_next {
                tokio::time::sleep(self.config.request_delay).await;
            }

            let (result, fetched) = self.resolve_tracked(address).await;
            pause_before_next = fetched;
            on_resolved(address, result);
            results.insert(address.to_string(), result);
        }

        results
    }

    /// Drop the cached result for `address`
    pub fn invalidate(&self, address: &str) {
        self.cache.remove(&normalize_address(address));
    }

    /// Drop every cached result
    pub fn invalidate_all(&self) {
        self.cache.clear();
    }

    /// Number of cached results, stale ones included
    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }

    /// Group work orders by location address and place each group.
    ///
    /// Orders without an address are skipped, as are addresses that do not
    /// resolve. Groups keep the order in which their address first appears.
    pub async fn locate_work_orders(&self, orders: &[WorkOrder]) -> Vec<GeocodedLocation> {
        let mut groups: Vec<(String, Vec<WorkOrder>)> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for order in orders {
            let Some(address) = order.location.as_ref().and_then(|l| l.formatted_address()) else {
                continue;
            };
            match index.get(&address) {
                Some(&i) => groups[i].1.push(order.clone()),
                None => {
                    index.insert(address.clone(), groups.len());
                    groups.push((address, vec![order.clone()]));
                }
            }
        }

        let resolved = self
            .resolve_many(groups.iter().map(|(address, _)| address.as_str()))
            .await;

        groups
            .into_iter()
            .filter_map(|(address, work_orders)| {
                let coordinate = resolved.get(&address).copied().flatten()?;
                Some(GeocodedLocation::new(coordinate, address, work_orders))
            })
            .collect()
    }

    /// Resolve and report whether the provider was called
    async fn resolve_tracked(&self, address: &str) -> (Option<Coordinate>, bool) {
        let key = normalize_address(address);
        if key.is_empty() {
            return (None, false);
        }

        if let Some(cached) = self.cache.get(&key) {
            debug!(component = "Geocoding", address = %key, "Cache hit");
            return (cached, false);
        }

        let query = address.split_whitespace().collect::<Vec<_>>().join(" ");
        let result = self.lookup(&query).await;
        self.cache.insert(key, result);
        (result, true)
    }

    async fn lookup(&self, address: &str) -> Option<Coordinate> {
        let outcome = retry_async(&self.config.retry, |attempt| {
            debug!(component = "Geocoding", address, attempt, "Geocoding lookup");
            self.provider.search(address)
        })
        .await;

        match outcome {
            Ok(found) => {
                let coordinate = found.value.first().and_then(|c| c.coordinate());
                if coordinate.is_none() {
                    debug!(component = "Geocoding", address, "No usable match");
                }
                coordinate
            }
            Err(e) => {
                let cause = e.last_error.to_string();
                let error = workorder_core::Error::retries_exhausted("Geocoding lookup", e.attempts)
                    .with_context(address.to_string())
                    .with_source(e.last_error);
                warn!(
                    component = "Geocoding",
                    address,
                    code = %error.code,
                    attempts = e.attempts,
                    cause = %cause,
                    "{}, caching negative result",
                    error.message
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GeoError, Result};
    use crate::provider::GeocodeCandidate;
    use async_trait::async_trait;
    use proptest::prelude::*;
    use std::sync::{Arc, Mutex};
    use tokio::time::Instant;
    use workorder_api_client::models::{Location, WorkOrderPriority, WorkOrderStatus};

    type Responder = Box<dyn Fn(&str, usize) -> Result<Vec<GeocodeCandidate>> + Send + Sync>;

    /// Provider that records the time of every call
    struct FakeProvider {
        respond: Responder,
        calls: Mutex<Vec<(String, Instant)>>,
    }

    impl FakeProvider {
        fn new(respond: impl Fn(&str, usize) -> Result<Vec<GeocodeCandidate>> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self {
                respond: Box::new(respond),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn always(lat: f64, lon: f64) -> Arc<Self> {
            Self::new(move |_, _| Ok(vec![GeocodeCandidate::new(lat, lon)]))
        }

        fn failing() -> Arc<Self> {
            Self::new(|_, _| {
                Err(GeoError::Status {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                })
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }

        fn call_offsets(&self, start: Instant) -> Vec<Duration> {
            self.calls.lock().unwrap().iter().map(|(_, at)| *at - start).collect()
        }
    }

    #[async_trait]
    impl GeocodeProvider for FakeProvider {
        async fn search(&self, address: &str) -> Result<Vec<GeocodeCandidate>> {
            let index = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((address.to_string(), Instant::now()));
                calls.len() - 1
            };
            (self.respond)(address, index)
        }
    }

    fn ms(millis: u64) -> Duration {
        Duration::from_millis(millis)
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_resolution_is_cached() {
        let provider = FakeProvider::always(40.7128, -74.006);
        let service = GeocodingService::new(provider.clone());

        let first = service.resolve("1 Main St").await;
        let second = service.resolve("1 Main St").await;

        assert_eq!(first, Some(Coordinate::new(40.7128, -74.006)));
        assert_eq!(first, second);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_match_is_cached() {
        let provider = FakeProvider::new(|_, _| Ok(Vec::new()));
        let service = GeocodingService::new(provider.clone());

        assert_eq!(service.resolve("Atlantis").await, None);
        assert_eq!(service.resolve("Atlantis").await, None);
        assert_eq!(provider.call_count(), 1);
        assert_eq!(service.cached_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failures_exhaust_attempts_with_doubling_delay() {
        let provider = FakeProvider::failing();
        let service = GeocodingService::new(provider.clone());
        let start = Instant::now();

        assert_eq!(service.resolve("Nowhere Rd").await, None);

        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.call_offsets(start), vec![ms(0), ms(100), ms(300)]);

        // The failure is cached
        assert_eq!(service.resolve("Nowhere Rd").await, None);
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_transient_failure_recovers() {
        let provider = FakeProvider::new(|_, index| {
            if index == 0 {
                Err(GeoError::Status {
                    status: 429,
                    message: "Too Many Requests".to_string(),
                })
            } else {
                Ok(vec![GeocodeCandidate::new(51.5, -0.12)])
            }
        });
        let service = GeocodingService::new(provider.clone());

        assert_eq!(service.resolve("London").await, Some(Coordinate::new(51.5, -0.12)));
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_entries_expire_after_ttl() {
        let provider = FakeProvider::always(1.0, 2.0);
        let service = GeocodingService::new(provider.clone());

        service.resolve("Depot").await;
        tokio::time::advance(Duration::from_secs(24 * 60 * 60 - 1)).await;
        service.resolve("Depot").await;
        assert_eq!(provider.call_count(), 1);

        tokio::time::advance(Duration::from_secs(1)).await;
        service.resolve("Depot").await;
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_is_retried_after_ttl() {
        let provider = FakeProvider::new(|_, index| {
            if index < 3 {
                Err(GeoError::Status {
                    status: 503,
                    message: "Service Unavailable".to_string(),
                })
            } else {
                Ok(vec![GeocodeCandidate::new(1.0, 2.0)])
            }
        });
        let service = GeocodingService::new(provider.clone());

        assert_eq!(service.resolve("Depot").await, None);
        assert_eq!(provider.call_count(), 3);

        tokio::time::advance(Duration::from_secs(24 * 60 * 60 - 1)).await;
        assert_eq!(service.resolve("Depot").await, None);
        assert_eq!(provider.call_count(), 3);

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(service.resolve("Depot").await, Some(Coordinate::new(1.0, 2.0)));
        assert_eq!(provider.call_count(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_deduplicates() {
        let provider = FakeProvider::always(1.0, 2.0);
        let service = GeocodingService::new(provider.clone());

        let results = service.resolve_many(["addrA", "addrA", "addrB"]).await;

        assert_eq!(provider.call_count(), 2);
        assert_eq!(results.len(), 2);
        assert!(results.values().all(Option::is_some));
    }

    #[tokio::test(start_paused = true)]
    async fn test_progress_reports_each_distinct_address() {
        let provider = FakeProvider::new(|address, _| {
            if address == "nowhere" {
                Ok(Vec::new())
            } else {
                Ok(vec![GeocodeCandidate::new(1.0, 2.0)])
            }
        });
        let service = GeocodingService::new(provider);
        let mut seen = Vec::new();

        service
            .resolve_many_with_progress(["here", "nowhere", "here"], |address, result| {
                seen.push((address.to_string(), result.is_some()));
            })
            .await;

        assert_eq!(seen, vec![("here".to_string(), true), ("nowhere".to_string(), false)]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_resolve_many_delays_only_after_network_lookups() {
        let provider = FakeProvider::always(1.0, 2.0);
        let service = GeocodingService::new(provider.clone());
        service.resolve("A").await;

        let start = Instant::now();
        service.resolve_many(["A", "B", "C", "D"]).await;

        // A is cached: B goes out at once, C and D follow after a pause each
        assert_eq!(&provider.call_offsets(start)[1..], &[ms(0), ms(100), ms(200)]);
        // No pause after the last address
        assert_eq!(start.elapsed(), ms(200));
    }

    #[tokio::test(start_paused = true)]
    async fn test_normalized_addresses_share_cache() {
        let provider = FakeProvider::always(1.0, 2.0);
        let service = GeocodingService::new(provider.clone());

        service.resolve("  1 Main   St ").await;
        service.resolve("1 main st").await;

        assert_eq!(provider.call_count(), 1);
        assert_eq!(provider.calls.lock().unwrap()[0].0, "1 Main St");
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_address_is_not_looked_up() {
        let provider = FakeProvider::always(1.0, 2.0);
        let service = GeocodingService::new(provider.clone());

        assert_eq!(service.resolve("   ").await, None);
        assert_eq!(provider.call_count(), 0);
        assert_eq!(service.cached_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_unparsable_first_candidate() {
        let provider = FakeProvider::new(|_, _| {
            Ok(vec![
                GeocodeCandidate {
                    lat: String::new(),
                    lon: "2.0".to_string(),
                    display_name: None,
                },
                GeocodeCandidate::new(1.0, 2.0),
            ])
        });
        let service = GeocodingService::new(provider.clone());

        assert_eq!(service.resolve("Somewhere").await, None);
        assert_eq!(provider.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_invalidate() {
        let provider = FakeProvider::always(1.0, 2.0);
        let service = GeocodingService::new(provider.clone());

        service.resolve("A").await;
        service.resolve("B").await;
        service.invalidate(" a ");
        service.resolve("A").await;
        assert_eq!(provider.call_count(), 3);

        service.invalidate_all();
        assert_eq!(service.cached_len(), 0);
        service.resolve("B").await;
        assert_eq!(provider.call_count(), 4);
    }

    fn order(id: &str, address: Option<&str>) -> WorkOrder {
        WorkOrder {
            id: id.to_string(),
            title: format!("Order {id}"),
            description: None,
            status: WorkOrderStatus::Open,
            priority: WorkOrderPriority::Medium,
            location: address.map(|a| Location {
                id: format!("loc-{a}"),
                name: a.to_string(),
                address: Some(a.to_string()),
                city: None,
                state_province: None,
                postal_code: None,
                country: None,
                latitude: None,
                longitude: None,
            }),
            location_id: None,
            assigned_to_user_id: None,
            created_by_user_id: "u-1".to_string(),
            created_at: "2024-01-01T00:00:00Z".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_work_orders_groups_by_address() {
        let provider = FakeProvider::new(|address, _| {
            if address == "Unknown Pl" {
                Ok(Vec::new())
            } else {
                Ok(vec![GeocodeCandidate::new(10.0, 20.0)])
            }
        });
        let service = GeocodingService::new(provider.clone());

        let orders = vec![
            order("1", Some("1 Main St")),
            order("2", None),
            order("3", Some("Unknown Pl")),
            order("4", Some("1 Main St")),
            order("5", Some("9 Elm St")),
        ];
        let located = service.locate_work_orders(&orders).await;

        assert_eq!(provider.call_count(), 3);
        assert_eq!(located.len(), 2);
        assert_eq!(located[0].address, "1 Main St");
        assert_eq!(located[0].work_order_count(), 2);
        assert_eq!(located[1].address, "9 Elm St");
    }

    #[test]
    fn test_config_from_settings() {
        let settings = GeocodingSettings {
            request_delay_ms: 250,
            max_attempts: 0,
            ..GeocodingSettings::default()
        };
        let config = GeocodingConfig::from_settings(&settings);
        assert_eq!(config.request_delay, ms(250));
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.retry.initial_delay, ms(250));
        assert_eq!(config.ttl, Duration::from_secs(86_400));
    }

    proptest! {
        #[test]
        fn normalize_is_idempotent(address in "[ a-zA-Z0-9,]{0,40}") {
            let once = normalize_address(&address);
            prop_assert_eq!(normalize_address(&once), once.clone());
            prop_assert!(!once.starts_with(' ') && !once.ends_with(' '));
            prop_assert!(!once.contains("  "));
        }
    }
}
