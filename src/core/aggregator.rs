//! Single entry point for upstream data: cache, then rate gate, then adapter.

use super::adapter::Adapter;
use super::cache::Cache;
use super::config::{AppConfig, Environment};
use super::envelope::Envelope;
use super::error::{FetchError, InputError};
use super::payload::Payload;
use super::provider::{ProviderId, ProviderSpec};
use super::query::Query;
use super::rate_gate::RateGate;
use crate::providers;
use crate::store::MemoryCache;
use anyhow::Result;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, instrument, warn};

type Flight = Shared<BoxFuture<'static, Result<Payload, FetchError>>>;

struct Inner {
    cache: Arc<dyn Cache<String, Payload>>,
    gate: RateGate,
    adapters: HashMap<ProviderId, Arc<dyn Adapter>>,
    client: reqwest::Client,
    in_flight: Mutex<HashMap<String, Flight>>,
    environment: Environment,
}

/// Cheap to clone; clones share the cache, the gate and in-flight requests.
#[derive(Clone)]
pub struct Aggregator {
    inner: Arc<Inner>,
}

impl Aggregator {
    pub fn new(
        cache: Arc<dyn Cache<String, Payload>>,
        adapters: HashMap<ProviderId, Arc<dyn Adapter>>,
        client: reqwest::Client,
        environment: Environment,
    ) -> Self {
        let gate = RateGate::new(adapters.values().map(|adapter| adapter.spec()));
        Self {
            inner: Arc::new(Inner {
                cache,
                gate,
                adapters,
                client,
                in_flight: Mutex::new(HashMap::new()),
                environment,
            }),
        }
    }

    /// Wires the in-memory cache and every adapter from resolved config.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let specs = config.resolve_specs()?;
        let client = providers::build_client(&config.user_agent)?;
        let adapters = providers::build_adapters(&specs, &config.user_agent);
        let cache: Arc<dyn Cache<String, Payload>> = match config.cache.max_entries {
            Some(max_entries) => Arc::new(MemoryCache::with_capacity(max_entries)),
            None => Arc::new(MemoryCache::new()),
        };
        Ok(Self::new(cache, adapters, client, config.environment))
    }

    pub fn environment(&self) -> Environment {
        self.inner.environment
    }

    pub fn spec(&self, provider: ProviderId) -> Option<&ProviderSpec> {
        self.inner.adapters.get(&provider).map(|adapter| adapter.spec())
    }

    /// Specs of every configured provider, in catalog order.
    pub fn specs(&self) -> Vec<&ProviderSpec> {
        ProviderId::ALL
            .iter()
            .filter_map(|id| self.spec(*id))
            .collect()
    }

    /// Returns the cached payload for `query` or performs at most one
    /// upstream call for it.
    ///
    /// Concurrent misses on the same key join one upstream request. That
    /// request runs on its own task, so it still completes and fills the
    /// cache when every caller has gone away. Only successes are cached.
    #[instrument(name = "AggregatorFetch", skip(self), fields(provider = %query.provider()))]
    pub async fn fetch(&self, query: &Query) -> Result<Payload, FetchError> {
        let key = query.cache_key();
        if let Some(payload) = self.inner.cache.get(&key).await {
            return Ok(payload);
        }

        let flight = {
            let mut in_flight = self.inner.in_flight.lock().await;
            match in_flight.get(&key) {
                Some(flight) => {
                    debug!("Joining in-flight request for key: {}", key);
                    flight.clone()
                }
                None => {
                    let flight = self.start_flight(key.clone(), query.clone());
                    in_flight.insert(key, flight.clone());
                    flight
                }
            }
        };
        flight.await
    }

    /// [`Aggregator::fetch`] wrapped in the outward envelope.
    pub async fn fetch_envelope(&self, query: &Query) -> Envelope {
        let result = self.fetch(query).await;
        Envelope::from_result(result, query.provider(), self.inner.environment)
    }

    /// Route-handler boundary: builds the query from loose parameters, then
    /// fetches. Parameter problems surface before any cache or upstream work.
    pub async fn fetch_params(
        &self,
        provider: ProviderId,
        params: &HashMap<String, String>,
    ) -> Result<Envelope, InputError> {
        let query = Query::from_params(provider, params)?;
        Ok(self.fetch_envelope(&query).await)
    }

    /// Drops expired cache entries, returning how many went.
    pub async fn purge_expired(&self) -> usize {
        self.inner.cache.purge_expired().await
    }

    // Must be called with the in-flight lock held: the task's own removal of
    // `key` then can't run before the insert.
    fn start_flight(&self, key: String, query: Query) -> Flight {
        let inner = Arc::clone(&self.inner);
        let task_key = key.clone();
        let handle = tokio::spawn(async move {
            let result = inner.fetch_upstream(task_key.clone(), &query).await;
            // The cache is already populated, so late arrivals hit it.
            inner.in_flight.lock().await.remove(&task_key);
            result
        });

        let inner = Arc::clone(&self.inner);
        async move {
            match handle.await {
                Ok(result) => result,
                Err(e) => {
                    inner.in_flight.lock().await.remove(&key);
                    Err(FetchError::unavailable(format!("Fetch task failed: {e}")))
                }
            }
        }
        .boxed()
        .shared()
    }
}

impl Inner {
    async fn fetch_upstream(&self, key: String, query: &Query) -> Result<Payload, FetchError> {
        // A flight that finished between our miss and taking the lock.
        if let Some(payload) = self.cache.get(&key).await {
            return Ok(payload);
        }

        let provider = query.provider();
        let adapter = self
            .adapters
            .get(&provider)
            .ok_or_else(|| FetchError::unavailable(format!("No adapter configured for {provider}")))?;

        let waited = self.gate.acquire(provider).await;
        if !waited.is_zero() {
            debug!(%provider, ?waited, "Rate gate released request");
        }

        match adapter.fetch(&self.client, query).await {
            Ok(payload) => {
                self.cache
                    .put(key, payload.clone(), adapter.spec().ttl)
                    .await;
                Ok(payload)
            }
            Err(FetchError::NotFound(detail)) => {
                debug!(%provider, "No upstream data: {}", detail);
                Err(FetchError::NotFound(detail))
            }
            Err(e) => {
                warn!(%provider, error = %e, "Upstream fetch failed");
                Err(e)
            }
        }
    }
}
