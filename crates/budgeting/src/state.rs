//! Application state shared by the HTTP handlers and the consumer pipeline.
//!
//! Backends are chosen at compile time via feature flags. Construction never
//! fails: a store that cannot be opened is replaced by one that answers every
//! call with a connection error, and an unreachable Redis falls back to the
//! in-process cache with no broker, so the consumers are not started.

use std::sync::Arc;

use budgeting_core::broker::Broker;
use budgeting_core::cache::Cache;
use budgeting_core::storage::DocumentStore;

use crate::{config::Config, services::Services};

// ============================================================================
// Compile-time feature validation
// ============================================================================

// Storage features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "sqlite", feature = "inmemory"))]
compile_error!("Cannot enable both 'sqlite' and 'inmemory' storage features");

#[cfg(not(any(feature = "inmemory", feature = "sqlite")))]
compile_error!("Must enable exactly one storage feature: 'inmemory' or 'sqlite'");

// Cache and broker features: exactly one must be enabled, they are mutually exclusive
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!("Cannot enable both 'memory' and 'redis' messaging features");

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!("Must enable exactly one messaging feature: 'memory' or 'redis'");

/// Shared application state.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    /// Domain handlers (cache-aside where eligible).
    pub services: Services,
    /// Underlying document store, used by the readiness probe.
    pub store: Arc<dyn DocumentStore>,
    /// Broker the topic consumers subscribe to; `None` when it could not be
    /// reached at startup.
    pub broker: Option<Arc<dyn Broker>>,
}

impl AppState {
    fn build(
        store: Arc<dyn DocumentStore>,
        cache: Arc<dyn Cache>,
        broker: Option<Arc<dyn Broker>>,
        config: &Config,
    ) -> Self {
        Self {
            services: Services::new(store.clone(), cache, config.cache_ttl()),
            store,
            broker,
        }
    }

    /// Creates the state for the backends selected by feature flags.
    pub async fn new(config: &Config) -> Self {
        let store = open_store(config).await;
        let (cache, broker) = connect_messaging(config).await;
        Self::build(store, cache, broker, config)
    }
}

#[cfg(feature = "inmemory")]
async fn open_store(_config: &Config) -> Arc<dyn DocumentStore> {
    tracing::info!("Using in-memory document store");
    Arc::new(crate::storage::InMemoryStore::new())
}

#[cfg(feature = "sqlite")]
async fn open_store(config: &Config) -> Arc<dyn DocumentStore> {
    use crate::storage::{SqliteStore, UnavailableStore};

    match SqliteStore::new(&config.sqlite_path).await {
        Ok(store) => {
            tracing::info!(path = %config.sqlite_path, "Using SQLite document store");
            Arc::new(store)
        }
        Err(e) => {
            tracing::error!(
                path = %config.sqlite_path,
                error = %e,
                "Failed to open SQLite store, serving in degraded mode"
            );
            Arc::new(UnavailableStore::new(e.to_string()))
        }
    }
}

fn memory_cache(config: &Config) -> Arc<dyn Cache> {
    Arc::new(crate::cache::MemoryCache::new(config.cache_max_entries))
}

/// The in-process broker has no external producers; it serves local
/// development and tests.
#[cfg(feature = "memory")]
async fn connect_messaging(config: &Config) -> (Arc<dyn Cache>, Option<Arc<dyn Broker>>) {
    tracing::info!(
        max_entries = config.cache_max_entries,
        "Using in-memory cache and broker"
    );
    (
        memory_cache(config),
        Some(Arc::new(crate::broker::MemoryBroker::new())),
    )
}

#[cfg(feature = "redis")]
async fn connect_messaging(config: &Config) -> (Arc<dyn Cache>, Option<Arc<dyn Broker>>) {
    use crate::{broker::RedisBroker, cache::RedisCache};

    let connected = async {
        let cache = RedisCache::new(&config.redis_url).await?;
        let broker = RedisBroker::new(&config.redis_url).await?;
        anyhow::Ok((cache, broker))
    };

    match connected.await {
        Ok((cache, broker)) => {
            tracing::info!(url = %config.redis_url, "Using Redis cache and broker");
            (Arc::new(cache), Some(Arc::new(broker)))
        }
        Err(e) => {
            tracing::error!(
                url = %config.redis_url,
                error = %e,
                "Failed to connect to Redis, falling back to in-memory cache without a broker"
            );
            (memory_cache(config), None)
        }
    }
}

#[cfg(test)]
impl AppState {
    /// In-memory cache and broker over the given store.
    pub fn with_store(store: Arc<dyn DocumentStore>) -> Self {
        let config = Config::default();
        Self::build(
            store,
            memory_cache(&config),
            Some(Arc::new(crate::broker::MemoryBroker::new())),
            &config,
        )
    }
}

#[cfg(test)]
impl Default for AppState {
    /// In-memory backends regardless of feature flags.
    fn default() -> Self {
        Self::with_store(Arc::new(crate::storage::InMemoryStore::new()))
    }
}
