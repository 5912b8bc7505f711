//! Named breaker registry.
//!
//! # Responsibilities
//! - Own one shared [`CircuitBreaker`] per logical dependency
//! - Hand the same instance to every caller asking for a name
//! - Guard calls by name, rejecting names that were never registered

use dashmap::DashMap;
use std::future::Future;
use std::sync::Arc;

use crate::breaker::{BreakerError, BreakerResult, BreakerSnapshot, CircuitBreaker};
use crate::config::{BreakerConfig, Settings};

/// A thread-safe map of breaker name -> breaker.
#[derive(Clone, Default)]
pub struct BreakerRegistry {
    inner: Arc<DashMap<String, Arc<CircuitBreaker>>>,
}

impl BreakerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry holding every breaker in the settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let registry = Self::new();
        for config in &settings.breakers {
            registry.register(config.clone());
        }
        registry
    }

    /// Register a breaker, or return the existing one under the same name.
    ///
    /// An existing breaker keeps its original configuration.
    pub fn register(&self, config: BreakerConfig) -> Arc<CircuitBreaker> {
        let name = config.name.clone();
        let entry = self.inner.entry(name.clone()).or_insert_with(|| {
            tracing::info!(breaker = %name, window = ?config.sliding_window, "Circuit breaker registered");
            Arc::new(CircuitBreaker::new(config))
        });
        entry.value().clone()
    }

    pub fn get(&self, name: &str) -> Option<Arc<CircuitBreaker>> {
        self.inner.get(name).map(|r| r.value().clone())
    }

    /// Run `action` through the breaker registered as `name`.
    pub fn execute<T, E, F>(&self, name: &str, action: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Result<T, E>,
    {
        self.lookup::<E>(name)?.execute(action)
    }

    /// Async counterpart of [`execute`](Self::execute).
    pub async fn execute_async<T, E, F, Fut>(&self, name: &str, action: F) -> BreakerResult<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let breaker = self.lookup::<E>(name)?;
        breaker.execute_async(action).await
    }

    fn lookup<E>(&self, name: &str) -> BreakerResult<Arc<CircuitBreaker>, E> {
        self.get(name).ok_or_else(|| {
            tracing::warn!(breaker = %name, "Call through unregistered circuit breaker");
            BreakerError::Uninitialized {
                name: name.to_string(),
            }
        })
    }

    /// Snapshots of all breakers, sorted by name.
    pub fn snapshots(&self) -> Vec<BreakerSnapshot> {
        let mut snapshots: Vec<_> = self.inner.iter().map(|r| r.value().snapshot()).collect();
        snapshots.sort_by(|a, b| a.name.cmp(&b.name));
        snapshots
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl std::fmt::Debug for BreakerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BreakerRegistry")
            .field("breakers", &self.inner.len())
            .finish()
    }
}
