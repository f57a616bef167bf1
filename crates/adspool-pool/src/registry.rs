//! PoolRegistry — one lazily-created pool per canonical key.
//!
//! ```text
//! get_or_create(config, defaults)
//!   → validate + apply defaults + canonical key
//!     → read lock: pool exists → return shared handle
//!     → write lock: re-check → create via provider → insert → return handle
//! ```
//!
//! The whole check-then-create sequence runs under a single write lock, so
//! concurrent first requests for a key produce exactly one pool. A failed
//! creation inserts nothing; the next caller for that key tries again.
//!
//! While a pool is being created, every other caller waits, including hits
//! on keys that already have a pool. With an eager provider and an
//! unreachable server this stall lasts up to the checkout timeout.
//!
//! Entries are never evicted. Pools live as long as the registry does.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use adspool_core::{AdsPoolError, AdsPoolResult, CanonicalKey, ConnectionConfig};
use tracing::{debug, info, warn};

use crate::provider::{PoolProvider, PoolSettings, PoolStatus};

/// A live pool bound to one canonical key.
///
/// Shared between callers through `Arc`; connections are borrowed with
/// [`PoolHandle::checkout`], never the pool itself.
pub struct PoolHandle<P: PoolProvider> {
    key: CanonicalKey,
    name: String,
    address: String,
    settings: PoolSettings,
    provider: Arc<P>,
    pool: P::Pool,
}

impl<P: PoolProvider> PoolHandle<P> {
    pub fn key(&self) -> &CanonicalKey {
        &self.key
    }

    /// Diagnostic pool name derived from the key.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Address the provider connects to.
    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn status(&self) -> PoolStatus {
        self.provider.status(&self.pool)
    }

    /// Borrow one connection, blocking up to the checkout timeout.
    pub fn checkout(&self) -> AdsPoolResult<P::Connection> {
        match self.provider.borrow(&self.pool) {
            Ok(conn) => {
                debug!(pool = %self.name, key = %self.key, "connection checked out");
                Ok(conn)
            }
            Err(message) => {
                warn!(
                    pool = %self.name,
                    key = %self.key,
                    timeout = ?self.settings.checkout_timeout,
                    error = %message,
                    "connection checkout timed out"
                );
                Err(AdsPoolError::CheckoutTimeout {
                    key: self.key.to_string(),
                    timeout: self.settings.checkout_timeout,
                    message,
                })
            }
        }
    }
}

impl<P: PoolProvider> std::fmt::Debug for PoolHandle<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolHandle")
            .field("key", &self.key)
            .field("name", &self.name)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

/// Snapshot of one registered pool.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolStats {
    pub key: CanonicalKey,
    pub name: String,
    pub connections: u32,
    pub idle: u32,
}

/// Keyed cache of pool handles.
pub struct PoolRegistry<P: PoolProvider> {
    pools: RwLock<HashMap<CanonicalKey, Arc<PoolHandle<P>>>>,
    provider: Arc<P>,
    settings: PoolSettings,
    scope: &'static str,
}

impl<P: PoolProvider> PoolRegistry<P> {
    pub fn new(provider: Arc<P>, settings: PoolSettings) -> Self {
        Self {
            pools: RwLock::new(HashMap::new()),
            provider,
            settings,
            scope: "structured",
        }
    }

    /// Builder method: label used in log events to tell registries apart.
    pub fn with_scope(self, scope: &'static str) -> Self {
        Self { scope, ..self }
    }

    pub fn scope(&self) -> &'static str {
        self.scope
    }

    pub fn settings(&self) -> &PoolSettings {
        &self.settings
    }

    /// Normalize `config` against `defaults` and return the pool for its key.
    ///
    /// Fails with [`AdsPoolError::Config`] before touching the registry when
    /// a required key is missing.
    pub fn get_or_create(
        &self,
        config: ConnectionConfig,
        defaults: &ConnectionConfig,
    ) -> AdsPoolResult<Arc<PoolHandle<P>>> {
        let (_, key) = config.normalize(defaults)?;
        self.get_or_create_key(key)
    }

    /// Return the pool for an already-derived key, creating it on first use.
    pub fn get_or_create_key(&self, key: CanonicalKey) -> AdsPoolResult<Arc<PoolHandle<P>>> {
        if let Some(handle) = self.get(&key) {
            debug!(scope = self.scope, key = %key, "pool registry hit");
            return Ok(handle);
        }

        let mut pools = self.pools.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pools.get(&key) {
            debug!(scope = self.scope, key = %key, "pool created by concurrent caller");
            return Ok(Arc::clone(handle));
        }

        let handle = Arc::new(self.create_handle(key.clone())?);
        pools.insert(key, Arc::clone(&handle));
        Ok(handle)
    }

    fn create_handle(&self, key: CanonicalKey) -> AdsPoolResult<PoolHandle<P>> {
        let address = key.address();
        let name = key.pool_name();
        let pool = self
            .provider
            .create_pool(&address, &self.settings)
            .map_err(|message| {
                warn!(scope = self.scope, key = %key, error = %message, "pool creation failed");
                AdsPoolError::PoolCreation {
                    key: key.to_string(),
                    message,
                }
            })?;

        info!(
            scope = self.scope,
            pool = %name,
            key = %key,
            max_size = self.settings.max_size,
            "created connection pool"
        );

        Ok(PoolHandle {
            key,
            name,
            address,
            settings: self.settings.clone(),
            provider: Arc::clone(&self.provider),
            pool,
        })
    }

    /// Existing handle for `key`, if any. Never creates.
    pub fn get(&self, key: &CanonicalKey) -> Option<Arc<PoolHandle<P>>> {
        self.pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    pub fn contains(&self, key: &CanonicalKey) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.pools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registered keys, sorted.
    pub fn keys(&self) -> Vec<CanonicalKey> {
        let mut keys: Vec<_> = self
            .pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Per-pool connection counts, sorted by key.
    pub fn stats(&self) -> Vec<PoolStats> {
        let handles: Vec<_> = self
            .pools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect();
        let mut stats: Vec<_> = handles
            .iter()
            .map(|handle| {
                let status = handle.status();
                PoolStats {
                    key: handle.key().clone(),
                    name: handle.name().to_string(),
                    connections: status.connections,
                    idle: status.idle,
                }
            })
            .collect();
        stats.sort_by(|a, b| a.key.cmp(&b.key));
        stats
    }

    /// Log pool statistics for all pools at `tracing::info` level.
    pub fn log_stats(&self) {
        for stat in self.stats() {
            info!(
                scope = self.scope,
                pool = %stat.name,
                key = %stat.key,
                connections = stat.connections,
                idle = stat.idle,
                active = stat.connections.saturating_sub(stat.idle),
                "pool statistics"
            );
        }
    }
}

impl<P: PoolProvider> std::fmt::Debug for PoolRegistry<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PoolRegistry")
            .field("scope", &self.scope)
            .field("settings", &self.settings)
            .field("pools", &self.len())
            .finish_non_exhaustive()
    }
}
