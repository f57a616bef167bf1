//! Pool provider — the seam between the registry and a pooling backend.
//!
//! The registry never manages individual connections. It asks a
//! [`PoolProvider`] to build one pool per key and to borrow connections from
//! it; queueing, capacity limits, checkout timeouts and connection testing
//! all live behind this trait.
//!
//! [`R2d2Provider`] is the production provider: it wraps a [`Driver`] (the
//! wire-protocol client) in an `r2d2` pool.

use std::sync::Arc;
use std::time::Duration;

use adspool_core::keys::{LIVENESS_QUERY, POOL_SIZE};
use thiserror::Error;

/// Per-pool settings handed to the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PoolSettings {
    /// Maximum concurrent connections per pool (default: 8).
    pub max_size: u32,
    /// Query used to validate a connection before it is handed out.
    pub liveness_query: String,
    /// Maximum wait for a free connection (default: 30s). Also bounds how
    /// long pool creation waits for its initial connections.
    pub checkout_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_size: POOL_SIZE,
            liveness_query: LIVENESS_QUERY.to_string(),
            checkout_timeout: Duration::from_secs(30),
        }
    }
}

impl PoolSettings {
    pub fn with_max_size(self, max_size: u32) -> Self {
        Self { max_size, ..self }
    }

    pub fn with_checkout_timeout(self, checkout_timeout: Duration) -> Self {
        Self {
            checkout_timeout,
            ..self
        }
    }

    pub fn with_liveness_query(self, liveness_query: impl Into<String>) -> Self {
        Self {
            liveness_query: liveness_query.into(),
            ..self
        }
    }
}

/// Connection counts reported by a provider for one pool.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStatus {
    /// Connections currently open (idle + checked out).
    pub connections: u32,
    /// Connections sitting idle.
    pub idle: u32,
}

/// Builds pools and borrows connections from them.
///
/// Errors are plain messages; the registry attaches the key and maps them
/// to the caller-facing error kinds.
pub trait PoolProvider: Send + Sync + 'static {
    type Pool: Send + Sync + 'static;
    type Connection;

    /// Build a pool whose connections target `address`.
    fn create_pool(&self, address: &str, settings: &PoolSettings) -> Result<Self::Pool, String>;

    /// Borrow one connection, blocking up to the configured checkout timeout.
    fn borrow(&self, pool: &Self::Pool) -> Result<Self::Connection, String>;

    fn status(&self, pool: &Self::Pool) -> PoolStatus;
}

/// Error raised by a [`Driver`].
#[derive(Debug, Error)]
#[error("{0}")]
pub struct DriverError(pub String);

/// Wire-protocol client for the database server.
pub trait Driver: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Open a new physical connection to `address`.
    fn connect(&self, address: &str) -> Result<Self::Connection, DriverError>;

    /// Run the liveness probe `query` on `conn`.
    fn execute_probe(&self, conn: &mut Self::Connection, query: &str) -> Result<(), DriverError>;

    /// Cheap synchronous check run when a connection is returned.
    fn has_broken(&self, _conn: &mut Self::Connection) -> bool {
        false
    }
}

/// `r2d2` connection manager bound to one address.
#[derive(Debug)]
pub struct DriverManager<D> {
    driver: Arc<D>,
    address: String,
    liveness_query: String,
}

impl<D: Driver> r2d2::ManageConnection for DriverManager<D> {
    type Connection = D::Connection;
    type Error = DriverError;

    fn connect(&self) -> Result<Self::Connection, Self::Error> {
        self.driver.connect(&self.address)
    }

    fn is_valid(&self, conn: &mut Self::Connection) -> Result<(), Self::Error> {
        self.driver.execute_probe(conn, &self.liveness_query)
    }

    fn has_broken(&self, conn: &mut Self::Connection) -> bool {
        self.driver.has_broken(conn)
    }
}

/// Pool provider backed by `r2d2`.
///
/// Pools are built eagerly: creation fails if the initial connections
/// cannot be established within the checkout timeout.
#[derive(Debug)]
pub struct R2d2Provider<D> {
    driver: Arc<D>,
}

impl<D: Driver> R2d2Provider<D> {
    pub fn new(driver: D) -> Self {
        Self {
            driver: Arc::new(driver),
        }
    }
}

impl<D: Driver> PoolProvider for R2d2Provider<D> {
    type Pool = r2d2::Pool<DriverManager<D>>;
    type Connection = r2d2::PooledConnection<DriverManager<D>>;

    fn create_pool(&self, address: &str, settings: &PoolSettings) -> Result<Self::Pool, String> {
        if settings.max_size == 0 {
            return Err("max_size must be at least 1".to_string());
        }
        let manager = DriverManager {
            driver: Arc::clone(&self.driver),
            address: address.to_string(),
            liveness_query: settings.liveness_query.clone(),
        };
        r2d2::Pool::builder()
            .max_size(settings.max_size)
            .connection_timeout(settings.checkout_timeout)
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| e.to_string())
    }

    fn borrow(&self, pool: &Self::Pool) -> Result<Self::Connection, String> {
        pool.get().map_err(|e| e.to_string())
    }

    fn status(&self, pool: &Self::Pool) -> PoolStatus {
        let state = pool.state();
        PoolStatus {
            connections: state.connections,
            idle: state.idle_connections,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pool_settings_defaults() {
        let settings = PoolSettings::default();
        assert_eq!(settings.max_size, 8);
        assert_eq!(settings.liveness_query, "SELECT 1 FROM system.iota");
        assert_eq!(settings.checkout_timeout, Duration::from_secs(30));
    }

    #[test]
    fn builder_methods_chain() {
        let settings = PoolSettings::default()
            .with_max_size(2)
            .with_checkout_timeout(Duration::from_millis(50))
            .with_liveness_query("SELECT 1");
        assert_eq!(settings.max_size, 2);
        assert_eq!(settings.checkout_timeout, Duration::from_millis(50));
        assert_eq!(settings.liveness_query, "SELECT 1");
    }

    #[derive(Debug)]
    struct NullDriver;

    impl Driver for NullDriver {
        type Connection = ();

        fn connect(&self, _address: &str) -> Result<(), DriverError> {
            Ok(())
        }

        fn execute_probe(&self, _conn: &mut (), _query: &str) -> Result<(), DriverError> {
            Ok(())
        }
    }

    #[test]
    fn zero_max_size_is_rejected() {
        let provider = R2d2Provider::new(NullDriver);
        let err = provider
            .create_pool("addr", &PoolSettings::default().with_max_size(0))
            .unwrap_err();
        assert!(err.contains("max_size"));
    }

    #[test]
    fn r2d2_pool_reports_status() {
        let provider = R2d2Provider::new(NullDriver);
        let settings = PoolSettings::default()
            .with_max_size(2)
            .with_checkout_timeout(Duration::from_secs(1));
        let pool = provider.create_pool("addr", &settings).unwrap();
        let conn = provider.borrow(&pool).unwrap();
        let status = provider.status(&pool);
        assert_eq!(status.connections, 2);
        assert_eq!(status.idle, 1);
        drop(conn);
    }
}
