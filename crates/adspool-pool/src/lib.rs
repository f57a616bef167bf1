//! adspool-pool — connection pools keyed by canonical connection identity.
//!
//! # Architecture
//!
//! ```text
//! ConnectionFacade::connect_*(…)
//!   → resolve target (defaults loader, suffix derivation, canonical key)
//!     → PoolRegistry::get_or_create_key(key)
//!       → pool exists → shared PoolHandle
//!       → no pool    → PoolProvider::create_pool(address, settings) under the registry lock
//!     → PoolHandle::checkout() → connection owned by the caller
//! ```
//!
//! Pools are never evicted; a registry and its pools live as long as the
//! facade that owns them.

pub mod facade;
pub mod provider;
pub mod registry;

pub use facade::{resolve, ConnectionFacade, Resolution, Scope, Target};
pub use provider::{
    Driver, DriverError, DriverManager, PoolProvider, PoolSettings, PoolStatus, R2d2Provider,
};
pub use registry::{PoolHandle, PoolRegistry, PoolStats};
