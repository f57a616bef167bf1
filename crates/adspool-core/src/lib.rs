//! adspool-core — connection configuration for Advantage Database Server pools.
//!
//! Turns a loosely-specified set of connection parameters into a
//! [`CanonicalKey`], the identity under which connection pools are shared.
//!
//! # Flow
//!
//! ```text
//! ConnectionConfig ── validate ──► apply_defaults(loaded defaults) ──► canonical_key
//!                       │
//!                       └── missing HOST / DATABASE_DICTIONARY → AdsPoolError::Config
//! ```
//!
//! Defaults are supplied by a [`DefaultsLoader`]; [`FileDefaultsLoader`] reads
//! a TOML file from a local or packaged location.

pub mod config;
pub mod defaults;
pub mod error;
pub mod key;
pub mod keys;

pub use config::ConnectionConfig;
pub use defaults::{DefaultsLoader, FileDefaultsLoader, StaticDefaults};
pub use error::{AdsPoolError, AdsPoolResult, ErrorKind};
pub use key::CanonicalKey;

/// Library version, logged when defaults are loaded.
pub const ADSPOOL_VERSION: &str = env!("CARGO_PKG_VERSION");
