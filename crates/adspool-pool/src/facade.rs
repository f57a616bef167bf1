//! ConnectionFacade — public entry point for acquiring connections.
//!
//! Every mode resolves a [`Target`] to a canonical key, gets the pool for
//! that key, and checks out one connection:
//!
//! | mode                      | config source                              | scope        |
//! |---------------------------|--------------------------------------------|--------------|
//! | `connect_default`         | loaded defaults                            | structured   |
//! | `connect_with_config`     | caller config, defaults only for gaps      | structured   |
//! | `connect_to_dictionary`   | defaults + dictionary suffix (absent = "") | structured   |
//! | `connect_to_mandant`      | defaults + tenant suffix (absent = error)  | structured   |
//! | `connect_to_full_url`     | caller URL + defaults' type properties     | full URL     |
//!
//! The full-URL scope is a separate registry keyed by the composed address.
//! A full URL never shares a pool with a structured config, even when both
//! name the same server.

use std::sync::Arc;

use adspool_core::{AdsPoolResult, CanonicalKey, ConnectionConfig, DefaultsLoader};
use tracing::debug;

use crate::provider::{PoolProvider, PoolSettings};
use crate::registry::{PoolHandle, PoolRegistry};

/// What a caller asks to connect to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    Default,
    Config(ConnectionConfig),
    Dictionary(String),
    Mandant(String),
    FullUrl(String),
}

/// Which registry a resolved key belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Scope {
    Structured,
    FullUrl,
}

/// A target after default merging and canonicalization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Resolution {
    pub scope: Scope,
    pub key: CanonicalKey,
    /// Effective configuration. For full URLs only the type properties are set.
    pub config: ConnectionConfig,
}

/// Resolve `target` against the defaults from `loader` without creating
/// any pool.
///
/// Explicit configs are validated before the loader is consulted, and the
/// loader is skipped entirely when the config sets every optional key.
pub fn resolve(target: &Target, loader: &dyn DefaultsLoader) -> AdsPoolResult<Resolution> {
    let (config, defaults) = match target {
        Target::Default => {
            let defaults = loader.load_defaults()?;
            (defaults.clone(), defaults)
        }
        Target::Config(config) => {
            config.validate()?;
            let defaults = if config.needs_defaults() {
                loader.load_defaults()?
            } else {
                ConnectionConfig::default()
            };
            (config.clone(), defaults)
        }
        Target::Dictionary(suffix) => {
            let defaults = loader.load_defaults()?;
            debug!(suffix = %suffix, "deriving dictionary-scoped config");
            (defaults.with_dictionary_suffix(suffix), defaults)
        }
        Target::Mandant(mandant) => {
            let defaults = loader.load_defaults()?;
            debug!(mandant = %mandant, "deriving mandant-scoped config");
            (defaults.with_mandant_suffix(mandant)?, defaults)
        }
        Target::FullUrl(url) => {
            let defaults = loader.load_defaults()?;
            let config = ConnectionConfig {
                lock_type: defaults.lock_type.clone(),
                char_type: defaults.char_type.clone(),
                table_type: defaults.table_type.clone(),
                ..ConnectionConfig::default()
            };
            let key = CanonicalKey::from_address(format!("{url}{}", config.dsn_properties()));
            return Ok(Resolution {
                scope: Scope::FullUrl,
                key,
                config,
            });
        }
    };

    let (config, key) = config.normalize(&defaults)?;
    Ok(Resolution {
        scope: Scope::Structured,
        key,
        config,
    })
}

/// Connection acquisition over a defaults loader and two pool registries.
///
/// Construct one per application context; tests build their own for
/// isolation.
pub struct ConnectionFacade<P: PoolProvider, L> {
    loader: L,
    structured: PoolRegistry<P>,
    full_url: PoolRegistry<P>,
}

impl<P: PoolProvider, L: DefaultsLoader> ConnectionFacade<P, L> {
    pub fn new(provider: P, loader: L, settings: PoolSettings) -> Self {
        let provider = Arc::new(provider);
        Self {
            loader,
            structured: PoolRegistry::new(Arc::clone(&provider), settings.clone()),
            full_url: PoolRegistry::new(provider, settings).with_scope("full-url"),
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Registry for structured configs.
    pub fn registry(&self) -> &PoolRegistry<P> {
        &self.structured
    }

    /// Registry for full-URL connections.
    pub fn full_url_registry(&self) -> &PoolRegistry<P> {
        &self.full_url
    }

    pub fn resolve(&self, target: &Target) -> AdsPoolResult<Resolution> {
        resolve(target, &self.loader)
    }

    /// Resolve `target` and return its pool, creating it if needed.
    pub fn pool_for(&self, target: &Target) -> AdsPoolResult<Arc<PoolHandle<P>>> {
        let resolution = self.resolve(target)?;
        match resolution.scope {
            Scope::Structured => self.structured.get_or_create_key(resolution.key),
            Scope::FullUrl => self.full_url.get_or_create_key(resolution.key),
        }
    }

    /// Check out one connection for `target`. The caller owns its release.
    pub fn connect(&self, target: &Target) -> AdsPoolResult<P::Connection> {
        self.pool_for(target)?.checkout()
    }

    /// Connect using the loaded default configuration.
    pub fn connect_default(&self) -> AdsPoolResult<P::Connection> {
        self.connect(&Target::Default)
    }

    /// Connect using a caller-supplied configuration.
    pub fn connect_with_config(&self, config: ConnectionConfig) -> AdsPoolResult<P::Connection> {
        self.connect(&Target::Config(config))
    }

    /// Connect to the default dictionary with `suffix` appended.
    pub fn connect_to_dictionary(&self, suffix: &str) -> AdsPoolResult<P::Connection> {
        self.connect(&Target::Dictionary(suffix.to_string()))
    }

    /// Connect to a tenant: the default dictionary with `mandant` appended.
    ///
    /// Fails with a configuration error when the defaults carry no dictionary.
    pub fn connect_to_mandant(&self, mandant: &str) -> AdsPoolResult<P::Connection> {
        self.connect(&Target::Mandant(mandant.to_string()))
    }

    /// Connect to an explicit address, adding the default type properties.
    pub fn connect_to_full_url(&self, full_url: &str) -> AdsPoolResult<P::Connection> {
        self.connect(&Target::FullUrl(full_url.to_string()))
    }

    /// Log statistics for both registries.
    pub fn log_stats(&self) {
        self.structured.log_stats();
        self.full_url.log_stats();
    }
}

impl<P: PoolProvider, L: std::fmt::Debug> std::fmt::Debug for ConnectionFacade<P, L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionFacade")
            .field("loader", &self.loader)
            .field("structured", &self.structured)
            .field("full_url", &self.full_url)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::PoolStatus;
    use adspool_core::{AdsPoolError, ErrorKind, StaticDefaults};
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct MockProvider {
        creations: AtomicU32,
    }

    impl PoolProvider for MockProvider {
        type Pool = String;
        type Connection = String;

        fn create_pool(&self, address: &str, _settings: &PoolSettings) -> Result<String, String> {
            self.creations.fetch_add(1, Ordering::SeqCst);
            Ok(address.to_string())
        }

        fn borrow(&self, pool: &String) -> Result<String, String> {
            Ok(pool.clone())
        }

        fn status(&self, _pool: &String) -> PoolStatus {
            PoolStatus::default()
        }
    }

    fn base_defaults() -> ConnectionConfig {
        ConnectionConfig::new("srv1", "/data/db.add").with_socket("6262")
    }

    fn facade(defaults: ConnectionConfig) -> ConnectionFacade<MockProvider, StaticDefaults> {
        ConnectionFacade::new(
            MockProvider::default(),
            StaticDefaults::new(defaults),
            PoolSettings::default(),
        )
    }

    const ADDRESS_PREFIX: &str = "jdbc:extendedsystems:advantage://";

    struct MissingDefaults;

    impl DefaultsLoader for MissingDefaults {
        fn load_defaults(&self) -> AdsPoolResult<ConnectionConfig> {
            Err(AdsPoolError::NotFound {
                local: PathBuf::from("resources/config/adsConnection.toml"),
                resource: PathBuf::from("config/adsConnection.toml"),
            })
        }
    }

    // ── Default ─────────────────────────────────────────────────────

    #[test]
    fn connect_default_uses_loaded_config() {
        let facade = facade(base_defaults());
        let conn = facade.connect_default().unwrap();
        assert_eq!(
            conn,
            format!("{ADDRESS_PREFIX}srv1:6262/data/db.add;LockType=proprietary;CharType=ansi;TableType=adt")
        );
    }

    #[test]
    fn connect_default_propagates_not_found() {
        let facade = ConnectionFacade::new(
            MockProvider::default(),
            MissingDefaults,
            PoolSettings::default(),
        );
        let err = facade.connect_default().unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[test]
    fn repeated_default_connects_share_pool() {
        let facade = facade(base_defaults());
        facade.connect_default().unwrap();
        facade.connect_default().unwrap();
        assert_eq!(facade.registry().len(), 1);
    }

    // ── Explicit config ─────────────────────────────────────────────

    #[test]
    fn explicit_config_is_validated_before_loading() {
        let facade = ConnectionFacade::new(
            MockProvider::default(),
            MissingDefaults,
            PoolSettings::default(),
        );
        let config = ConnectionConfig {
            database_dictionary: Some("/x.add".to_string()),
            ..ConnectionConfig::default()
        };
        let err = facade.connect_with_config(config).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn complete_config_bypasses_loader() {
        let facade = ConnectionFacade::new(
            MockProvider::default(),
            MissingDefaults,
            PoolSettings::default(),
        );
        let config = ConnectionConfig::new("srv2", "/y.add")
            .with_socket("7000")
            .with_lock_type("compatible")
            .with_char_type("oem")
            .with_table_type("cdx");
        let conn = facade.connect_with_config(config).unwrap();
        assert!(conn.ends_with("srv2:7000/y.add;LockType=compatible;CharType=oem;TableType=cdx"));
    }

    #[test]
    fn partial_config_takes_defaults_for_gaps() {
        let facade = facade(base_defaults().with_lock_type("compatible"));
        let conn = facade
            .connect_with_config(ConnectionConfig::new("srv9", "/z.add"))
            .unwrap();
        assert!(conn.ends_with("srv9:6262/z.add;LockType=compatible;CharType=ansi;TableType=adt"));
    }

    // ── Dictionary / mandant ────────────────────────────────────────

    #[test]
    fn dictionary_suffixes_do_not_interfere() {
        let facade = facade(base_defaults());
        let a = facade.resolve(&Target::Dictionary("A".to_string())).unwrap();
        let b = facade.resolve(&Target::Dictionary("B".to_string())).unwrap();

        let dict_a = a.config.database_dictionary.unwrap();
        let dict_b = b.config.database_dictionary.unwrap();
        assert_eq!(dict_a, "/data/db.addA");
        assert_eq!(dict_b, "/data/db.addB");
        assert!(!dict_b.contains("addA"));

        facade.connect_to_dictionary("A").unwrap();
        facade.connect_to_dictionary("B").unwrap();
        assert_eq!(facade.registry().len(), 2);
        assert_eq!(
            facade.loader().snapshot().database_dictionary.as_deref(),
            Some("/data/db.add")
        );
    }

    #[test]
    fn dictionary_without_base_uses_empty_prefix() {
        let defaults = ConnectionConfig {
            database_dictionary: None,
            ..base_defaults()
        };
        let facade = facade(defaults);
        let conn = facade.connect_to_dictionary("GUSTINI").unwrap();
        assert!(conn.contains("srv1:6262GUSTINI;LockType="));
    }

    #[test]
    fn mandant_without_base_is_config_error() {
        let defaults = ConnectionConfig {
            database_dictionary: None,
            ..base_defaults()
        };
        let facade = facade(defaults);
        let err = facade.connect_to_mandant("M01").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(facade.registry().is_empty());
    }

    #[test]
    fn mandant_appends_to_dictionary() {
        let facade = facade(base_defaults());
        let conn = facade.connect_to_mandant("\\M01").unwrap();
        assert!(conn.contains("/data/db.add\\M01;"));
    }

    #[test]
    fn mandant_and_dictionary_with_same_suffix_share_pool() {
        let facade = facade(base_defaults());
        let a = facade.pool_for(&Target::Mandant("X".to_string())).unwrap();
        let b = facade.pool_for(&Target::Dictionary("X".to_string())).unwrap();
        assert!(Arc::ptr_eq(&a, &b));
    }

    // ── Full URL ────────────────────────────────────────────────────

    #[test]
    fn full_url_appends_type_properties() {
        let facade = facade(base_defaults().with_char_type("oem"));
        let url = "jdbc:extendedsystems:advantage://srv3:6262/other/db.add";
        let conn = facade.connect_to_full_url(url).unwrap();
        assert_eq!(conn, format!("{url};LockType=proprietary;CharType=oem;TableType=adt"));
    }

    #[test]
    fn full_url_scope_is_separate() {
        let facade = facade(base_defaults());
        let url = format!("{ADDRESS_PREFIX}srv1:6262/data/db.add");
        facade.connect_to_full_url(&url).unwrap();
        facade.connect_to_full_url(&url).unwrap();
        facade.connect_default().unwrap();

        assert_eq!(facade.full_url_registry().len(), 1);
        assert_eq!(facade.registry().len(), 1);
        assert_eq!(facade.full_url_registry().scope(), "full-url");
    }

    #[test]
    fn resolve_full_url_reports_scope() {
        let facade = facade(base_defaults());
        let resolution = facade
            .resolve(&Target::FullUrl("srv4:6262/db".to_string()))
            .unwrap();
        assert_eq!(resolution.scope, Scope::FullUrl);
        assert_eq!(
            resolution.key.as_str(),
            "srv4:6262/db;LockType=proprietary;CharType=ansi;TableType=adt"
        );
        assert!(resolution.config.host.is_none());
        assert!(resolution.key.is_verbatim());
        assert_eq!(resolution.key.address(), resolution.key.as_str());
    }
}
