//! Default configuration loading.
//!
//! Defaults come from a TOML file holding an `[ADS_CONNECTION]` table with
//! string values keyed by the stable parameter names:
//!
//! ```toml
//! [ADS_CONNECTION]
//! HOST = "srv1"
//! SOCKET = "6262"
//! DATABASE_DICTIONARY = "/data/db.add"
//! LOCK_TYPE = "proprietary"
//! ```
//!
//! Two locations are tried in order: a path relative to the working
//! directory, then a path beneath the packaged resource root.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::error::{AdsPoolError, AdsPoolResult};
use crate::ADSPOOL_VERSION;

/// Local lookup path, relative to the working directory.
pub const DEFAULT_CONFIG_FILE_PATH: &str = "resources/config/adsConnection.toml";

/// Lookup path relative to the resource root.
pub const DEFAULT_CONFIG_FILE_PATH_IN_RESOURCES: &str = "config/adsConnection.toml";

/// Table holding the connection parameters.
pub const DEFAULT_SECTION_NAME: &str = "ADS_CONNECTION";

/// Environment variable overriding the resource root.
pub const RESOURCE_DIR_ENV: &str = "ADSPOOL_RESOURCE_DIR";

/// Source of the process's default configuration.
///
/// Implementations return a fresh owned copy on every call, so callers may
/// mutate the result without affecting later loads. `LOCK_TYPE`,
/// `CHAR_TYPE` and `TABLE_TYPE` are always populated.
pub trait DefaultsLoader: Send + Sync {
    fn load_defaults(&self) -> AdsPoolResult<ConnectionConfig>;
}

/// File-backed loader with a local and a packaged lookup location.
#[derive(Clone, Debug)]
pub struct FileDefaultsLoader {
    local_path: PathBuf,
    resource_path: PathBuf,
    section: String,
}

impl FileDefaultsLoader {
    pub fn new(local_path: impl Into<PathBuf>, resource_path: impl Into<PathBuf>) -> Self {
        Self {
            local_path: local_path.into(),
            resource_path: resource_path.into(),
            section: DEFAULT_SECTION_NAME.to_string(),
        }
    }

    /// Loader for the standard locations.
    ///
    /// The resource root is `$ADSPOOL_RESOURCE_DIR`, else the directory of
    /// the running executable.
    pub fn standard() -> Self {
        let resource_root = std::env::var_os(RESOURCE_DIR_ENV)
            .map(PathBuf::from)
            .or_else(|| {
                std::env::current_exe()
                    .ok()
                    .and_then(|exe| exe.parent().map(Path::to_path_buf))
            })
            .unwrap_or_default();
        Self::new(
            DEFAULT_CONFIG_FILE_PATH,
            resource_root.join(DEFAULT_CONFIG_FILE_PATH_IN_RESOURCES),
        )
    }

    /// Builder method: read a different table.
    pub fn with_section(self, section: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            ..self
        }
    }

    pub fn local_path(&self) -> &Path {
        &self.local_path
    }

    pub fn resource_path(&self) -> &Path {
        &self.resource_path
    }

    /// First existing lookup location.
    pub fn locate(&self) -> AdsPoolResult<&Path> {
        if self.local_path.is_file() {
            info!(
                version = ADSPOOL_VERSION,
                path = %self.local_path.display(),
                "reading defaults from local path"
            );
            Ok(&self.local_path)
        } else if self.resource_path.is_file() {
            info!(
                version = ADSPOOL_VERSION,
                path = %self.resource_path.display(),
                "reading defaults from resources"
            );
            Ok(&self.resource_path)
        } else {
            Err(AdsPoolError::NotFound {
                local: self.local_path.clone(),
                resource: self.resource_path.clone(),
            })
        }
    }

    /// Parse the configured table out of TOML `content`.
    pub fn parse(&self, path: &Path, content: &str) -> AdsPoolResult<ConnectionConfig> {
        let parse_err = |message: String| AdsPoolError::Parse {
            path: path.to_path_buf(),
            message,
        };

        let document: toml::Table = toml::from_str(content).map_err(|e| parse_err(e.to_string()))?;
        let section = document
            .get(&self.section)
            .and_then(toml::Value::as_table)
            .ok_or_else(|| parse_err(format!("missing [{}] table", self.section)))?;

        let mut params = HashMap::with_capacity(section.len());
        for (name, value) in section {
            let rendered = match value {
                toml::Value::String(s) => s.clone(),
                toml::Value::Integer(i) => i.to_string(),
                toml::Value::Float(f) => f.to_string(),
                toml::Value::Boolean(b) => b.to_string(),
                other => {
                    return Err(parse_err(format!(
                        "{name} must be a scalar, found {}",
                        other.type_str()
                    )));
                }
            };
            params.insert(name.clone(), rendered);
        }

        Ok(ConnectionConfig::from_map(&params).with_fallback_literals())
    }
}

impl DefaultsLoader for FileDefaultsLoader {
    fn load_defaults(&self) -> AdsPoolResult<ConnectionConfig> {
        let path = self.locate()?;
        let content = std::fs::read_to_string(path).map_err(|e| AdsPoolError::Parse {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = self.parse(path, &content)?;
        debug!(section = %self.section, "default configuration loaded");
        Ok(config)
    }
}

/// In-memory defaults, for embedding applications and tests.
#[derive(Clone, Debug, Default)]
pub struct StaticDefaults {
    config: ConnectionConfig,
}

impl StaticDefaults {
    pub fn new(config: ConnectionConfig) -> Self {
        Self {
            config: config.with_fallback_literals(),
        }
    }

    /// The snapshot every load is copied from.
    pub fn snapshot(&self) -> &ConnectionConfig {
        &self.config
    }
}

impl DefaultsLoader for StaticDefaults {
    fn load_defaults(&self) -> AdsPoolResult<ConnectionConfig> {
        Ok(self.config.clone())
    }
}
