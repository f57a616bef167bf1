use std::collections::BTreeMap;

use adspool_core::DefaultsLoader;

/// Render the loaded defaults as TOML (under their table name) or JSON.
pub fn render(loader: &dyn DefaultsLoader, format: &str) -> anyhow::Result<String> {
    let config = loader.load_defaults()?;
    match format {
        "json" => Ok(serde_json::to_string_pretty(&config)?),
        _ => {
            let table = BTreeMap::from([(adspool_core::defaults::DEFAULT_SECTION_NAME, &config)]);
            Ok(toml::to_string_pretty(&table)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adspool_core::{ConnectionConfig, StaticDefaults};

    fn loader() -> StaticDefaults {
        StaticDefaults::new(ConnectionConfig::new("srv1", "/data/db.add").with_socket("6262"))
    }

    #[test]
    fn renders_toml_with_stable_names() {
        let out = render(&loader(), "toml").unwrap();
        assert!(out.contains("[ADS_CONNECTION]"));
        assert!(out.contains("HOST = \"srv1\""));
        assert!(out.contains("LOCK_TYPE = \"proprietary\""));
    }

    #[test]
    fn renders_json() {
        let out = render(&loader(), "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["SOCKET"], "6262");
        assert_eq!(value["TABLE_TYPE"], "adt");
    }
}
