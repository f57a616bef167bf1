use adspool_core::DefaultsLoader;
use adspool_pool::{Scope, Target};

/// Resolve `target` without contacting a server and describe the result.
pub fn render(target: &Target, loader: &dyn DefaultsLoader, format: &str) -> anyhow::Result<String> {
    let resolution = adspool_pool::resolve(target, loader)?;
    let scope = match resolution.scope {
        Scope::Structured => "structured",
        Scope::FullUrl => "full-url",
    };

    match format {
        "json" => Ok(serde_json::to_string_pretty(&serde_json::json!({
            "scope": scope,
            "key": resolution.key.as_str(),
            "address": resolution.key.address(),
            "pool_name": resolution.key.pool_name(),
            "config": resolution.config,
        }))?),
        _ => Ok(format!(
            "scope:   {scope}\nkey:     {}\naddress: {}\npool:    {}",
            resolution.key,
            resolution.key.address(),
            resolution.key.pool_name(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use adspool_core::{ConnectionConfig, FileDefaultsLoader};

    fn write_defaults(dir: &std::path::Path) -> FileDefaultsLoader {
        let path = dir.join("adsConnection.toml");
        std::fs::write(
            &path,
            "[ADS_CONNECTION]\nHOST = \"srv1\"\nSOCKET = \"6262\"\nDATABASE_DICTIONARY = \"/data/db.add\"\n",
        )
        .unwrap();
        FileDefaultsLoader::new(path, dir.join("missing.toml"))
    }

    #[test]
    fn text_output_shows_key_and_address() {
        let dir = tempfile::tempdir().unwrap();
        let loader = write_defaults(dir.path());
        let out = render(&Target::Default, &loader, "text").unwrap();
        assert!(out.contains(
            "key:     srv1:6262/data/db.add;LockType=proprietary;CharType=ansi;TableType=adt"
        ));
        assert!(out.contains("address: jdbc:extendedsystems:advantage://srv1:6262"));
        assert!(out.contains("pool:    AdsConnectionPool-"));
    }

    #[test]
    fn json_output_for_mandant() {
        let dir = tempfile::tempdir().unwrap();
        let loader = write_defaults(dir.path());
        let out = render(&Target::Mandant("M01".to_string()), &loader, "json").unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["scope"], "structured");
        assert_eq!(value["config"]["DATABASE_DICTIONARY"], "/data/db.addM01");
    }

    #[test]
    fn invalid_config_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let loader = write_defaults(dir.path());
        let target = Target::Config(ConnectionConfig {
            host: Some("srv2".to_string()),
            ..ConnectionConfig::default()
        });
        let err = render(&target, &loader, "text").unwrap_err();
        assert!(err.to_string().contains("DATABASE_DICTIONARY"));
    }
}
