//! ConnectionConfig — validation, default filling and canonicalization.
//!
//! A config carries the six connection parameters as optional strings. It
//! is valid once `HOST` and `DATABASE_DICTIONARY` are present; the other four
//! are filled from the loaded defaults before a [`CanonicalKey`] is derived.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{AdsPoolError, AdsPoolResult};
use crate::key::CanonicalKey;
use crate::keys;

/// Connection parameters for one logical target.
///
/// Serialized field names are the stable parameter names from [`keys`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    #[serde(rename = "HOST", default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(rename = "SOCKET", default, skip_serializing_if = "Option::is_none")]
    pub socket: Option<String>,
    #[serde(rename = "DATABASE_DICTIONARY", default, skip_serializing_if = "Option::is_none")]
    pub database_dictionary: Option<String>,
    #[serde(rename = "LOCK_TYPE", default, skip_serializing_if = "Option::is_none")]
    pub lock_type: Option<String>,
    #[serde(rename = "CHAR_TYPE", default, skip_serializing_if = "Option::is_none")]
    pub char_type: Option<String>,
    #[serde(rename = "TABLE_TYPE", default, skip_serializing_if = "Option::is_none")]
    pub table_type: Option<String>,
}

impl ConnectionConfig {
    /// Config with the two required keys set.
    pub fn new(host: impl Into<String>, database_dictionary: impl Into<String>) -> Self {
        Self {
            host: Some(host.into()),
            database_dictionary: Some(database_dictionary.into()),
            ..Self::default()
        }
    }

    /// Build from a loosely-typed parameter map. Unknown keys are ignored.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |name: &str| map.get(name).cloned();
        Self {
            host: get(keys::HOST),
            socket: get(keys::SOCKET),
            database_dictionary: get(keys::DATABASE_DICTIONARY),
            lock_type: get(keys::LOCK_TYPE),
            char_type: get(keys::CHAR_TYPE),
            table_type: get(keys::TABLE_TYPE),
        }
    }

    /// Present parameters keyed by their stable names.
    pub fn to_map(&self) -> BTreeMap<&'static str, String> {
        [
            (keys::HOST, &self.host),
            (keys::SOCKET, &self.socket),
            (keys::DATABASE_DICTIONARY, &self.database_dictionary),
            (keys::LOCK_TYPE, &self.lock_type),
            (keys::CHAR_TYPE, &self.char_type),
            (keys::TABLE_TYPE, &self.table_type),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.clone().map(|v| (name, v)))
        .collect()
    }

    pub fn with_socket(self, socket: impl Into<String>) -> Self {
        Self {
            socket: Some(socket.into()),
            ..self
        }
    }

    pub fn with_lock_type(self, lock_type: impl Into<String>) -> Self {
        Self {
            lock_type: Some(lock_type.into()),
            ..self
        }
    }

    pub fn with_char_type(self, char_type: impl Into<String>) -> Self {
        Self {
            char_type: Some(char_type.into()),
            ..self
        }
    }

    pub fn with_table_type(self, table_type: impl Into<String>) -> Self {
        Self {
            table_type: Some(table_type.into()),
            ..self
        }
    }

    /// Look up a parameter by its stable name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.field(name).and_then(|v| v.as_deref())
    }

    fn field(&self, name: &str) -> Option<&Option<String>> {
        match name {
            keys::HOST => Some(&self.host),
            keys::SOCKET => Some(&self.socket),
            keys::DATABASE_DICTIONARY => Some(&self.database_dictionary),
            keys::LOCK_TYPE => Some(&self.lock_type),
            keys::CHAR_TYPE => Some(&self.char_type),
            keys::TABLE_TYPE => Some(&self.table_type),
            _ => None,
        }
    }

    fn field_mut(&mut self, name: &str) -> Option<&mut Option<String>> {
        match name {
            keys::HOST => Some(&mut self.host),
            keys::SOCKET => Some(&mut self.socket),
            keys::DATABASE_DICTIONARY => Some(&mut self.database_dictionary),
            keys::LOCK_TYPE => Some(&mut self.lock_type),
            keys::CHAR_TYPE => Some(&mut self.char_type),
            keys::TABLE_TYPE => Some(&mut self.table_type),
            _ => None,
        }
    }

    /// True iff `HOST` and `DATABASE_DICTIONARY` are present. Empty values count.
    pub fn is_valid(&self) -> bool {
        self.host.is_some() && self.database_dictionary.is_some()
    }

    /// Like [`is_valid`](Self::is_valid), but names the missing keys.
    pub fn validate(&self) -> AdsPoolResult<()> {
        let missing: Vec<&str> = [
            (keys::HOST, self.host.is_none()),
            (keys::DATABASE_DICTIONARY, self.database_dictionary.is_none()),
        ]
        .into_iter()
        .filter_map(|(name, absent)| absent.then_some(name))
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AdsPoolError::Config(format!(
                "missing required key(s): {}",
                missing.join(", ")
            )))
        }
    }

    /// Whether any defaultable key is absent.
    pub fn needs_defaults(&self) -> bool {
        keys::DEFAULTED_KEYS
            .iter()
            .any(|name| self.get(name).is_none())
    }

    /// Copy `SOCKET`, `LOCK_TYPE`, `CHAR_TYPE` and `TABLE_TYPE` from `defaults`
    /// where absent here. Never overwrites a value that is already set.
    pub fn apply_defaults(&mut self, defaults: &ConnectionConfig) {
        for name in keys::DEFAULTED_KEYS {
            let fallback = defaults.field(name).cloned().flatten();
            if let Some(slot) = self.field_mut(name) {
                if slot.is_none() {
                    *slot = fallback;
                }
            }
        }
    }

    /// Fill the fallback literals for lock, char and table type if absent.
    pub fn with_fallback_literals(mut self) -> Self {
        self.lock_type
            .get_or_insert_with(|| keys::DEFAULT_LOCK_TYPE.to_string());
        self.char_type
            .get_or_insert_with(|| keys::DEFAULT_CHAR_TYPE.to_string());
        self.table_type
            .get_or_insert_with(|| keys::DEFAULT_TABLE_TYPE.to_string());
        self
    }

    /// Render the canonical key. Absent fields render as empty strings.
    pub fn canonical_key(&self) -> CanonicalKey {
        let part = |v: &Option<String>| v.clone().unwrap_or_default();
        CanonicalKey::from_raw(format!(
            "{}:{}{};LockType={};CharType={};TableType={}",
            part(&self.host),
            part(&self.socket),
            part(&self.database_dictionary),
            part(&self.lock_type),
            part(&self.char_type),
            part(&self.table_type),
        ))
    }

    /// Validate, fill defaults, and derive the key in one step.
    ///
    /// Nothing is defaulted when validation fails.
    pub fn normalize(mut self, defaults: &ConnectionConfig) -> AdsPoolResult<(Self, CanonicalKey)> {
        self.validate()?;
        self.apply_defaults(defaults);
        let key = self.canonical_key();
        Ok((self, key))
    }

    /// Copy with `suffix` appended to the dictionary path. An absent
    /// dictionary is treated as empty.
    pub fn with_dictionary_suffix(&self, suffix: &str) -> Self {
        let mut derived = self.clone();
        let base = derived.database_dictionary.take().unwrap_or_default();
        derived.database_dictionary = Some(base + suffix);
        derived
    }

    /// Copy with a tenant suffix appended to the dictionary path.
    ///
    /// Unlike [`with_dictionary_suffix`](Self::with_dictionary_suffix), an
    /// absent base dictionary is a configuration error.
    pub fn with_mandant_suffix(&self, mandant: &str) -> AdsPoolResult<Self> {
        let base = self.database_dictionary.as_deref().ok_or_else(|| {
            AdsPoolError::Config(format!(
                "cannot append mandant {mandant:?}: {} is not set in the default configuration",
                keys::DATABASE_DICTIONARY
            ))
        })?;
        Ok(Self {
            database_dictionary: Some(format!("{base}{mandant}")),
            ..self.clone()
        })
    }

    /// `;LockType=..;CharType=..;TableType=..` suffix for composed addresses.
    pub fn dsn_properties(&self) -> String {
        let part = |v: &Option<String>| v.clone().unwrap_or_default();
        format!(
            ";LockType={};CharType={};TableType={}",
            part(&self.lock_type),
            part(&self.char_type),
            part(&self.table_type),
        )
    }
}
