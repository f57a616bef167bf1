//! CanonicalKey — pool identity derived from a connection config.

use std::fmt;

use sha2::{Digest, Sha256};

use crate::keys::ADDRESS_SCHEME;

/// Deterministic identity of a connection target.
///
/// Shape: `<host>:<socket><dictionary>;LockType=<l>;CharType=<c>;TableType=<t>`.
/// Configs agreeing on all six canonical fields produce equal keys; any
/// difference produces a different key. The driver address is the key with
/// [`ADDRESS_SCHEME`] prepended, see [`CanonicalKey::address`].
///
/// Keys built with [`CanonicalKey::from_address`] are already driver
/// addresses and are never prefixed, whatever their text looks like.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CanonicalKey {
    key: String,
    verbatim: bool,
}

impl CanonicalKey {
    /// Wrap a structured key; its address gets [`ADDRESS_SCHEME`] prepended.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self {
            key: raw.into(),
            verbatim: false,
        }
    }

    /// Wrap a caller-composed address used as the driver address unchanged.
    ///
    /// Identity of the full-URL scope.
    pub fn from_address(address: impl Into<String>) -> Self {
        Self {
            key: address.into(),
            verbatim: true,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.key
    }

    /// Whether the key is used as the driver address unchanged.
    pub fn is_verbatim(&self) -> bool {
        self.verbatim
    }

    /// Physical address handed to the driver.
    pub fn address(&self) -> String {
        if self.verbatim {
            self.key.clone()
        } else {
            format!("{ADDRESS_SCHEME}{}", self.key)
        }
    }

    /// Short diagnostic pool name: `AdsConnectionPool-` + 8 hex chars of SHA-256.
    pub fn pool_name(&self) -> String {
        let digest = Sha256::digest(self.key.as_bytes());
        format!("AdsConnectionPool-{}", &hex::encode(digest)[..8])
    }
}

impl fmt::Display for CanonicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

impl AsRef<str> for CanonicalKey {
    fn as_ref(&self) -> &str {
        &self.key
    }
}
