//! Secure secret types with automatic memory zeroing
//!
//! This module provides types for handling secrets securely in memory:
//! - [`SecureSecret`]: A wrapper around `secrecy::SecretString` that auto-zeros on drop
//! - [`SecretBundle`]: The fetched secrets of one run, keyed by output name

use secrecy::{ExposeSecret, SecretString};
use serde::ser::{Serialize, SerializeStruct, Serializer};
use std::collections::BTreeMap;

/// A fetched secret value with automatic memory zeroing on drop.
///
/// This type wraps `secrecy::SecretString` to ensure:
/// - Secret values are zeroed from memory when dropped
/// - Debug output shows `[REDACTED]` instead of the actual value
/// - Explicit `.expose()` call required to access the value
#[derive(Clone)]
pub struct SecureSecret {
    inner: SecretString,
}

impl SecureSecret {
    /// Create a new secure secret from a string.
    ///
    /// The string value is moved into secure storage and will be
    /// automatically zeroed when this `SecureSecret` is dropped.
    #[must_use]
    pub fn new(value: String) -> Self {
        Self {
            inner: SecretString::from(value),
        }
    }

    /// Expose the secret value for use.
    ///
    /// The exposed value must never reach a log line.
    #[must_use]
    pub fn expose(&self) -> &str {
        self.inner.expose_secret()
    }

    /// Get the length of the secret value without exposing it.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.expose_secret().len()
    }

    /// Check if the secret value is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.expose_secret().is_empty()
    }
}

impl From<&str> for SecureSecret {
    fn from(value: &str) -> Self {
        Self::new(value.to_string())
    }
}

impl std::fmt::Debug for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl std::fmt::Display for SecureSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("[REDACTED]")
    }
}

/// Secrets fetched during one run, keyed by output name.
///
/// Only successfully fetched secrets are ever inserted, so a key that is
/// absent means the fetch for it failed. Values are zeroed when the bundle
/// is dropped.
///
/// Serializes as a single `secrets` mapping with the values exposed:
///
/// ```yaml
/// secrets:
///   DB_PASSWORD: hunter2
/// ```
#[derive(Default, Clone)]
pub struct SecretBundle {
    /// Output key -> secure value
    secrets: BTreeMap<String, SecureSecret>,
}

impl SecretBundle {
    /// Create an empty bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a secret under `key`.
    ///
    /// Returns the previous value when the key was already present; the new
    /// value always wins.
    pub fn insert(&mut self, key: String, value: SecureSecret) -> Option<SecureSecret> {
        self.secrets.insert(key, value)
    }

    /// Get a secret by output key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&SecureSecret> {
        self.secrets.get(key)
    }

    /// Check if the bundle contains a secret.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.secrets.contains_key(key)
    }

    /// Check if the bundle is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }

    /// Get the number of secrets in the bundle.
    #[must_use]
    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    /// Iterate over output keys in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.secrets.keys()
    }
}

impl std::fmt::Debug for SecretBundle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretBundle")
            .field("count", &self.secrets.len())
            .field("keys", &self.secrets.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Serialize for SecretBundle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("SecretBundle", 1)?;
        state.serialize_field("secrets", &ExposedSecrets(&self.secrets))?;
        state.end()
    }
}

struct ExposedSecrets<'a>(&'a BTreeMap<String, SecureSecret>);

impl Serialize for ExposedSecrets<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value.expose())))
    }
}
