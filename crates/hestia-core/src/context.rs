//! Request-scoped diagnostic context.
//!
//! The [`ContextStore`] is the per-request key/value store used to correlate
//! log output with a single inbound request (client ID, transaction ID, and
//! similar identifiers). It is owned by exactly one request and is threaded
//! through the middleware pipeline explicitly; it is never stored in a
//! global or thread-local slot.
//!
//! # Lifecycle
//!
//! - The underlying mapping is created lazily on the first [`put`](ContextStore::put).
//! - The pipeline clears the store both before and after a request is
//!   processed, so nothing survives into the next request.
//!
//! # Example
//!
//! ```
//! use hestia_core::{ContextKey, ContextStore};
//!
//! let mut store = ContextStore::new();
//! store.put_key(ContextKey::ClientId, "12345").unwrap();
//!
//! assert_eq!(store.get("clientId").unwrap(), Some("12345"));
//!
//! store.clear();
//! assert!(store.is_empty());
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Errors raised by misuse of the [`ContextStore`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The key was empty or consisted only of whitespace.
    #[error("context key must not be blank")]
    BlankKey,
}

/// Well-known context keys.
///
/// These are the keys the body introspection stage looks for in inbound
/// JSON payloads. The store itself accepts any non-blank key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ContextKey {
    /// Identifier of the calling client.
    #[serde(rename = "clientId")]
    ClientId,
    /// Identifier of the business transaction.
    #[serde(rename = "transactionId")]
    TransactionId,
}

impl ContextKey {
    /// Every registered key, in declaration order.
    pub const ALL: [ContextKey; 2] = [Self::ClientId, Self::TransactionId];

    /// Returns the wire name of this key.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientId => "clientId",
            Self::TransactionId => "transactionId",
        }
    }

    /// Looks up a registered key by its wire name.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == name)
    }
}

impl fmt::Display for ContextKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-request diagnostic key/value store.
///
/// Keys and values are strings. Blank keys are rejected with
/// [`ContextError::BlankKey`]. Overwriting an existing key is permitted but
/// logged at warning level, and the previous value is handed back to the
/// caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContextStore {
    /// `None` until the first write, and again after `clear()`.
    entries: Option<BTreeMap<String, String>>,
}

impl ContextStore {
    /// Creates an empty store. No mapping is allocated until the first write.
    #[must_use]
    pub const fn new() -> Self {
        Self { entries: None }
    }

    /// Stores `value` under `key`.
    ///
    /// Returns the previous value when the key was already present. That
    /// case indicates duplicate population within one request and is
    /// reported with a `warn!` event, but it is not an error.
    pub fn put(
        &mut self,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, ContextError> {
        let key = key.into();
        ensure_not_blank(&key)?;
        let value = value.into();

        let previous = self
            .entries
            .get_or_insert_with(BTreeMap::new)
            .insert(key.clone(), value);

        if let Some(previous) = &previous {
            tracing::warn!(
                context_key = %key,
                previous_value = %previous,
                "context key overwritten within a single request"
            );
        }

        Ok(previous)
    }

    /// Returns the value stored under `key`, if any.
    pub fn get(&self, key: &str) -> Result<Option<&str>, ContextError> {
        ensure_not_blank(key)?;
        Ok(self
            .entries
            .as_ref()
            .and_then(|entries| entries.get(key))
            .map(String::as_str))
    }

    /// Stores a value under a registered [`ContextKey`].
    pub fn put_key(
        &mut self,
        key: ContextKey,
        value: impl Into<String>,
    ) -> Result<Option<String>, ContextError> {
        self.put(key.as_str(), value)
    }

    /// Returns the value stored under a registered [`ContextKey`].
    #[must_use]
    pub fn get_key(&self, key: ContextKey) -> Option<&str> {
        self.entries
            .as_ref()
            .and_then(|entries| entries.get(key.as_str()))
            .map(String::as_str)
    }

    /// Returns `true` if `key` has a value.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries
            .as_ref()
            .is_some_and(|entries| entries.contains_key(key))
    }

    /// Removes every entry. Calling this on an empty store is a no-op.
    pub fn clear(&mut self) {
        self.entries = None;
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, BTreeMap::len)
    }

    /// Returns `true` if the store holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Iterates over the entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .flat_map(|entries| entries.iter())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ContextStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (key, value)) in self.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{key}={value}")?;
        }
        Ok(())
    }
}

fn ensure_not_blank(key: &str) -> Result<(), ContextError> {
    if key.trim().is_empty() {
        return Err(ContextError::BlankKey);
    }
    Ok(())
}
