//! Context enrichment from JSON request bodies.
//!
//! [`PropertyExtractor`] parses a body into a generic JSON tree and copies a
//! fixed set of top-level fields into the request's [`ContextStore`].
//! Enrichment is best effort: an empty or malformed body yields no entries
//! and never fails the request.

use hestia_core::{ContextKey, ContextStore};
use serde_json::Value;
use std::collections::HashSet;

/// Copies well-known top-level JSON fields into a [`ContextStore`].
///
/// # Example
///
/// ```
/// use hestia_core::ContextStore;
/// use hestia_middleware::extract::PropertyExtractor;
///
/// let mut store = ContextStore::new();
/// let body = br#"{"clientId":"12345","transactionId":"abcde","otherProperty":"ignored"}"#;
///
/// let found = PropertyExtractor::default().extract(body, &mut store);
///
/// assert_eq!(found, 2);
/// assert_eq!(store.get("clientId").unwrap(), Some("12345"));
/// assert_eq!(store.get("otherProperty").unwrap(), None);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyExtractor {
    keys: Vec<String>,
}

impl Default for PropertyExtractor {
    fn default() -> Self {
        Self::new(ContextKey::ALL.map(ContextKey::as_str))
    }
}

impl PropertyExtractor {
    /// Creates an extractor for the given field names.
    ///
    /// Blank names are dropped and repeated names are kept once, at their
    /// first position.
    #[must_use]
    pub fn new(keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        let mut seen = HashSet::new();
        let keys = keys
            .into_iter()
            .map(Into::into)
            .filter(|key: &String| !key.trim().is_empty() && seen.insert(key.clone()))
            .collect();
        Self { keys }
    }

    /// Returns the field names this extractor looks for.
    #[must_use]
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Returns the `(key, value)` pairs found in `body`, in configured key order.
    ///
    /// Only top-level members of a JSON object are considered. Absent and
    /// `null` members are skipped. Strings are taken verbatim; any other
    /// value uses its compact JSON text.
    #[must_use]
    pub fn find(&self, body: &[u8]) -> Vec<(String, String)> {
        if body.is_empty() {
            return Vec::new();
        }

        let document: Value = match serde_json::from_slice(body) {
            Ok(document) => document,
            Err(error) => {
                tracing::warn!(%error, "request body is not valid JSON, skipping context enrichment");
                return Vec::new();
            }
        };

        let Some(object) = document.as_object() else {
            tracing::debug!("request body is not a JSON object, skipping context enrichment");
            return Vec::new();
        };

        self.keys
            .iter()
            .filter_map(|key| match object.get(key) {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) => Some((key.clone(), s.clone())),
                Some(other) => Some((key.clone(), other.to_string())),
            })
            .collect()
    }

    /// Parses `body` and writes every match into `store`.
    ///
    /// Returns the number of entries written.
    pub fn extract(&self, body: &[u8], store: &mut ContextStore) -> usize {
        let mut written = 0;
        for (key, value) in self.find(body) {
            match store.put(key.as_str(), value) {
                Ok(_) => {
                    tracing::debug!(context_key = %key, "request context enriched from body");
                    written += 1;
                }
                Err(error) => {
                    tracing::warn!(context_key = %key, %error, "failed to store context entry");
                }
            }
        }
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(body: &str) -> ContextStore {
        let mut store = ContextStore::new();
        PropertyExtractor::default().extract(body.as_bytes(), &mut store);
        store
    }

    #[test]
    fn test_extracts_interesting_keys_only() {
        let store =
            extract(r#"{"clientId":"12345","transactionId":"abcde","otherProperty":"ignored"}"#);

        assert_eq!(store.get("clientId").unwrap(), Some("12345"));
        assert_eq!(store.get("transactionId").unwrap(), Some("abcde"));
        assert_eq!(store.get("otherProperty").unwrap(), None);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_empty_and_blank_documents() {
        assert!(extract("").is_empty());
        assert!(extract("{}").is_empty());
        assert!(extract("[]").is_empty());
        assert!(extract(r#""clientId""#).is_empty());
    }

    #[test]
    fn test_malformed_body_is_ignored() {
        assert!(extract(r#"{"clientId": "12345""#).is_empty());
        assert!(extract("clientId=12345").is_empty());
    }

    #[test]
    fn test_null_and_absent_values_are_skipped() {
        let store = extract(r#"{"clientId":null,"somethingElse":1}"#);
        assert!(store.is_empty());
    }

    #[test]
    fn test_non_string_values_are_stringified() {
        let store = extract(r#"{"clientId":12345,"transactionId":{"id":7}}"#);
        assert_eq!(store.get("clientId").unwrap(), Some("12345"));
        assert_eq!(store.get("transactionId").unwrap(), Some(r#"{"id":7}"#));
    }

    #[test]
    fn test_nested_keys_are_not_considered() {
        let store = extract(r#"{"payload":{"clientId":"12345"}}"#);
        assert!(store.is_empty());
    }

    #[test]
    fn test_custom_keys_drop_blanks() {
        let extractor = PropertyExtractor::new(["tenantId", "  ", ""]);
        assert_eq!(extractor.keys(), ["tenantId".to_string()]);

        let found = extractor.find(br#"{"tenantId":"t-1","clientId":"c-1"}"#);
        assert_eq!(found, vec![("tenantId".to_string(), "t-1".to_string())]);
    }

    #[test]
    fn test_repeated_keys_are_kept_once() {
        let extractor = PropertyExtractor::new(["tenantId", "clientId", "tenantId"]);
        assert_eq!(extractor.keys(), ["tenantId", "clientId"]);

        let mut store = ContextStore::new();
        let written = extractor.extract(br#"{"clientId":"c-1","tenantId":"t-1"}"#, &mut store);
        assert_eq!(written, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(
            extractor.find(br#"{"clientId":"c-1","tenantId":"t-1"}"#),
            vec![
                ("tenantId".to_string(), "t-1".to_string()),
                ("clientId".to_string(), "c-1".to_string()),
            ]
        );
    }

    #[test]
    fn test_default_keys_match_registry() {
        let extractor = PropertyExtractor::default();
        assert_eq!(extractor.keys(), ["clientId", "transactionId"]);
    }
}
