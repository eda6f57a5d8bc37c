//! Configuration schema types.
//!
//! This module defines the structure of all configuration sections.

use hestia_core::ContextKey;
use hestia_telemetry::LogFormat;
use serde::{Deserialize, Serialize};

/// HTTP handling section.
///
/// # Example
///
/// ```
/// use hestia_config::HttpConfig;
///
/// let config = HttpConfig::default();
/// assert_eq!(config.allowed_methods, ["GET", "POST", "PUT", "PATCH", "DELETE"]);
/// assert_eq!(config.content_language, "en");
/// assert!(config.request_timeout_ms.is_none());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct HttpConfig {
    /// Methods the service accepts. Anything else is rejected with 405.
    #[serde(default = "default_allowed_methods")]
    pub allowed_methods: Vec<String>,

    /// `Content-Language` of problem responses.
    #[serde(default = "default_content_language")]
    pub content_language: String,

    /// Handler timeout in milliseconds. None disables the timeout.
    #[serde(default)]
    pub request_timeout_ms: Option<u64>,

    /// Put the real message of unclassified failures in problem details.
    ///
    /// Development only.
    #[serde(default)]
    pub expose_internal_errors: bool,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            allowed_methods: default_allowed_methods(),
            content_language: default_content_language(),
            request_timeout_ms: None,
            expose_internal_errors: false,
        }
    }
}

fn default_allowed_methods() -> Vec<String> {
    ["GET", "POST", "PUT", "PATCH", "DELETE"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_content_language() -> String {
    "en".to_string()
}

/// Request context section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ContextConfig {
    /// Copy well-known fields from JSON `POST` bodies into the context.
    #[serde(default = "default_true")]
    pub body_introspection_enabled: bool,

    /// Only paths starting with this prefix are introspected.
    #[serde(default = "default_path_prefix")]
    pub body_introspection_path_prefix: String,

    /// Top-level body fields copied into the context.
    #[serde(default = "default_context_keys")]
    pub keys: Vec<String>,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            body_introspection_enabled: true,
            body_introspection_path_prefix: default_path_prefix(),
            keys: default_context_keys(),
        }
    }
}

fn default_path_prefix() -> String {
    "/".to_string()
}

fn default_context_keys() -> Vec<String> {
    ContextKey::ALL
        .into_iter()
        .map(|key| key.as_str().to_string())
        .collect()
}

/// Logging section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Enable logging.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level filter (e.g., "info", "hestia_middleware=debug").
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Include file and line in log events.
    #[serde(default)]
    pub include_location: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: LogFormat::Json,
            include_location: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
