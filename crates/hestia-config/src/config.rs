//! Main configuration types.
//!
//! This module provides the top-level [`HestiaConfig`] struct and its builder.

use std::time::Duration;

use hestia_telemetry::{create_env_filter, LogConfig, LogFormat};
use http::{HeaderValue, Method};
use serde::{Deserialize, Serialize};

use crate::{ConfigError, ContextConfig, HttpConfig, LoggingConfig};

/// Method names accepted in `http.allowed_methods`.
pub const KNOWN_METHODS: [&str; 9] = [
    "GET", "HEAD", "POST", "PUT", "PATCH", "DELETE", "OPTIONS", "TRACE", "CONNECT",
];

/// Complete Hestia configuration.
///
/// Use [`ConfigLoader`](crate::ConfigLoader) to load configuration from files
/// and environment variables.
///
/// # Example
///
/// ```
/// use hestia_config::HestiaConfig;
///
/// let config = HestiaConfig::default();
/// assert_eq!(config.http.content_language, "en");
/// assert!(config.context.body_introspection_enabled);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(deny_unknown_fields)]
pub struct HestiaConfig {
    /// HTTP handling configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Request context configuration.
    #[serde(default)]
    pub context: ContextConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl HestiaConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> HestiaConfigBuilder {
        HestiaConfigBuilder::new()
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - `http.allowed_methods` is empty or names an unknown method
    /// - `http.content_language` is empty or not a valid header value
    /// - `http.request_timeout_ms` is zero
    /// - `context.body_introspection_path_prefix` does not start with `/`
    /// - `context.keys` contains a blank key
    /// - `logging.level` is not a valid filter directive
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.allowed_methods()?;

        let language = self.http.content_language.trim();
        if language.is_empty() || HeaderValue::from_str(language).is_err() {
            return Err(ConfigError::invalid_value(
                "http.content_language",
                format!("not a valid language tag: {:?}", self.http.content_language),
            ));
        }

        if self.http.request_timeout_ms == Some(0) {
            return Err(ConfigError::invalid_value(
                "http.request_timeout_ms",
                "must be greater than zero",
            ));
        }

        if !self.context.body_introspection_path_prefix.starts_with('/') {
            return Err(ConfigError::invalid_value(
                "context.body_introspection_path_prefix",
                "must start with '/'",
            ));
        }

        if self.context.keys.iter().any(|key| key.trim().is_empty()) {
            return Err(ConfigError::invalid_value(
                "context.keys",
                "keys must not be blank",
            ));
        }

        if self.logging.enabled {
            create_env_filter(&self.logging.level)
                .map_err(|e| ConfigError::invalid_value("logging.level", e.to_string()))?;
        }

        Ok(())
    }

    /// Returns the allowed methods, parsed.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the list is empty or contains
    /// a name outside [`KNOWN_METHODS`].
    pub fn allowed_methods(&self) -> Result<Vec<Method>, ConfigError> {
        if self.http.allowed_methods.is_empty() {
            return Err(ConfigError::invalid_value(
                "http.allowed_methods",
                "at least one method must be allowed",
            ));
        }

        let mut methods = Vec::with_capacity(self.http.allowed_methods.len());
        for name in &self.http.allowed_methods {
            let method = parse_method(name)?;
            if !methods.contains(&method) {
                methods.push(method);
            }
        }
        Ok(methods)
    }

    /// Returns the handler timeout, if configured.
    #[must_use]
    pub fn request_timeout(&self) -> Option<Duration> {
        self.http.request_timeout_ms.map(Duration::from_millis)
    }

    /// Returns the subscriber settings for `hestia_telemetry::init_logging`.
    #[must_use]
    pub fn log_config(&self) -> LogConfig {
        let base = match self.logging.format {
            LogFormat::Json => LogConfig::production(),
            LogFormat::Pretty => LogConfig::development(),
        };

        LogConfig {
            enabled: self.logging.enabled,
            level: self.logging.level.clone(),
            format: self.logging.format,
            file_line_info: self.logging.include_location,
            ..base
        }
    }

    /// Create a development configuration preset.
    ///
    /// - Pretty log formatting
    /// - Debug log level with file/line info
    /// - Internal error messages exposed in problem details
    ///
    /// # Example
    ///
    /// ```
    /// use hestia_config::HestiaConfig;
    ///
    /// let config = HestiaConfig::development();
    /// assert_eq!(config.logging.level, "debug");
    /// assert!(config.http.expose_internal_errors);
    /// ```
    #[must_use]
    pub fn development() -> Self {
        let mut config = Self::default();

        config.logging.level = "debug".to_string();
        config.logging.format = LogFormat::Pretty;
        config.logging.include_location = true;
        config.http.expose_internal_errors = true;

        config
    }

    /// Create a production configuration preset.
    ///
    /// - JSON log formatting at info level
    /// - Sanitized internal errors
    /// - 30 second handler timeout
    #[must_use]
    pub fn production() -> Self {
        let mut config = Self::default();

        config.logging.level = "info".to_string();
        config.logging.format = LogFormat::Json;
        config.http.expose_internal_errors = false;
        config.http.request_timeout_ms = Some(30_000);

        config
    }
}

/// Parses an HTTP method name case-insensitively against [`KNOWN_METHODS`].
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` for unknown names.
pub fn parse_method(name: &str) -> Result<Method, ConfigError> {
    let upper = name.trim().to_ascii_uppercase();
    if !KNOWN_METHODS.contains(&upper.as_str()) {
        return Err(ConfigError::invalid_value(
            "http.allowed_methods",
            format!("unknown HTTP method '{name}'"),
        ));
    }

    Method::from_bytes(upper.as_bytes()).map_err(|e| {
        ConfigError::invalid_value("http.allowed_methods", format!("'{name}': {e}"))
    })
}

/// Builder for [`HestiaConfig`].
#[derive(Debug, Default)]
pub struct HestiaConfigBuilder {
    http: Option<HttpConfig>,
    context: Option<ContextConfig>,
    logging: Option<LoggingConfig>,
}

impl HestiaConfigBuilder {
    /// Create a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the HTTP configuration.
    #[must_use]
    pub fn http(mut self, http: HttpConfig) -> Self {
        self.http = Some(http);
        self
    }

    /// Set the request context configuration.
    #[must_use]
    pub fn context(mut self, context: ContextConfig) -> Self {
        self.context = Some(context);
        self
    }

    /// Set the logging configuration.
    #[must_use]
    pub fn logging(mut self, logging: LoggingConfig) -> Self {
        self.logging = Some(logging);
        self
    }

    /// Build the configuration.
    ///
    /// Any unset sections will use their default values.
    #[must_use]
    pub fn build(self) -> HestiaConfig {
        HestiaConfig {
            http: self.http.unwrap_or_default(),
            context: self.context.unwrap_or_default(),
            logging: self.logging.unwrap_or_default(),
        }
    }

    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if validation fails.
    pub fn build_validated(self) -> Result<HestiaConfig, ConfigError> {
        let config = self.build();
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_methods(methods: &[&str]) -> HestiaConfig {
        HestiaConfig::builder()
            .http(HttpConfig {
                allowed_methods: methods.iter().map(ToString::to_string).collect(),
                ..Default::default()
            })
            .build()
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = HestiaConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(
            config.allowed_methods().unwrap(),
            vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::PATCH,
                Method::DELETE
            ]
        );
        assert!(config.request_timeout().is_none());
    }

    #[test]
    fn test_methods_are_case_insensitive() {
        let config = with_methods(&["get", "Post", " options "]);
        assert_eq!(
            config.allowed_methods().unwrap(),
            vec![Method::GET, Method::POST, Method::OPTIONS]
        );
    }

    #[test]
    fn test_duplicate_methods_collapse() {
        let config = with_methods(&["GET", "get"]);
        assert_eq!(config.allowed_methods().unwrap(), vec![Method::GET]);
    }

    #[test]
    fn test_unknown_method_fails_validation() {
        let err = with_methods(&["GET", "FETCH"]).validate().unwrap_err();
        assert!(err.to_string().contains("FETCH"));
    }

    #[test]
    fn test_empty_methods_fail_validation() {
        assert!(with_methods(&[]).validate().is_err());
    }

    #[test]
    fn test_every_known_method_parses() {
        for name in KNOWN_METHODS {
            assert_eq!(parse_method(name).unwrap().as_str(), name);
        }
    }

    #[test]
    fn test_zero_timeout_fails_validation() {
        let config = HestiaConfig::builder()
            .http(HttpConfig {
                request_timeout_ms: Some(0),
                ..Default::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_content_language_fails_validation() {
        let config = HestiaConfig::builder()
            .http(HttpConfig {
                content_language: "en\nX-Injected: 1".to_string(),
                ..Default::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_path_prefix_must_be_absolute() {
        let result = HestiaConfig::builder()
            .context(ContextConfig {
                body_introspection_path_prefix: "api".to_string(),
                ..Default::default()
            })
            .build_validated();
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_context_key_fails_validation() {
        let config = HestiaConfig::builder()
            .context(ContextConfig {
                keys: vec!["clientId".to_string(), "  ".to_string()],
                ..Default::default()
            })
            .build();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_development_preset() {
        let config = HestiaConfig::development();
        assert_eq!(config.logging.format, LogFormat::Pretty);
        assert!(config.validate().is_ok());

        let log = config.log_config();
        assert_eq!(log.level, "debug");
        assert!(log.file_line_info);
    }

    #[test]
    fn test_production_preset() {
        let config = HestiaConfig::production();
        assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
        assert!(!config.http.expose_internal_errors);
        assert_eq!(config.log_config().format, LogFormat::Json);
    }
}
