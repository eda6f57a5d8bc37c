//! # Hestia
//!
//! **Request-scoped diagnostic context and uniform error responses for HTTP
//! services**
//!
//! Hestia gives every request:
//!
//! - a diagnostic [`ContextStore`](hestia_core::ContextStore) that is empty
//!   when the request starts and empty again when it ends
//! - automatic enrichment of that context with `clientId` and
//!   `transactionId` from JSON `POST` bodies, without consuming the body
//! - RFC 9457 problem responses for every handler failure, with the root
//!   cause and the context in the error log
//!
//! ## Quick Start
//!
//! ```
//! use hestia::prelude::*;
//!
//! # fn main() -> Result<(), ConfigError> {
//! let config = ConfigLoader::new().load()?;
//! let pipeline = hestia::build_pipeline(&config)?;
//!
//! assert_eq!(
//!     pipeline.stage_names(),
//!     ["context_lifecycle", "method_guard", "body_introspection"]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! Request → ContextLifecycle → MethodGuard → BodyIntrospection → Handler
//!                                                                   ↓
//! Response ← ContextLifecycle (clear) ←──── ErrorClassifier ←───────┘
//! ```

#![doc(html_root_url = "https://docs.rs/hestia/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

use std::sync::Arc;

use hestia_config::{ConfigError, HestiaConfig};
use hestia_middleware::{
    BodyIntrospectionMiddleware, ContextLifecycleMiddleware, ErrorClassifier,
    MethodGuardMiddleware, Pipeline, PropertyExtractor,
};
use http::HeaderValue;

// Re-export core types
pub use hestia_core as core;

// Re-export middleware types
pub use hestia_middleware as middleware;

// Re-export configuration types
pub use hestia_config as config;

// Re-export telemetry types
pub use hestia_telemetry as telemetry;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use hestia_core::{
        BindErrors, ContextError, ContextKey, ContextStore, FieldError, HandlerError,
        HandlerResult,
    };

    pub use hestia_middleware::{
        BoxFuture, CachedBody, ErrorClassifier, ErrorResponse, Middleware, MiddlewareContext,
        Next, Pipeline, Request, Response,
    };

    pub use hestia_config::{ConfigError, ConfigLoader, HestiaConfig};

    pub use hestia_telemetry::{init_logging, LogConfig, LogFormat};
}

/// Builds the error classifier described by `config`.
///
/// # Errors
///
/// Returns `ConfigError::InvalidValue` if `http.content_language` is not a
/// valid header value.
pub fn build_classifier(config: &HestiaConfig) -> Result<ErrorClassifier, ConfigError> {
    let language = HeaderValue::from_str(config.http.content_language.trim())
        .map_err(|e| ConfigError::invalid_value("http.content_language", e.to_string()))?;

    Ok(ErrorClassifier::new()
        .content_language(language)
        .expose_internal_errors(config.http.expose_internal_errors))
}

/// Assembles the request pipeline described by `config`.
///
/// The pipeline always contains the context lifecycle and method guard
/// stages; body introspection is added when enabled. The configured
/// request timeout bounds the handler.
///
/// # Errors
///
/// Returns `ConfigError` if `config` does not validate.
pub fn build_pipeline(config: &HestiaConfig) -> Result<Pipeline, ConfigError> {
    config.validate()?;

    let classifier = Arc::new(build_classifier(config)?);

    let mut builder = Pipeline::builder()
        .classifier(Arc::clone(&classifier))
        .add_stage(ContextLifecycleMiddleware::new())
        .add_stage(MethodGuardMiddleware::new(
            config.allowed_methods()?,
            classifier,
        ));

    if config.context.body_introspection_enabled {
        builder = builder.add_stage(
            BodyIntrospectionMiddleware::new()
                .path_prefix(config.context.body_introspection_path_prefix.clone())
                .extractor(PropertyExtractor::new(config.context.keys.iter().cloned())),
        );
    }

    if let Some(timeout) = config.request_timeout() {
        builder = builder.handler_timeout(timeout);
    }

    let pipeline = builder.build();
    tracing::info!(
        stages = ?pipeline.stage_names(),
        handler_timeout = ?pipeline.handler_timeout(),
        "request pipeline assembled"
    );

    Ok(pipeline)
}
