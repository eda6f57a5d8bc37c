//! Typed configuration for Hestia services.
//!
//! This crate provides a strongly-typed configuration system with support for:
//! - TOML and JSON configuration files
//! - Environment variable overrides
//! - Strict validation (fails on unknown fields)
//! - Layered configuration (defaults → file → env)
//!
//! # Overview
//!
//! The configuration system is built around the [`HestiaConfig`] struct:
//!
//! - [`HttpConfig`] - Allowed methods, problem-response language, handler timeout
//! - [`ContextConfig`] - Body introspection switch, path prefix, and keys
//! - [`LoggingConfig`] - Log level and output format
//!
//! Validation runs on [`ConfigLoader::load`]. An empty or unknown entry in
//! `http.allowed_methods` is a startup error.
//!
//! # Configuration File Format
//!
//! ```toml
//! [http]
//! allowed_methods = ["GET", "POST", "PUT", "PATCH", "DELETE"]
//! content_language = "en"
//! request_timeout_ms = 30000
//!
//! [context]
//! body_introspection_enabled = true
//! body_introspection_path_prefix = "/api/"
//! keys = ["clientId", "transactionId"]
//!
//! [logging]
//! level = "info"
//! format = "json"
//! ```
//!
//! # Environment Variable Overrides
//!
//! All configuration values can be overridden via environment variables using
//! the format `PREFIX__SECTION__KEY`. For example:
//!
//! - `HESTIA__HTTP__ALLOWED_METHODS=GET,POST`
//! - `HESTIA__HTTP__REQUEST_TIMEOUT_MS=none`
//! - `HESTIA__LOGGING__FORMAT=pretty`

#![doc(html_root_url = "https://docs.rs/hestia-config/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod config;
mod error;
mod loader;
mod schema;

pub use config::*;
pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use schema::*;
