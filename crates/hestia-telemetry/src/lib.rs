//! Structured logging for Hestia services.
//!
//! Hestia emits all diagnostics through the `tracing` macros. This crate
//! installs the process-wide subscriber that turns those events into JSON
//! (production) or human-readable (development) output.
//!
//! # Example
//!
//! ```rust,ignore
//! use hestia_telemetry::{init_logging, LogConfig};
//!
//! init_logging(&LogConfig::production())?;
//! tracing::info!(client_id = "12345", "Request enriched");
//! ```

#![doc(html_root_url = "https://docs.rs/hestia-telemetry/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod logging;

pub use error::TelemetryError;
pub use logging::{create_env_filter, init_logging, LogConfig, LogFormat};

/// Result type for telemetry operations.
pub type TelemetryResult<T> = Result<T, TelemetryError>;
