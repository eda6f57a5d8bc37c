//! # Hestia Core
//!
//! Core types for the Hestia cross-cutting-concerns library.
//!
//! This crate provides the foundational types used throughout Hestia:
//!
//! - [`ContextStore`] - Per-request diagnostic key/value store
//! - [`ContextKey`] - Registry of well-known context keys
//! - [`HandlerError`] - Closed taxonomy of request-handling failures
//! - [`BindErrors`] / [`FieldError`] - Field-level validation failures
//! - [`root_cause`] - Resolution of the deepest cause in an error chain

#![doc(html_root_url = "https://docs.rs/hestia-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod context;
mod error;

pub use context::{ContextError, ContextKey, ContextStore};
pub use error::{root_cause, BindErrors, FieldError, HandlerError, HandlerResult};
