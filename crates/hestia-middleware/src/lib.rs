//! # Hestia Middleware
//!
//! Request interception pipeline for the Hestia cross-cutting-concerns
//! library.
//!
//! Every request passes through a short, ordered set of stages before it
//! reaches the handler. Handler failures are turned into RFC 9457 problem
//! responses at the end of the chain.
//!
//! ## Pipeline Stages
//!
//! ```text
//! Request → ContextLifecycle → MethodGuard → BodyIntrospection → Handler
//!                                                                   ↓
//! Response ← ContextLifecycle (clear) ←──── ErrorClassifier ←───────┘
//! ```
//!
//! | Stage | Middleware         | Purpose                                      |
//! |-------|--------------------|----------------------------------------------|
//! | 1     | Context Lifecycle  | Empty request context on entry and exit      |
//! | 2     | Method Guard       | 405 for methods outside the allow-list       |
//! | 3     | Body Introspection | Copy `clientId`/`transactionId` from JSON    |
//!
//! ## Key Features
//!
//! - **Explicit context**: the [`ContextStore`](hestia_core::ContextStore)
//!   travels inside [`MiddlewareContext`]; nothing is thread-bound
//! - **Re-readable bodies**: [`CachedBody`] lets a stage read the body
//!   without consuming it for the handler
//! - **Problem responses**: [`ErrorClassifier`] maps every
//!   [`HandlerError`](hestia_core::HandlerError) to a status and a problem
//!   document, and logs the root cause with the request context
//!
//! ## Example
//!
//! ```
//! use hestia_middleware::pipeline::Stage;
//!
//! let stages = Stage::all();
//! assert_eq!(stages.len(), 3);
//! assert_eq!(stages[0].name(), "context_lifecycle");
//! assert_eq!(stages[2].name(), "body_introspection");
//! ```

#![doc(html_root_url = "https://docs.rs/hestia-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod body;
pub mod context;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod pipeline;
pub mod stages;
pub mod types;

// Re-export main types at crate root
pub use body::CachedBody;
pub use context::MiddlewareContext;
pub use error::{ErrorClassifier, ErrorResponse};
pub use extract::PropertyExtractor;
pub use middleware::{BoxFuture, Middleware, Next};
pub use pipeline::{BoxedMiddleware, Pipeline, PipelineBuilder, Stage};
pub use stages::{BodyIntrospectionMiddleware, ContextLifecycleMiddleware, MethodGuardMiddleware};
pub use types::{is_json_content_type, Request, Response, PROBLEM_JSON};
