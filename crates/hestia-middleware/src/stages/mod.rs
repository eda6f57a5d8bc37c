//! Built-in middleware stages.
//!
//! These stages run in a fixed order, ahead of any custom middleware:
//!
//! 1. [`context_lifecycle`] - Clear the request context on entry and exit
//! 2. [`method_guard`] - Reject methods outside the configured allow-list
//! 3. [`body_introspection`] - Cache JSON bodies and enrich the context

pub mod body_introspection;
pub mod context_lifecycle;
pub mod method_guard;

// Re-export main types
pub use body_introspection::BodyIntrospectionMiddleware;
pub use context_lifecycle::ContextLifecycleMiddleware;
pub use method_guard::MethodGuardMiddleware;
