//! Context lifecycle middleware.
//!
//! The outermost stage of every pipeline. It guarantees that the request
//! context is empty when processing starts and empty again when the
//! response leaves the pipeline, whatever happened in between.
//!
//! ## Guarantees
//!
//! - **Entry**: the store is cleared unconditionally. Entries found at this
//!   point are stale and are reported with a `warn!` event.
//! - **Exit**: the store is cleared after downstream returns, including when
//!   a downstream stage panics. The panic is resumed after cleanup.
//! - **Cancellation**: exit cleanup is tied to a guard owned by the stage's
//!   future, so dropping the pipeline future mid-request also clears the
//!   store. A caller-owned [`MiddlewareContext`] is clean again for the next
//!   request.
//! - **Once per request**: a nested pass through the same context (an
//!   internal forward) neither clears on entry nor on exit; the outermost
//!   pass owns the lifecycle.

use crate::context::MiddlewareContext;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{Request, Response};
use futures_util::FutureExt;
use std::ops::{Deref, DerefMut};
use std::panic::AssertUnwindSafe;

/// Marks a context whose lifecycle is owned by an outer pass.
#[derive(Debug, Clone, Copy)]
struct LifecycleActive;

/// Owns a context for the outermost pass; clears it when dropped.
struct LifecycleGuard<'c> {
    ctx: &'c mut MiddlewareContext,
}

impl<'c> LifecycleGuard<'c> {
    fn enter(ctx: &'c mut MiddlewareContext) -> Self {
        if !ctx.store().is_empty() {
            tracing::warn!(
                context = %ctx.store(),
                "stale request context found on entry, clearing"
            );
        }
        ctx.store_mut().clear();
        ctx.set_extension(LifecycleActive);
        Self { ctx }
    }
}

impl Deref for LifecycleGuard<'_> {
    type Target = MiddlewareContext;

    fn deref(&self) -> &MiddlewareContext {
        self.ctx
    }
}

impl DerefMut for LifecycleGuard<'_> {
    fn deref_mut(&mut self) -> &mut MiddlewareContext {
        self.ctx
    }
}

impl Drop for LifecycleGuard<'_> {
    fn drop(&mut self) {
        self.ctx.store_mut().clear();
        self.ctx.remove_extension::<LifecycleActive>();
    }
}

/// Middleware that clears the request context before and after processing.
#[derive(Debug, Clone, Copy, Default)]
pub struct ContextLifecycleMiddleware;

impl ContextLifecycleMiddleware {
    /// Creates the lifecycle middleware.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Middleware for ContextLifecycleMiddleware {
    fn name(&self) -> &'static str {
        "context_lifecycle"
    }

    fn stage(&self) -> Option<Stage> {
        Some(Stage::ContextLifecycle)
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if ctx.has_extension::<LifecycleActive>() {
                return next.run(ctx, request).await;
            }

            let mut guard = LifecycleGuard::enter(ctx);
            let outcome = AssertUnwindSafe(next.run(&mut *guard, request))
                .catch_unwind()
                .await;
            drop(guard);

            match outcome {
                Ok(response) => response,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}
