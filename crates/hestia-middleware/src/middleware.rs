//! Core middleware trait and types.
//!
//! This module defines the [`Middleware`] trait that all pipeline stages
//! implement. A stage sees the request before the handler and the response
//! after it, and decides whether to continue the chain through [`Next`].
//!
//! # Example
//!
//! ```ignore
//! use hestia_middleware::{BoxFuture, Middleware, MiddlewareContext, Next, Request, Response};
//!
//! struct AuditMiddleware;
//!
//! impl Middleware for AuditMiddleware {
//!     fn name(&self) -> &'static str {
//!         "audit"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a mut MiddlewareContext,
//!         request: Request,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, Response> {
//!         Box::pin(async move {
//!             tracing::info!(context = %ctx.store(), "request received");
//!             next.run(ctx, request).await
//!         })
//!     }
//! }
//! ```

use crate::context::MiddlewareContext;
use crate::pipeline::Stage;
use crate::types::{Request, Response};
use std::future::Future;
use std::pin::Pin;

/// A boxed future that returns a response.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// The core middleware trait.
///
/// Middleware receives a mutable context, the incoming request, and a
/// [`Next`] callback to invoke the next stage in the chain.
///
/// # Invariants
///
/// - Middleware MUST call `next.run()` at most once
/// - Middleware SHOULD NOT swallow downstream responses
/// - Middleware MUST NOT reorder the pipeline
pub trait Middleware: Send + Sync + 'static {
    /// Returns the unique name of this middleware stage.
    ///
    /// This name is used for logging and debugging.
    fn name(&self) -> &'static str;

    /// Returns the built-in stage this middleware implements, if any.
    ///
    /// Built-in stages are ordered by [`Stage`] when the pipeline is built;
    /// custom middleware (returning `None`) runs after them in registration
    /// order.
    fn stage(&self) -> Option<Stage> {
        None
    }

    /// Process the request through this middleware.
    ///
    /// # Arguments
    ///
    /// * `ctx` - The mutable middleware context
    /// * `request` - The incoming HTTP request
    /// * `next` - Callback to invoke the next middleware
    ///
    /// # Returns
    ///
    /// The HTTP response (either from downstream or generated here)
    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response>;
}

/// Callback to invoke the next middleware in the chain.
///
/// Consumed by [`run`](Next::run), so it can be invoked at most once. If a
/// stage does not call it, the stage short-circuits the pipeline and
/// returns its own response.
pub struct Next<'a> {
    inner: NextInner<'a>,
}

type TerminalFn<'a> =
    Box<dyn FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a>;

enum NextInner<'a> {
    /// More middleware to process
    Chain {
        middleware: &'a dyn Middleware,
        next: Box<Next<'a>>,
    },
    /// End of chain - invoke the handler
    Handler(TerminalFn<'a>),
}

impl<'a> Next<'a> {
    /// Creates a new `Next` that will invoke the given middleware.
    pub(crate) fn new(middleware: &'a dyn Middleware, next: Next<'a>) -> Self {
        Self {
            inner: NextInner::Chain {
                middleware,
                next: Box::new(next),
            },
        }
    }

    /// Creates a terminal `Next` that invokes the handler.
    pub(crate) fn handler<F>(f: F) -> Self
    where
        F: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, Response> + Send + 'a,
    {
        Self {
            inner: NextInner::Handler(Box::new(f)),
        }
    }

    /// Invokes the next middleware or handler in the chain.
    pub async fn run(self, ctx: &mut MiddlewareContext, request: Request) -> Response {
        match self.inner {
            NextInner::Chain { middleware, next } => middleware.process(ctx, request, *next).await,
            NextInner::Handler(handler) => handler(ctx, request).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    struct TaggingMiddleware {
        name: &'static str,
    }

    impl Middleware for TaggingMiddleware {
        fn name(&self) -> &'static str {
            self.name
        }

        fn process<'a>(
            &'a self,
            ctx: &'a mut MiddlewareContext,
            request: Request,
            next: Next<'a>,
        ) -> BoxFuture<'a, Response> {
            Box::pin(async move {
                ctx.store_mut().put(self.name, "visited").unwrap();
                next.run(ctx, request).await
            })
        }
    }

    fn ok_handler<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::from("OK")))
                    .unwrap()
            })
        })
    }

    fn request() -> Request {
        HttpRequest::builder()
            .uri("/test")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    #[test]
    fn test_default_stage_is_none() {
        let mw = TaggingMiddleware { name: "tag" };
        assert_eq!(mw.name(), "tag");
        assert!(mw.stage().is_none());
    }

    #[tokio::test]
    async fn test_next_handler() {
        let mut ctx = MiddlewareContext::new();
        let response = ok_handler().run(&mut ctx, request()).await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_middleware_chain() {
        let mw1 = TaggingMiddleware { name: "first" };
        let mw2 = TaggingMiddleware { name: "second" };
        let mut ctx = MiddlewareContext::new();

        let next = Next::new(&mw1, Next::new(&mw2, ok_handler()));
        let response = next.run(&mut ctx, request()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(ctx.store().get("first").unwrap(), Some("visited"));
        assert_eq!(ctx.store().get("second").unwrap(), Some("visited"));
    }

    #[tokio::test]
    async fn test_chain_runs_with_short_lived_contexts() {
        let mw = TaggingMiddleware { name: "tag" };

        for _ in 0..2 {
            let mut ctx = MiddlewareContext::new();
            let response = Next::new(&mw, ok_handler()).run(&mut ctx, request()).await;
            assert_eq!(response.status(), StatusCode::OK);
            assert_eq!(ctx.store().len(), 1);
        }
    }
}
