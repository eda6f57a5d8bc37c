//! Ordered middleware pipeline.
//!
//! A [`Pipeline`] wraps a handler with a fixed sequence of stages. Built-in
//! stages are ordered by [`Stage`] regardless of registration order; custom
//! middleware runs after them, in the order it was added.
//!
//! ## Built-in Stages
//!
//! 1. **Context Lifecycle** - Clear the request context on entry and exit
//! 2. **Method Guard** - Reject methods outside the allow-list
//! 3. **Body Introspection** - Enrich the context from JSON bodies
//!
//! ## Handler Failures
//!
//! Handlers return [`HandlerResult`]. The pipeline's terminal step turns
//! every failure into a problem response through its [`ErrorClassifier`]:
//!
//! - `Err(HandlerError)` is classified by variant
//! - a panic in the handler becomes [`HandlerError::Panic`] (500)
//! - exceeding the handler timeout becomes
//!   [`HandlerError::AsyncRequestTimeout`] (503)
//!
//! The classifier logs each failure together with the request context as it
//! was when the handler returned, before the lifecycle stage clears it.

use crate::context::MiddlewareContext;
use crate::error::ErrorClassifier;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::types::{Request, Response};
use futures_util::FutureExt;
use hestia_core::{HandlerError, HandlerResult};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// The ordered middleware pipeline.
///
/// Stage order is fixed once the pipeline is built.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use hestia_middleware::pipeline::Pipeline;
/// use hestia_middleware::stages::ContextLifecycleMiddleware;
/// use http::{Request, Response, StatusCode};
/// use http_body_util::Full;
///
/// let pipeline = Pipeline::builder()
///     .add_stage(ContextLifecycleMiddleware::new())
///     .build();
///
/// let request = Request::builder()
///     .uri("/orders")
///     .body(Full::new(Bytes::new()))
///     .unwrap();
///
/// let response = tokio_test::block_on(pipeline.process(request, |_ctx, _req| {
///     Box::pin(async {
///         Ok(Response::builder()
///             .status(StatusCode::OK)
///             .body(Full::new(Bytes::from("OK")))
///             .unwrap())
///     })
/// }));
///
/// assert_eq!(response.status(), StatusCode::OK);
/// ```
pub struct Pipeline {
    stages: Vec<BoxedMiddleware>,
    classifier: Arc<ErrorClassifier>,
    handler_timeout: Option<Duration>,
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("stages", &self.stage_names())
            .field("classifier", &self.classifier)
            .field("handler_timeout", &self.handler_timeout)
            .finish()
    }
}

impl Pipeline {
    /// Creates a new pipeline builder.
    #[must_use]
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::new()
    }

    /// Processes a request with a fresh context.
    pub async fn process<H>(&self, request: Request, handler: H) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, HandlerResult<Response>>
            + Send
            + 'static,
    {
        let mut ctx = MiddlewareContext::new();
        self.process_with_context(&mut ctx, request, handler).await
    }

    /// Processes a request with a caller-owned context.
    ///
    /// Worker-style callers reuse one context across requests; the context
    /// lifecycle stage guarantees each request still starts from an empty
    /// store.
    pub async fn process_with_context<H>(
        &self,
        ctx: &mut MiddlewareContext,
        request: Request,
        handler: H,
    ) -> Response
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, HandlerResult<Response>>
            + Send
            + 'static,
    {
        let next = self.build_chain(handler);
        next.run(ctx, request).await
    }

    /// Builds the middleware chain for a request.
    fn build_chain<'a, H>(&'a self, handler: H) -> Next<'a>
    where
        H: FnOnce(&mut MiddlewareContext, Request) -> BoxFuture<'static, HandlerResult<Response>>
            + Send
            + 'static,
    {
        let classifier = Arc::clone(&self.classifier);
        let limit = self.handler_timeout;

        let mut next = Next::handler(move |ctx, request| {
            let path = request.uri().path().to_string();
            let invoked = std::panic::catch_unwind(AssertUnwindSafe(|| handler(ctx, request)));
            let context = ctx.store().clone();

            Box::pin(async move {
                let result = match invoked {
                    Ok(future) => run_handler(future, limit).await,
                    Err(panic) => Err(panic_error(&*panic)),
                };

                match result {
                    Ok(response) => response,
                    Err(error) => classifier.handle(&error, &path, &context),
                }
            })
        });

        for middleware in self.stages.iter().rev() {
            next = Next::new(middleware.as_ref(), next);
        }

        next
    }

    /// Returns the names of all middleware stages in order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|mw| mw.name()).collect()
    }

    /// Returns the number of middleware stages.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Returns the classifier used for handler failures.
    #[must_use]
    pub fn classifier(&self) -> &ErrorClassifier {
        &self.classifier
    }

    /// Returns the handler timeout, if any.
    #[must_use]
    pub const fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout
    }
}

/// Awaits the handler future, catching panics and enforcing `limit`.
async fn run_handler(
    future: BoxFuture<'static, HandlerResult<Response>>,
    limit: Option<Duration>,
) -> HandlerResult<Response> {
    let guarded = AssertUnwindSafe(future).catch_unwind();

    let outcome = match limit {
        Some(limit) => match tokio::time::timeout(limit, guarded).await {
            Ok(outcome) => outcome,
            Err(_) => return Err(HandlerError::AsyncRequestTimeout),
        },
        None => guarded.await,
    };

    outcome.unwrap_or_else(|panic| Err(panic_error(&*panic)))
}

fn panic_error(panic: &(dyn Any + Send)) -> HandlerError {
    let message = panic
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "handler panicked".to_string());
    HandlerError::Panic { message }
}

/// Builder for constructing a [`Pipeline`].
pub struct PipelineBuilder {
    stages: Vec<BoxedMiddleware>,
    classifier: Arc<ErrorClassifier>,
    handler_timeout: Option<Duration>,
}

impl PipelineBuilder {
    /// Creates an empty builder with a default classifier and no timeout.
    #[must_use]
    pub fn new() -> Self {
        Self {
            stages: Vec::new(),
            classifier: Arc::new(ErrorClassifier::new()),
            handler_timeout: None,
        }
    }

    /// Adds a middleware stage.
    #[must_use]
    pub fn add_stage<M: Middleware>(mut self, middleware: M) -> Self {
        self.stages.push(Arc::new(middleware));
        self
    }

    /// Adds an already shared middleware stage.
    #[must_use]
    pub fn add_boxed_stage(mut self, middleware: BoxedMiddleware) -> Self {
        self.stages.push(middleware);
        self
    }

    /// Sets the classifier that renders handler failures.
    #[must_use]
    pub fn classifier(mut self, classifier: impl Into<Arc<ErrorClassifier>>) -> Self {
        self.classifier = classifier.into();
        self
    }

    /// Bounds how long the handler's future may run.
    #[must_use]
    pub fn handler_timeout(mut self, timeout: Duration) -> Self {
        self.handler_timeout = Some(timeout);
        self
    }

    /// Builds the pipeline.
    ///
    /// Built-in stages are sorted by [`Stage`]; custom stages keep their
    /// registration order and follow the built-ins.
    #[must_use]
    pub fn build(mut self) -> Pipeline {
        self.stages
            .sort_by_key(|mw| (mw.stage().is_none(), mw.stage()));

        for pair in self.stages.windows(2) {
            if let (Some(a), Some(b)) = (pair[0].stage(), pair[1].stage()) {
                if a == b {
                    tracing::warn!(stage = a.name(), "built-in stage registered more than once");
                }
            }
        }

        Pipeline {
            stages: self.stages,
            classifier: self.classifier,
            handler_timeout: self.handler_timeout,
        }
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Built-in middleware stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Stage {
    /// Stage 1: Clear the request context before and after processing
    ContextLifecycle = 1,
    /// Stage 2: Enforce the allowed-methods list
    MethodGuard = 2,
    /// Stage 3: Enrich the request context from JSON bodies
    BodyIntrospection = 3,
}

impl Stage {
    /// Returns the stage name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ContextLifecycle => "context_lifecycle",
            Self::MethodGuard => "method_guard",
            Self::BodyIntrospection => "body_introspection",
        }
    }

    /// Returns all stages in order.
    #[must_use]
    pub const fn all() -> [Stage; 3] {
        [
            Self::ContextLifecycle,
            Self::MethodGuard,
            Self::BodyIntrospection,
        ]
    }
}
