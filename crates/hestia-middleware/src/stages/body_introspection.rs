//! Body introspection middleware.
//!
//! For `POST` requests with a JSON content type under the configured path
//! prefix, this stage caches the body, copies well-known fields into the
//! request context, and passes the cached request downstream so the handler
//! can still read the body.
//!
//! Every other request passes through untouched.

use crate::body::CachedBody;
use crate::context::MiddlewareContext;
use crate::extract::PropertyExtractor;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{is_json_content_type, Request, Response};
use http::header::CONTENT_TYPE;
use http::Method;

/// Middleware that enriches the request context from JSON bodies.
#[derive(Debug, Clone)]
pub struct BodyIntrospectionMiddleware {
    path_prefix: String,
    extractor: PropertyExtractor,
}

impl Default for BodyIntrospectionMiddleware {
    fn default() -> Self {
        Self::new()
    }
}

impl BodyIntrospectionMiddleware {
    /// Creates the middleware for all paths with the default key registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            path_prefix: "/".to_string(),
            extractor: PropertyExtractor::default(),
        }
    }

    /// Restricts introspection to paths starting with `prefix`.
    #[must_use]
    pub fn path_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.path_prefix = prefix.into();
        self
    }

    /// Replaces the extractor.
    #[must_use]
    pub fn extractor(mut self, extractor: PropertyExtractor) -> Self {
        self.extractor = extractor;
        self
    }

    /// Returns `true` if `request` should have its body inspected.
    #[must_use]
    pub fn applies_to(&self, request: &Request) -> bool {
        request.method() == Method::POST
            && request.uri().path().starts_with(&self.path_prefix)
            && request
                .headers()
                .get(CONTENT_TYPE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(is_json_content_type)
    }
}

impl Middleware for BodyIntrospectionMiddleware {
    fn name(&self) -> &'static str {
        "body_introspection"
    }

    fn stage(&self) -> Option<Stage> {
        Some(Stage::BodyIntrospection)
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if !self.applies_to(&request) {
                return next.run(ctx, request).await;
            }

            let (request, cached) = CachedBody::wrap(request).await;
            let written = self.extractor.extract(cached.as_bytes(), ctx.store_mut());
            tracing::debug!(
                body_bytes = cached.len(),
                entries = written,
                "request body introspected"
            );

            next.run(ctx, request).await
        })
    }
}
