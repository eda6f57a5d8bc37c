//! Method guard middleware.
//!
//! Rejects requests whose HTTP method is not in the service's configured
//! allow-list. Rejected requests never reach body introspection or the
//! handler; they receive a 405 problem response with an `Allow` header
//! listing the permitted methods.

use crate::context::MiddlewareContext;
use crate::error::ErrorClassifier;
use crate::middleware::{BoxFuture, Middleware, Next};
use crate::pipeline::Stage;
use crate::types::{Request, Response};
use hestia_core::HandlerError;
use http::Method;
use std::sync::Arc;

/// Middleware that enforces the allowed-methods list.
#[derive(Debug, Clone)]
pub struct MethodGuardMiddleware {
    allowed: Vec<Method>,
    classifier: Arc<ErrorClassifier>,
}

impl MethodGuardMiddleware {
    /// Creates a guard for `allowed`, rendering rejections with `classifier`.
    #[must_use]
    pub fn new(
        allowed: impl IntoIterator<Item = Method>,
        classifier: impl Into<Arc<ErrorClassifier>>,
    ) -> Self {
        Self {
            allowed: allowed.into_iter().collect(),
            classifier: classifier.into(),
        }
    }

    /// Returns the allowed methods.
    #[must_use]
    pub fn allowed(&self) -> &[Method] {
        &self.allowed
    }

    /// Returns `true` if `method` may proceed.
    #[must_use]
    pub fn permits(&self, method: &Method) -> bool {
        self.allowed.contains(method)
    }
}

impl Middleware for MethodGuardMiddleware {
    fn name(&self) -> &'static str {
        "method_guard"
    }

    fn stage(&self) -> Option<Stage> {
        Some(Stage::MethodGuard)
    }

    fn process<'a>(
        &'a self,
        ctx: &'a mut MiddlewareContext,
        request: Request,
        next: Next<'a>,
    ) -> BoxFuture<'a, Response> {
        Box::pin(async move {
            if self.permits(request.method()) {
                return next.run(ctx, request).await;
            }

            let error =
                HandlerError::method_not_allowed(request.method().clone(), self.allowed.clone());
            self.classifier
                .handle(&error, request.uri().path(), ctx.store())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use http::header::ALLOW;
    use http::{Request as HttpRequest, Response as HttpResponse, StatusCode};
    use http_body_util::Full;

    fn request(method: Method) -> Request {
        HttpRequest::builder()
            .method(method)
            .uri("/orders")
            .body(Full::new(Bytes::new()))
            .unwrap()
    }

    fn handler<'a>() -> Next<'a> {
        Next::handler(|_ctx, _req| {
            Box::pin(async {
                HttpResponse::builder()
                    .status(StatusCode::OK)
                    .body(Full::new(Bytes::new()))
                    .unwrap()
            })
        })
    }

    fn guard() -> MethodGuardMiddleware {
        MethodGuardMiddleware::new([Method::GET, Method::POST], ErrorClassifier::new())
    }

    #[test]
    fn test_middleware_name() {
        let middleware = guard();
        assert_eq!(middleware.name(), "method_guard");
        assert_eq!(middleware.stage(), Some(Stage::MethodGuard));
        assert_eq!(middleware.allowed(), [Method::GET, Method::POST]);
    }

    #[tokio::test]
    async fn test_allowed_method_passes() {
        let mut ctx = MiddlewareContext::new();
        let response = guard()
            .process(&mut ctx, request(Method::POST), handler())
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_disallowed_method_rejected_with_allow_header() {
        let mut ctx = MiddlewareContext::new();
        let response = guard()
            .process(&mut ctx, request(Method::DELETE), handler())
            .await;

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, POST");
    }
}
