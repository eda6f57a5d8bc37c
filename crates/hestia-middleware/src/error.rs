//! Error classification and RFC 9457 problem responses.
//!
//! The [`ErrorClassifier`] is the terminal error handler of the pipeline. It
//! turns every [`HandlerError`] into a problem response:
//!
//! ```json
//! {
//!   "type": "about:blank",
//!   "title": "Bad Request",
//!   "status": 400,
//!   "detail": "must be positive",
//!   "instance": "/orders"
//! }
//! ```
//!
//! Responses carry `Content-Type: application/problem+json` and a fixed
//! `Content-Language`. Method-not-allowed responses additionally carry an
//! `Allow` header. Unclassified failures (internal errors and panics) get a
//! generic detail message; their real cause is only logged.

use crate::types::{Response, PROBLEM_JSON};
use bytes::Bytes;
use hestia_core::{ContextStore, HandlerError};
use http::header::{ALLOW, CONTENT_LANGUAGE, CONTENT_TYPE};
use http::{HeaderValue, StatusCode};
use http_body_util::Full;
use serde::{Deserialize, Serialize};

/// Default `Content-Language` of problem responses.
pub const DEFAULT_CONTENT_LANGUAGE: &str = "en";

/// Default detail message for unclassified failures.
pub const DEFAULT_INTERNAL_ERROR_MESSAGE: &str = "An internal error occurred";

/// An RFC 9457 problem document.
///
/// Built once per failed request by [`ErrorClassifier::error_response`] and
/// not modified afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    problem_type: String,
    title: String,
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    #[serde(skip)]
    content_language: String,
    #[serde(skip)]
    root_cause: Option<String>,
}

impl ErrorResponse {
    /// Problem type URI.
    #[must_use]
    pub fn problem_type(&self) -> &str {
        &self.problem_type
    }

    /// Short summary of the problem type.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// HTTP status code.
    #[must_use]
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Explanation specific to this occurrence.
    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Request path the problem occurred on.
    #[must_use]
    pub fn instance(&self) -> Option<&str> {
        self.instance.as_deref()
    }

    /// Language of the detail text.
    #[must_use]
    pub fn content_language(&self) -> &str {
        &self.content_language
    }

    /// Resolved root-cause message. Never serialized.
    #[must_use]
    pub fn root_cause(&self) -> Option<&str> {
        self.root_cause.as_deref()
    }
}

/// Maps [`HandlerError`]s to problem responses.
#[derive(Debug, Clone)]
pub struct ErrorClassifier {
    content_language: HeaderValue,
    internal_error_message: String,
    expose_internal_errors: bool,
}

impl Default for ErrorClassifier {
    fn default() -> Self {
        Self::new()
    }
}

impl ErrorClassifier {
    /// Creates a classifier with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            content_language: HeaderValue::from_static(DEFAULT_CONTENT_LANGUAGE),
            internal_error_message: DEFAULT_INTERNAL_ERROR_MESSAGE.to_string(),
            expose_internal_errors: false,
        }
    }

    /// Sets the `Content-Language` of every problem response.
    #[must_use]
    pub fn content_language(mut self, language: HeaderValue) -> Self {
        self.content_language = language;
        self
    }

    /// Sets the detail message used for unclassified failures.
    #[must_use]
    pub fn internal_error_message(mut self, message: &str) -> Self {
        self.internal_error_message = message.to_string();
        self
    }

    /// Sets whether unclassified failures expose their message.
    ///
    /// **Warning**: Only enable this in development environments.
    #[must_use]
    pub fn expose_internal_errors(mut self, expose: bool) -> Self {
        self.expose_internal_errors = expose;
        self
    }

    /// Returns the status code for `error`.
    #[must_use]
    pub fn classify(&self, error: &HandlerError) -> StatusCode {
        error.status_code()
    }

    /// Builds the problem document for `error` raised while serving `instance`.
    #[must_use]
    pub fn error_response(&self, error: &HandlerError, instance: Option<&str>) -> ErrorResponse {
        let status = self.classify(error);
        let root_cause = error.root_cause_message();

        let detail = if error.is_unclassified() && !self.expose_internal_errors {
            self.internal_error_message.clone()
        } else if root_cause.trim().is_empty() {
            error.to_string()
        } else {
            root_cause.clone()
        };

        ErrorResponse {
            problem_type: "about:blank".to_string(),
            title: status.canonical_reason().unwrap_or("Unknown Status").to_string(),
            status: status.as_u16(),
            detail,
            instance: instance.map(ToString::to_string),
            content_language: self.content_language.to_str().unwrap_or_default().to_string(),
            root_cause: Some(root_cause),
        }
    }

    /// Logs `error` and converts it to a problem response.
    ///
    /// `context` is the request's diagnostic context at the time of failure
    /// and is included in the log event.
    pub fn handle(&self, error: &HandlerError, instance: &str, context: &ContextStore) -> Response {
        let problem = self.error_response(error, Some(instance));

        if error.is_unclassified() {
            tracing::error!(
                http.status_code = problem.status(),
                http.path = %instance,
                error = %error,
                root_cause = problem.root_cause().unwrap_or_default(),
                details = ?error,
                context = %context,
                "unhandled error while processing request"
            );
        } else {
            tracing::error!(
                http.status_code = problem.status(),
                http.path = %instance,
                error = %error,
                root_cause = problem.root_cause().unwrap_or_default(),
                context = %context,
                "request failed"
            );
        }

        let body = serde_json::to_vec(&problem).unwrap_or_default();
        let mut response = Response::new(Full::new(Bytes::from(body)));
        *response.status_mut() = self.classify(error);

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(PROBLEM_JSON));
        headers.insert(CONTENT_LANGUAGE, self.content_language.clone());

        if let Some(methods) = error.allowed_methods() {
            let allow = methods
                .iter()
                .map(http::Method::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                headers.insert(ALLOW, value);
            }
        }

        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hestia_core::BindErrors;
    use http::Method;
    use http_body_util::BodyExt;
    use std::io;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn handle(error: &HandlerError) -> Response {
        ErrorClassifier::new().handle(error, "/orders", &ContextStore::new())
    }

    #[tokio::test]
    async fn test_validation_error_is_400() {
        let error = HandlerError::Bind(
            BindErrors::new("order").with("quantity", Some("-1"), "must be positive"),
        );
        let response = handle(&error);

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["status"], 400);
        assert_eq!(body["title"], "Bad Request");
        assert_eq!(body["type"], "about:blank");
        assert_eq!(body["detail"], "must be positive");
        assert_eq!(body["instance"], "/orders");
    }

    #[test]
    fn test_not_found_is_404() {
        let error = HandlerError::NoHandlerFound {
            method: Method::GET,
            path: "/missing".into(),
        };
        assert_eq!(handle(&error).status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_method_not_allowed_sets_allow_header() {
        let error = HandlerError::method_not_allowed(Method::DELETE, [Method::GET, Method::POST]);
        let response = handle(&error);

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(response.headers().get(ALLOW).unwrap(), "GET, POST");
    }

    #[test]
    fn test_not_acceptable_is_406() {
        let error = HandlerError::NotAcceptable {
            supported: vec!["application/json".into()],
        };
        let response = handle(&error);
        assert_eq!(response.status(), StatusCode::NOT_ACCEPTABLE);
        assert!(response.headers().get(ALLOW).is_none());
    }

    #[tokio::test]
    async fn test_request_binding_failure_is_500() {
        let error = HandlerError::RequestBinding {
            message: "missing header 'x-client'".into(),
        };
        let response = handle(&error);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["title"], "Internal Server Error");
        assert_eq!(body["detail"], "missing header 'x-client'");
    }

    #[tokio::test]
    async fn test_unclassified_error_is_sanitized() {
        let error = HandlerError::from(
            anyhow::Error::new(io::Error::new(io::ErrorKind::Other, "db password wrong"))
                .context("loading customer"),
        );
        let response = handle(&error);

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        let detail = body["detail"].as_str().unwrap();
        assert_eq!(detail, DEFAULT_INTERNAL_ERROR_MESSAGE);
        assert!(!detail.contains("password"));
    }

    #[test]
    fn test_unclassified_root_cause_kept_server_side() {
        let error = HandlerError::from(
            anyhow::Error::new(io::Error::new(io::ErrorKind::Other, "inner")).context("outer"),
        );
        let problem = ErrorClassifier::new().error_response(&error, None);

        assert_eq!(problem.detail(), DEFAULT_INTERNAL_ERROR_MESSAGE);
        assert_eq!(problem.root_cause(), Some("inner"));
        assert!(problem.instance().is_none());
    }

    #[test]
    fn test_expose_internal_errors() {
        let classifier = ErrorClassifier::new().expose_internal_errors(true);
        let problem = classifier.error_response(&HandlerError::internal("cache offline"), None);
        assert_eq!(problem.detail(), "cache offline");
    }

    #[test]
    fn test_custom_internal_message() {
        let classifier = ErrorClassifier::new().internal_error_message("Something went wrong");
        let problem = classifier.error_response(
            &HandlerError::Panic {
                message: "index out of bounds".into(),
            },
            Some("/x"),
        );
        assert_eq!(problem.detail(), "Something went wrong");
        assert_eq!(problem.status(), 500);
    }

    #[test]
    fn test_problem_headers() {
        let classifier =
            ErrorClassifier::new().content_language(HeaderValue::from_static("de-DE"));
        let response =
            classifier.handle(&HandlerError::AsyncRequestTimeout, "/slow", &ContextStore::new());

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(response.headers().get(CONTENT_TYPE).unwrap(), PROBLEM_JSON);
        assert_eq!(response.headers().get(CONTENT_LANGUAGE).unwrap(), "de-DE");
    }

    #[test]
    fn test_root_cause_is_not_serialized() {
        let problem = ErrorClassifier::new()
            .error_response(&HandlerError::missing_parameter("id", "u64"), Some("/orders"));
        let json = serde_json::to_value(&problem).unwrap();

        assert!(json.get("root_cause").is_none());
        assert!(json.get("content_language").is_none());
        assert_eq!(problem.content_language(), DEFAULT_CONTENT_LANGUAGE);
        assert_eq!(problem.title(), "Bad Request");
        assert_eq!(problem.problem_type(), "about:blank");
    }

    #[test]
    fn test_explicit_status() {
        let error = HandlerError::status(StatusCode::CONFLICT, "order already shipped");
        let problem = ErrorClassifier::new().error_response(&error, Some("/orders/7"));

        assert_eq!(problem.status(), 409);
        assert_eq!(problem.title(), "Conflict");
        assert_eq!(problem.detail(), "order already shipped");
    }
}
