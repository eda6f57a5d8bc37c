//! Request-handling error taxonomy.
//!
//! [`HandlerError`] is the closed set of failures a request handler (or a
//! pipeline stage acting on its behalf) can report. Each variant maps to
//! exactly one HTTP status code via [`HandlerError::status_code`], and the
//! catch-all [`HandlerError::Internal`] absorbs everything else so that no
//! failure is left unclassified.
//!
//! # Status mapping
//!
//! | Variant | Status |
//! |---|---|
//! | `Bind`, `MethodArgumentNotValid`, `MissingParameter`, `MissingRequestPart`, `TypeMismatch`, `MessageNotReadable` | 400 |
//! | `NoHandlerFound`, `NoResource` | 404 |
//! | `MethodNotAllowed` | 405 |
//! | `NotAcceptable` | 406 |
//! | `PayloadTooLarge` | 413 |
//! | `UnsupportedMediaType` | 415 |
//! | `MissingPathVariable`, `ConversionNotSupported`, `MessageNotWritable`, `RequestBinding` | 500 |
//! | `AsyncRequestTimeout` | 503 |
//! | `Status` | as given |
//! | `Internal`, `Panic` | 500 |

use crate::context::ContextError;
use http::{Method, StatusCode};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use thiserror::Error;

/// Result type alias using [`HandlerError`].
pub type HandlerResult<T> = Result<T, HandlerError>;

/// A single rejected field (or object-level) value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Field path, or the object name for object-level errors.
    pub field: String,
    /// The value that was rejected, if one was supplied.
    pub rejected_value: Option<String>,
    /// Human-readable message.
    pub message: String,
}

impl FieldError {
    /// Creates a field error.
    #[must_use]
    pub fn new(
        field: impl Into<String>,
        rejected_value: Option<impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            rejected_value: rejected_value.map(Into::into),
            message: message.into(),
        }
    }
}

/// The set of errors produced while binding and validating one target object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindErrors {
    /// Name of the object being bound (e.g. `"createOrderRequest"`).
    pub object_name: String,
    /// Individual field errors, in the order they were recorded.
    pub errors: Vec<FieldError>,
}

impl BindErrors {
    /// Creates an empty error set for `object_name`.
    #[must_use]
    pub fn new(object_name: impl Into<String>) -> Self {
        Self {
            object_name: object_name.into(),
            errors: Vec::new(),
        }
    }

    /// Records an error against `field`.
    pub fn add(
        &mut self,
        field: impl Into<String>,
        rejected_value: Option<impl Into<String>>,
        message: impl Into<String>,
    ) {
        self.errors
            .push(FieldError::new(field, rejected_value, message));
    }

    /// Builder-style variant of [`add`](Self::add).
    #[must_use]
    pub fn with(
        mut self,
        field: impl Into<String>,
        rejected_value: Option<impl Into<String>>,
        message: impl Into<String>,
    ) -> Self {
        self.add(field, rejected_value, message);
        self
    }

    /// Returns `true` if no errors were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of recorded errors.
    #[must_use]
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// Iterates over the recorded errors.
    pub fn iter(&self) -> std::slice::Iter<'_, FieldError> {
        self.errors.iter()
    }
}

impl fmt::Display for BindErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "validation failed for object '{}': {} error(s)",
            self.object_name,
            self.errors.len()
        )
    }
}

/// Errors reported by request handlers.
#[derive(Error, Debug)]
pub enum HandlerError {
    /// Binding of request data onto a target object failed validation.
    #[error("{0}")]
    Bind(BindErrors),

    /// A handler argument failed validation.
    #[error("invalid handler argument: {0}")]
    MethodArgumentNotValid(BindErrors),

    /// A required request parameter was not supplied.
    #[error("required request parameter '{name}' for type {kind} is not present")]
    MissingParameter {
        /// Parameter name.
        name: String,
        /// Expected parameter type.
        kind: String,
    },

    /// A required multipart request part was not supplied.
    #[error("required request part '{name}' is not present")]
    MissingRequestPart {
        /// Part name.
        name: String,
    },

    /// A request value could not be converted to the required type.
    #[error("failed to convert value '{value}' of '{name}' to required type {required}")]
    TypeMismatch {
        /// Name of the parameter or property.
        name: String,
        /// The offending value.
        value: String,
        /// The type that was required.
        required: String,
    },

    /// The request body could not be read or parsed.
    #[error("failed to read request: {message}")]
    MessageNotReadable {
        /// Human-readable error message.
        message: String,
        /// The underlying parse error.
        #[source]
        source: Option<Box<dyn StdError + Send + Sync>>,
    },

    /// Binding a request header, cookie, or attribute failed during dispatch.
    #[error("{message}")]
    RequestBinding {
        /// Human-readable error message.
        message: String,
    },

    /// No handler is registered for the method and path.
    #[error("no handler found for {method} {path}")]
    NoHandlerFound {
        /// Request method.
        method: Method,
        /// Request path.
        path: String,
    },

    /// No static resource exists at the path.
    #[error("no resource found at {path}")]
    NoResource {
        /// Request path.
        path: String,
    },

    /// The resource exists but does not support the request method.
    #[error("request method '{method}' is not supported")]
    MethodNotAllowed {
        /// The rejected method.
        method: Method,
        /// Methods the resource does support, used for the `Allow` header.
        supported: Vec<Method>,
    },

    /// No representation acceptable to the client could be produced.
    #[error("no acceptable representation")]
    NotAcceptable {
        /// Media types the resource can produce.
        supported: Vec<String>,
    },

    /// The request body exceeded the configured maximum.
    #[error("maximum upload size exceeded")]
    PayloadTooLarge {
        /// The configured limit, if known.
        max_bytes: Option<u64>,
    },

    /// The request content type is not supported.
    #[error("content type '{content_type}' is not supported")]
    UnsupportedMediaType {
        /// The rejected content type.
        content_type: String,
        /// Content types the resource accepts.
        supported: Vec<String>,
    },

    /// A path variable expected by the handler was not present in the route.
    #[error("required URI template variable '{name}' is not present")]
    MissingPathVariable {
        /// Variable name.
        name: String,
    },

    /// No converter exists for the required type.
    #[error("no converter available for '{name}' to required type {required}")]
    ConversionNotSupported {
        /// Name of the parameter or property.
        name: String,
        /// The type that was required.
        required: String,
    },

    /// The response body could not be written.
    #[error("failed to write response: {message}")]
    MessageNotWritable {
        /// Human-readable error message.
        message: String,
    },

    /// The handler did not complete before the request deadline.
    #[error("async request timed out")]
    AsyncRequestTimeout,

    /// A failure that carries its own HTTP status.
    #[error("{reason}")]
    Status {
        /// The status to respond with.
        status: StatusCode,
        /// Human-readable reason.
        reason: String,
    },

    /// The handler panicked.
    #[error("handler panicked: {message}")]
    Panic {
        /// The panic payload, when it was a string.
        message: String,
    },

    /// Any other failure.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl HandlerError {
    /// Creates a not-readable error wrapping the parse failure.
    pub fn message_not_readable(source: impl StdError + Send + Sync + 'static) -> Self {
        Self::MessageNotReadable {
            message: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    /// Creates a method-not-allowed error.
    #[must_use]
    pub fn method_not_allowed(method: Method, supported: impl IntoIterator<Item = Method>) -> Self {
        Self::MethodNotAllowed {
            method,
            supported: supported.into_iter().collect(),
        }
    }

    /// Creates a missing-parameter error.
    #[must_use]
    pub fn missing_parameter(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self::MissingParameter {
            name: name.into(),
            kind: kind.into(),
        }
    }

    /// Creates an error carrying an explicit status.
    #[must_use]
    pub fn status(status: StatusCode, reason: impl Into<String>) -> Self {
        Self::Status {
            status,
            reason: reason.into(),
        }
    }

    /// Creates an internal error from a message.
    #[must_use]
    pub fn internal(message: impl fmt::Display + fmt::Debug + Send + Sync + 'static) -> Self {
        Self::Internal(anyhow::Error::msg(message))
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::Bind(_)
            | Self::MethodArgumentNotValid(_)
            | Self::MissingParameter { .. }
            | Self::MissingRequestPart { .. }
            | Self::TypeMismatch { .. }
            | Self::MessageNotReadable { .. } => StatusCode::BAD_REQUEST,
            Self::NoHandlerFound { .. } | Self::NoResource { .. } => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            Self::NotAcceptable { .. } => StatusCode::NOT_ACCEPTABLE,
            Self::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            Self::UnsupportedMediaType { .. } => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::MissingPathVariable { .. }
            | Self::ConversionNotSupported { .. }
            | Self::MessageNotWritable { .. }
            | Self::RequestBinding { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::AsyncRequestTimeout => StatusCode::SERVICE_UNAVAILABLE,
            Self::Status { status, .. } => *status,
            Self::Panic { .. } | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns `true` for failures that are not part of the classified
    /// taxonomy. Their details must never reach the client.
    #[must_use]
    pub const fn is_unclassified(&self) -> bool {
        matches!(self, Self::Panic { .. } | Self::Internal(_))
    }

    /// Resolves the root-cause message.
    ///
    /// - `Bind`: every field error message, one per line.
    /// - `MethodArgumentNotValid`: `Field [name]`, `Value [rejected]` and the
    ///   message for each error, each on its own line.
    /// - Everything else: the message of the deepest error in the source chain.
    #[must_use]
    pub fn root_cause_message(&self) -> String {
        match self {
            Self::Bind(errors) => errors
                .iter()
                .map(|e| e.message.as_str())
                .collect::<Vec<_>>()
                .join("\n"),
            Self::MethodArgumentNotValid(errors) => errors
                .iter()
                .map(|e| {
                    format!(
                        "Field [{}]\nValue [{}]\n{}",
                        e.field,
                        e.rejected_value.as_deref().unwrap_or("null"),
                        e.message
                    )
                })
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Internal(error) => error.root_cause().to_string(),
            other => root_cause(other).to_string(),
        }
    }

    /// Returns the `Allow` header methods for a method-not-allowed error.
    #[must_use]
    pub fn allowed_methods(&self) -> Option<&[Method]> {
        match self {
            Self::MethodNotAllowed { supported, .. } => Some(supported),
            _ => None,
        }
    }
}

impl From<ContextError> for HandlerError {
    fn from(error: ContextError) -> Self {
        Self::Internal(anyhow::Error::new(error))
    }
}

/// Walks the `source()` chain of `error` and returns the deepest cause.
///
/// Returns `error` itself when it has no source.
///
/// # Example
///
/// ```
/// use hestia_core::root_cause;
/// use std::io;
///
/// #[derive(Debug, thiserror::Error)]
/// #[error("outer")]
/// struct Outer(#[source] io::Error);
///
/// let err = Outer(io::Error::new(io::ErrorKind::Other, "inner"));
/// assert_eq!(root_cause(&err).to_string(), "inner");
/// ```
pub fn root_cause<'a>(error: &'a (dyn StdError + 'static)) -> &'a (dyn StdError + 'static) {
    let mut current = error;
    while let Some(source) = current.source() {
        current = source;
    }
    current
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    #[derive(Debug, Error)]
    #[error("outer")]
    struct Outer(#[source] io::Error);

    #[test]
    fn test_root_cause_walks_to_deepest() {
        let err = Outer(io::Error::new(io::ErrorKind::Other, "inner"));
        assert_eq!(root_cause(&err).to_string(), "inner");
    }

    #[test]
    fn test_root_cause_without_source_is_self() {
        let err = io::Error::new(io::ErrorKind::Other, "alone");
        assert_eq!(root_cause(&err).to_string(), "alone");
    }

    #[test]
    fn test_internal_root_cause_uses_anyhow_chain() {
        let inner = io::Error::new(io::ErrorKind::Other, "inner");
        let err = HandlerError::from(anyhow::Error::new(inner).context("outer"));

        assert_eq!(err.to_string(), "outer");
        assert_eq!(err.root_cause_message(), "inner");
    }

    #[test]
    fn test_internal_wrapping_std_chain() {
        let err = HandlerError::from(anyhow::Error::new(Outer(io::Error::new(
            io::ErrorKind::Other,
            "disk full",
        ))));
        assert_eq!(err.root_cause_message(), "disk full");
    }

    #[test]
    fn test_bind_root_cause_joins_messages() {
        let errors = BindErrors::new("order")
            .with("quantity", Some("-1"), "must be positive")
            .with("sku", None::<String>, "must not be blank");

        let err = HandlerError::Bind(errors);
        assert_eq!(err.root_cause_message(), "must be positive\nmust not be blank");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_method_argument_root_cause_format() {
        let errors = BindErrors::new("order")
            .with("quantity", Some("-1"), "must be positive")
            .with("sku", None::<String>, "must not be blank");

        let err = HandlerError::MethodArgumentNotValid(errors);
        assert_eq!(
            err.root_cause_message(),
            "Field [quantity]\nValue [-1]\nmust be positive\nField [sku]\nValue [null]\nmust not be blank"
        );
    }

    #[test]
    fn test_message_not_readable_root_cause() {
        let parse_error = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let expected = parse_error.to_string();

        let err = HandlerError::message_not_readable(parse_error);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.root_cause_message(), expected);
    }

    #[test]
    fn test_status_table() {
        let cases = [
            (HandlerError::missing_parameter("id", "String"), 400),
            (
                HandlerError::MissingRequestPart {
                    name: "file".into(),
                },
                400,
            ),
            (
                HandlerError::TypeMismatch {
                    name: "id".into(),
                    value: "abc".into(),
                    required: "u64".into(),
                },
                400,
            ),
            (
                HandlerError::RequestBinding {
                    message: "missing header 'x-client'".into(),
                },
                500,
            ),
            (
                HandlerError::NoHandlerFound {
                    method: Method::GET,
                    path: "/nope".into(),
                },
                404,
            ),
            (HandlerError::NoResource { path: "/x.css".into() }, 404),
            (HandlerError::method_not_allowed(Method::DELETE, [Method::GET]), 405),
            (HandlerError::NotAcceptable { supported: vec![] }, 406),
            (HandlerError::PayloadTooLarge { max_bytes: Some(1024) }, 413),
            (
                HandlerError::UnsupportedMediaType {
                    content_type: "text/csv".into(),
                    supported: vec!["application/json".into()],
                },
                415,
            ),
            (HandlerError::MissingPathVariable { name: "id".into() }, 500),
            (
                HandlerError::ConversionNotSupported {
                    name: "id".into(),
                    required: "Uuid".into(),
                },
                500,
            ),
            (
                HandlerError::MessageNotWritable {
                    message: "broken pipe".into(),
                },
                500,
            ),
            (HandlerError::AsyncRequestTimeout, 503),
            (HandlerError::status(StatusCode::CONFLICT, "version mismatch"), 409),
            (HandlerError::internal("boom"), 500),
            (
                HandlerError::Panic {
                    message: "oops".into(),
                },
                500,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.status_code().as_u16(), expected, "{error:?}");
        }
    }

    #[test]
    fn test_unclassified() {
        assert!(HandlerError::internal("boom").is_unclassified());
        assert!(HandlerError::Panic { message: "x".into() }.is_unclassified());
        assert!(!HandlerError::AsyncRequestTimeout.is_unclassified());
    }

    #[test]
    fn test_allowed_methods() {
        let err = HandlerError::method_not_allowed(Method::PUT, [Method::GET, Method::POST]);
        assert_eq!(err.allowed_methods(), Some(&[Method::GET, Method::POST][..]));
        assert!(HandlerError::AsyncRequestTimeout.allowed_methods().is_none());
    }

    #[test]
    fn test_context_error_converts_to_internal() {
        let err: HandlerError = ContextError::BlankKey.into();
        assert!(matches!(err, HandlerError::Internal(_)));
        assert_eq!(err.root_cause_message(), "context key must not be blank");
    }
}
