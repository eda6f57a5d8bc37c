//! Common types used throughout the middleware pipeline.
//!
//! This module re-exports HTTP request and response types used by middleware.

use bytes::Bytes;
use http_body_util::Full;

/// The HTTP request type used in the middleware pipeline.
///
/// This is a standard `http::Request` with a `Full<Bytes>` body. The body
/// can be read once; stages that need to inspect it go through
/// [`CachedBody`](crate::body::CachedBody).
pub type Request = http::Request<Full<Bytes>>;

/// The HTTP response type used in the middleware pipeline.
///
/// This is a standard `http::Response` with a `Full<Bytes>` body.
pub type Response = http::Response<Full<Bytes>>;

/// Media type of RFC 9457 problem responses.
pub const PROBLEM_JSON: &str = "application/problem+json";

/// Returns `true` if a `Content-Type` value denotes JSON.
///
/// Matches `application/json` and any `+json` structured suffix
/// (e.g. `application/merge-patch+json`). Parameters such as `charset`
/// are ignored and the comparison is case-insensitive.
#[must_use]
pub fn is_json_content_type(value: &str) -> bool {
    let essence = value.split(';').next().unwrap_or_default().trim();
    essence.eq_ignore_ascii_case("application/json")
        || (essence.len() > 5
            && essence.is_char_boundary(essence.len() - 5)
            && essence[essence.len() - 5..].eq_ignore_ascii_case("+json"))
}
