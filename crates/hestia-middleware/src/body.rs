//! Replayable request bodies.
//!
//! A request body can be read once. [`CachedBody`] drains it a single time
//! into an owned buffer and then hands out any number of independent
//! readers over that buffer, so several stages (and the handler) can all
//! inspect the same payload.
//!
//! # Example
//!
//! ```
//! use bytes::Bytes;
//! use hestia_middleware::body::CachedBody;
//! use std::io::Read;
//!
//! # tokio_test::block_on(async {
//! let request = http::Request::builder()
//!     .method("POST")
//!     .body(http_body_util::Full::new(Bytes::from("hello")))
//!     .unwrap();
//!
//! let (request, cached) = CachedBody::wrap(request).await;
//!
//! let mut first = String::new();
//! cached.bytes_reader().read_to_string(&mut first).unwrap();
//! let mut second = String::new();
//! cached.text_reader().read_to_string(&mut second).unwrap();
//!
//! assert_eq!(first, "hello");
//! assert_eq!(second, "hello");
//! assert!(CachedBody::get(&request).is_some());
//! # });
//! ```

use crate::types::Request;
use bytes::Bytes;
use http::request::Parts;
use http_body_util::{BodyExt, Full};
use std::borrow::Cow;
use std::io::Cursor;

/// An immutable copy of a request body, captured once.
///
/// Cloning is cheap: clones share the same buffer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CachedBody {
    bytes: Bytes,
}

impl CachedBody {
    /// Creates a cache over an already-read buffer.
    #[must_use]
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    /// Drains the request body into a cache, returning the request head.
    ///
    /// An empty body produces an empty cache.
    pub async fn from_request(request: Request) -> (Parts, Self) {
        let (parts, body) = request.into_parts();
        let bytes = match body.collect().await {
            Ok(collected) => collected.to_bytes(),
            Err(never) => match never {},
        };
        (parts, Self { bytes })
    }

    /// Drains the request body into a cache and rebuilds the request around it.
    ///
    /// The original body is consumed exactly once, here. The returned request
    /// carries a body backed by the cached buffer and stores the cache in its
    /// extensions, so downstream consumers never touch the original source.
    pub async fn wrap(request: Request) -> (Request, Self) {
        let (mut parts, cached) = Self::from_request(request).await;
        parts.extensions.insert(cached.clone());
        let request = Request::from_parts(parts, Full::new(cached.bytes.clone()));
        (request, cached)
    }

    /// Returns the cache attached to a wrapped request, if any.
    #[must_use]
    pub fn get(request: &Request) -> Option<&Self> {
        request.extensions().get::<Self>()
    }

    /// Returns a fresh byte reader positioned at the start of the body.
    ///
    /// Every call yields an independent cursor; exhausting one does not
    /// affect any other.
    #[must_use]
    pub fn bytes_reader(&self) -> Cursor<Bytes> {
        Cursor::new(self.bytes.clone())
    }

    /// Returns a fresh text reader positioned at the start of the body.
    ///
    /// The body is decoded as UTF-8; invalid sequences are replaced with
    /// U+FFFD.
    #[must_use]
    pub fn text_reader(&self) -> Cursor<String> {
        Cursor::new(self.text().into_owned())
    }

    /// Returns the body decoded as UTF-8.
    #[must_use]
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.bytes)
    }

    /// Returns the cached bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the body length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}
