//! Middleware context types.
//!
//! The [`MiddlewareContext`] carries per-request state through the pipeline.
//! Its central piece is the request's [`ContextStore`], which every stage and
//! the handler reach through [`store`](MiddlewareContext::store) and
//! [`store_mut`](MiddlewareContext::store_mut) instead of through a global.

use hestia_core::ContextStore;
use std::any::{Any, TypeId};
use std::collections::HashMap;

/// Context that flows through the middleware pipeline.
///
/// One context belongs to exactly one in-flight request. It is never shared
/// between concurrent requests.
///
/// # Example
///
/// ```
/// use hestia_middleware::context::MiddlewareContext;
///
/// let mut ctx = MiddlewareContext::new();
/// ctx.store_mut().put("clientId", "12345").unwrap();
///
/// assert_eq!(ctx.store().get("clientId").unwrap(), Some("12345"));
/// ```
#[derive(Debug)]
pub struct MiddlewareContext {
    /// Diagnostic key/value entries for this request.
    store: ContextStore,

    /// Type-erased extension data.
    extensions: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl MiddlewareContext {
    /// Creates a new, empty middleware context.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: ContextStore::new(),
            extensions: HashMap::new(),
        }
    }

    /// Returns the request's context store.
    #[must_use]
    pub fn store(&self) -> &ContextStore {
        &self.store
    }

    /// Returns the request's context store for writing.
    pub fn store_mut(&mut self) -> &mut ContextStore {
        &mut self.store
    }

    /// Stores a typed extension value, replacing any previous value of that type.
    pub fn set_extension<T: Send + Sync + 'static>(&mut self, value: T) {
        self.extensions.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Retrieves a typed extension value.
    #[must_use]
    pub fn get_extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions
            .get(&TypeId::of::<T>())
            .and_then(|v| v.downcast_ref())
    }

    /// Removes and returns a typed extension value.
    pub fn remove_extension<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.extensions
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if an extension of the given type exists.
    #[must_use]
    pub fn has_extension<T: Send + Sync + 'static>(&self) -> bool {
        self.extensions.contains_key(&TypeId::of::<T>())
    }
}

impl Default for MiddlewareContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_context_has_empty_store() {
        let ctx = MiddlewareContext::new();
        assert!(ctx.store().is_empty());
    }

    #[test]
    fn test_store_access() {
        let mut ctx = MiddlewareContext::new();
        ctx.store_mut().put("transactionId", "abcde").unwrap();
        assert_eq!(ctx.store().get("transactionId").unwrap(), Some("abcde"));

        ctx.store_mut().clear();
        assert!(ctx.store().is_empty());
    }

    #[test]
    fn test_extensions() {
        #[derive(Debug, Clone, PartialEq)]
        struct Marker {
            value: i32,
        }

        let mut ctx = MiddlewareContext::new();
        assert!(!ctx.has_extension::<Marker>());

        ctx.set_extension(Marker { value: 42 });
        assert!(ctx.has_extension::<Marker>());
        assert_eq!(ctx.get_extension::<Marker>(), Some(&Marker { value: 42 }));

        assert_eq!(ctx.remove_extension::<Marker>(), Some(Marker { value: 42 }));
        assert!(!ctx.has_extension::<Marker>());
    }
}
