//! # Framework Errors
//!
//! Three error types live here:
//!
//! - [`FetchError`] is the single failure kind a query can settle with. It wraps whatever
//!   the producer returned and never rewrites it, so the message a service produced is the
//!   message a boundary renders.
//! - [`QueryError`] covers the cache plumbing itself (closed channels, type mismatches)
//!   plus a pass-through for fetch failures.
//! - [`RouteError`] is returned by the [`Router`](crate::Router) when a path cannot be
//!   mounted.

use crate::key::QueryKey;
use std::error::Error;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

/// An opaque, cheaply cloneable fetch failure.
///
/// The same failure is handed to every observer of a key, hence the `Arc`.
#[derive(Clone)]
pub struct FetchError(Arc<dyn Error + Send + Sync>);

#[derive(Debug, thiserror::Error)]
#[error("{0}")]
struct MessageError(String);

impl FetchError {
    /// Wraps a producer error unchanged.
    pub fn new<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        Self(Arc::new(error))
    }

    /// Builds a failure from a plain message.
    pub fn msg(message: impl Into<String>) -> Self {
        Self::new(MessageError(message.into()))
    }

    /// The human-readable message of the underlying error.
    pub fn message(&self) -> String {
        self.0.to_string()
    }

    pub fn inner(&self) -> &(dyn Error + Send + Sync + 'static) {
        self.0.as_ref()
    }

    /// Attempts to view the underlying error as a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.0.downcast_ref::<E>()
    }
}

impl Debug for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FetchError").field(&self.0).finish()
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// Two failures are equal when they carry the same message.
impl PartialEq for FetchError {
    fn eq(&self, other: &Self) -> bool {
        self.message() == other.message()
    }
}

impl Error for FetchError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        self.0.source()
    }
}

/// Errors raised by the query cache and its client.
#[derive(Debug, Clone, thiserror::Error)]
pub enum QueryError {
    #[error("Query cache closed")]
    CacheClosed,
    #[error("Query cache dropped response channel")]
    CacheDropped,
    #[error("Cached value for {0} has a different type")]
    TypeMismatch(QueryKey),
    #[error(transparent)]
    Fetch(#[from] FetchError),
}

/// Errors raised while mounting or rendering a route.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RouteError {
    #[error("No route matches {0}")]
    NotFound(String),
    #[error("No route is active")]
    NoActiveRoute,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error, PartialEq)]
    #[error("Failed to fetch product")]
    struct ServiceFailure;

    #[test]
    fn test_fetch_error_keeps_message_and_type() {
        let error = FetchError::new(ServiceFailure);
        assert_eq!(error.message(), "Failed to fetch product");
        assert_eq!(error.downcast_ref::<ServiceFailure>(), Some(&ServiceFailure));

        let query_error = QueryError::from(error.clone());
        assert_eq!(query_error.to_string(), "Failed to fetch product");
    }

    #[test]
    fn test_msg_constructor() {
        assert_eq!(FetchError::msg("boom").to_string(), "boom");
    }
}
