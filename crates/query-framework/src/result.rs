//! # Fetch Results
//!
//! A query is always in one of three states, captured by [`FetchResult`]. The two calling
//! conventions consume it differently:
//!
//! - **Manual**: [`FetchResult::into_state`] spreads the union into a [`QueryState`] with
//!   `data`, `is_loading` and `error`, and the caller branches on all three.
//! - **Suspense**: [`FetchResult::suspend`] collapses it to `Result<Arc<T>, Interrupt>`.
//!   Pending and failed results leave the component through `?` and are handled by the
//!   enclosing route boundary, so the component body only ever sees resolved data.

use crate::error::FetchError;
use crate::key::QueryKey;
use std::any::Any;
use std::fmt::{self, Debug};
use std::sync::Arc;

/// A type-erased cached value.
pub type CachedValue = Arc<dyn Any + Send + Sync>;

/// The resolution state of an asynchronous entity.
pub enum FetchResult<T> {
    Pending,
    Error(FetchError),
    Success(Arc<T>),
}

impl<T> Clone for FetchResult<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Pending => Self::Pending,
            Self::Error(e) => Self::Error(e.clone()),
            Self::Success(data) => Self::Success(Arc::clone(data)),
        }
    }
}

impl<T: Debug> Debug for FetchResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Error(e) => f.debug_tuple("Error").field(e).finish(),
            Self::Success(data) => f.debug_tuple("Success").field(data).finish(),
        }
    }
}

impl<T> FetchResult<T> {
    /// Converts to the manual convention.
    ///
    /// `fetching` distinguishes a pending query with a request in flight from a disabled
    /// one; only the former reports `is_loading`.
    pub fn into_state(self, fetching: bool) -> QueryState<T> {
        match self {
            Self::Pending => QueryState {
                data: None,
                is_loading: fetching,
                error: None,
            },
            Self::Error(error) => QueryState {
                data: None,
                is_loading: false,
                error: Some(error),
            },
            Self::Success(data) => QueryState {
                data: Some(data),
                is_loading: false,
                error: None,
            },
        }
    }

    /// Converts to the suspense convention.
    pub fn suspend(self, key: &QueryKey) -> Result<Arc<T>, Interrupt> {
        match self {
            Self::Pending => Err(Interrupt::Suspend(key.clone())),
            Self::Error(error) => Err(Interrupt::Fail(error)),
            Self::Success(data) => Ok(data),
        }
    }
}

/// What a manual-mode hook hands back: all three fields at once.
pub struct QueryState<T> {
    pub data: Option<Arc<T>>,
    pub is_loading: bool,
    pub error: Option<FetchError>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            is_loading: self.is_loading,
            error: self.error.clone(),
        }
    }
}

impl<T: Debug> Debug for QueryState<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueryState")
            .field("data", &self.data)
            .field("is_loading", &self.is_loading)
            .field("error", &self.error)
            .finish()
    }
}

/// Why a component stopped evaluating before producing a view.
#[derive(Debug, Clone)]
pub enum Interrupt {
    /// A dependency is still pending; the boundary shows its pending renderer and
    /// re-evaluates the component once the key settles.
    Suspend(QueryKey),
    /// A dependency failed; the boundary shows its error renderer.
    Fail(FetchError),
}

impl From<FetchError> for Interrupt {
    fn from(error: FetchError) -> Self {
        Self::Fail(error)
    }
}
