//! # Application Lifecycle
//!
//! [`CatalogApp`] owns everything that runs: the query cache actor and the router
//! mounted on top of it.
//!
//! ## Startup
//!
//! 1. **Cache** - `QueryCache::new(config)` creates the actor and its client; the actor is
//!    spawned on its own task.
//! 2. **Context** - the product service is wrapped in a [`CatalogContext`](crate::hooks::CatalogContext)
//!    that every page evaluation receives.
//! 3. **Routes** - the suspense or manual route table is mounted, chosen by [`FetchMode`].
//!
//! ## Graceful Shutdown
//!
//! 1. **Unmount** - the active page releases every key it held
//! 2. **Drop clients** - the router and the app's own client close the cache channel
//! 3. **Actor exits** - in-flight fetches are aborted and the final entry count is logged
//! 4. **Await completion** - `shutdown` returns the cache task's `JoinError`, if any
//!
//! Tests get a fresh cache per `CatalogApp`, so no state leaks between them.
//!
//! ## Observability
//!
//! Call [`query_framework::tracing::setup_tracing`] once at process start; every cache and
//! router event is logged with its key and route path.

pub mod catalog_app;

pub use catalog_app::*;
