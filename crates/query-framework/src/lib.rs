//! # Query Framework
//!
//! Building blocks for loading remote data into rendered pages: a keyed, deduplicating
//! query cache that runs as an actor, plus a small router whose routes act as
//! suspense boundaries.
//!
//! ## 🚀 Core Components
//!
//! - **[`QueryCache`] / [`QueryClient`]**: the cache actor and its cloneable handle. Reads
//!   for the same [`QueryKey`] share one in-flight request and one cached result.
//! - **[`Scope`]**: what a component reads through. It offers two hook conventions:
//!   - [`Scope::use_query`] (manual) never interrupts and reports `{ data, is_loading, error }`.
//!   - [`Scope::use_suspense_query`] returns the data or an [`Interrupt`], which the
//!     component propagates with `?`.
//! - **[`Router`] / [`Route`]**: mounts one [`Component`] at a time and turns interrupts into
//!   a [`BoundaryState`]: the pending renderer, the error renderer, or the component's view.
//! - **[`View`]**: the flat node list a component renders.
//!
//! ## Architecture Overview
//!
//! 1. **Cache Layer** ([`QueryCache`]): owns all entries, processes requests sequentially
//! 2. **Interface Layer** ([`QueryClient`]): type-safe async requests over an `mpsc` channel
//! 3. **Render Layer** ([`Router`], [`Scope`], [`Component`]): evaluates pages against the cache
//!
//! ## Writing a Component
//!
//! ```rust
//! use async_trait::async_trait;
//! use query_framework::{
//!     producer, Component, FetchError, QueryCache, QueryConfig, QueryKey, Render, Route,
//!     Router, Scope, View,
//! };
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! struct Greeting;
//!
//! #[async_trait]
//! impl Component<()> for Greeting {
//!     async fn render(&self, cx: &mut Scope<'_, ()>) -> Render {
//!         let name = cx
//!             .use_suspense_query::<String>(
//!                 QueryKey::new("name"),
//!                 producer(|| async { Ok::<_, FetchError>("Alice".to_string()) }),
//!             )
//!             .await?;
//!         Ok(View::new().heading(format!("Hello, {name}")))
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let (cache, client) = QueryCache::new(QueryConfig::for_tests());
//!     tokio::spawn(cache.run());
//!
//!     let mut router = Router::new(client, Arc::new(())).route(Route::new("/", Greeting));
//!
//!     // First evaluation suspends while the name is fetched
//!     let first = router.navigate("/").await.unwrap();
//!     assert!(first.is_pending());
//!
//!     let state = router
//!         .render_until_settled(Duration::from_secs(1))
//!         .await
//!         .unwrap();
//!     assert!(state.view().contains_text("Hello, Alice"));
//! }
//! ```
//!
//! ## 🧪 Testing
//!
//! [`QueryConfig::for_tests`] disables retries and garbage collection so tests observe
//! exactly one request per key. Paused Tokio time (`#[tokio::test(start_paused = true)]`)
//! drives retry backoff and collection deterministically.

pub mod cache;
pub mod client;
pub mod component;
pub mod config;
pub mod error;
pub mod key;
pub mod message;
pub mod result;
pub mod route;
pub mod scope;
pub mod tracing;
pub mod view;

pub use cache::QueryCache;
pub use client::QueryClient;
pub use component::{Component, Render};
pub use config::QueryConfig;
pub use error::{FetchError, QueryError, RouteError};
pub use key::{KeySegment, QueryKey};
pub use message::{producer, CacheStats, Observation, Producer, Settled, Snapshot};
pub use result::{FetchResult, Interrupt, QueryState};
pub use route::{BoundaryState, Route, RouteParams, RoutePattern, Router};
pub use scope::Scope;
pub use view::{Node, View};
