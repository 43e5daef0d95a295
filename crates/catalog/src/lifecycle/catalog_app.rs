use crate::hooks::CatalogContext;
use crate::routes::{manual_routes, suspense_routes};
use crate::service::ProductService;
use query_framework::{QueryCache, QueryClient, QueryConfig, Router};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};
use tracing::{error, info};

/// Time allowed for a single attempt on top of the retry backoff.
const ATTEMPT_ALLOWANCE: Duration = Duration::from_secs(5);

/// Which calling convention the mounted pages use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    #[default]
    Suspense,
    Manual,
}

/// The running catalog: one query cache actor and a router over it.
///
/// # Example
///
/// ```rust
/// use catalog::lifecycle::{CatalogApp, FetchMode};
/// use catalog::service::InMemoryProductService;
/// use query_framework::QueryConfig;
/// use std::sync::Arc;
///
/// #[tokio::main]
/// async fn main() {
///     let service = Arc::new(InMemoryProductService::bundled().unwrap());
///     let mut app = CatalogApp::new(service, QueryConfig::for_tests(), FetchMode::Suspense);
///
///     let timeout = app.settle_timeout();
///     app.router.navigate("/product/1").await.unwrap();
///     let state = app.router.render_until_settled(timeout).await.unwrap();
///     assert!(state.view().contains_text("$9.99"));
///
///     app.shutdown().await.unwrap();
/// }
/// ```
pub struct CatalogApp {
    pub router: Router<CatalogContext>,

    /// Handle to the shared cache, for prefetching and invalidation.
    pub client: QueryClient,

    settle_timeout: Duration,
    handle: JoinHandle<()>,
}

impl CatalogApp {
    /// Spawns the query cache and mounts the route table for `mode`.
    pub fn new(service: Arc<dyn ProductService>, config: QueryConfig, mode: FetchMode) -> Self {
        let settle_timeout = config.retry_budget() + ATTEMPT_ALLOWANCE;
        let (cache, client) = QueryCache::new(config);
        let handle = tokio::spawn(cache.run());

        let context = Arc::new(CatalogContext::new(service));
        let router = match mode {
            FetchMode::Suspense => suspense_routes(client.clone(), context),
            FetchMode::Manual => manual_routes(client.clone(), context),
        };
        info!(?mode, "Catalog started");

        Self {
            router,
            client,
            settle_timeout,
            handle,
        }
    }

    /// How long a page may stay pending: every retry backoff of the configured
    /// schedule plus an allowance for the attempts themselves.
    pub fn settle_timeout(&self) -> Duration {
        self.settle_timeout
    }

    /// Unmounts the active page, drops every client and waits for the cache to stop.
    pub async fn shutdown(mut self) -> Result<(), JoinError> {
        info!("Shutting down catalog...");
        self.router.unmount().await;

        // The cache exits once its last sender is gone
        drop(self.router);
        drop(self.client);

        if let Err(e) = self.handle.await {
            error!(error = %e, "Query cache task failed");
            return Err(e);
        }
        info!("Catalog shutdown complete.");
        Ok(())
    }
}
