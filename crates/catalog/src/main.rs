//! # Product Catalog Demo
//!
//! Renders the bundled catalog on the suspense convention:
//!
//! 1. Starting the [`CatalogApp`] over the bundled JSON fixture.
//! 2. Mounting `/` and printing the product list.
//! 3. Mounting `/product/<id>` (id from the first argument, default `1`) and printing
//!    the detail page.
//!
//! ```bash
//! RUST_LOG=info cargo run -p catalog -- 3
//! ```

use catalog::hooks::CatalogContext;
use catalog::lifecycle::{CatalogApp, FetchMode};
use catalog::model::ProductId;
use catalog::routes::{product_path, PRODUCTS_PATH};
use catalog::service::InMemoryProductService;
use query_framework::tracing::setup_tracing;
use query_framework::{BoundaryState, QueryConfig, Router};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn, Instrument};

/// Mounts `path`, printing the pending view if there is one, and waits for it to settle.
async fn show(
    router: &mut Router<CatalogContext>,
    path: &str,
    timeout: Duration,
) -> Result<BoundaryState, String> {
    let first = router.navigate(path).await.map_err(|e| e.to_string())?;
    if first.is_pending() {
        println!("{}", first.view());
    }
    router
        .render_until_settled(timeout)
        .await
        .map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<(), String> {
    // Setup tracing once for the entire application
    setup_tracing();

    let id = match std::env::args().nth(1) {
        Some(arg) => ProductId::from_param(&arg).map_err(|e| e.to_string())?,
        None => ProductId(1),
    };

    let service = InMemoryProductService::bundled()
        .map_err(|e| e.to_string())?
        .with_latency(Duration::from_millis(150));
    let mut app = CatalogApp::new(Arc::new(service), QueryConfig::default(), FetchMode::Suspense);

    let timeout = app.settle_timeout();
    for path in [PRODUCTS_PATH.to_string(), product_path(id)] {
        let span = tracing::info_span!("page", %path);
        let state = show(&mut app.router, &path, timeout).instrument(span).await?;

        match &state {
            BoundaryState::Failed { error, .. } => warn!(%error, "Page failed"),
            _ => info!(resolved = state.is_resolved(), "Page rendered"),
        }
        println!("{}", state.view());
    }

    let stats = app.client.stats().await.map_err(|e| e.to_string())?;
    info!(entries = stats.entries, "Cache populated");

    app.shutdown().await.map_err(|e| e.to_string())?;

    info!("Application completed successfully");
    Ok(())
}
