//! # Route Table
//!
//! Two paths, registered for either calling convention:
//!
//! | Path | Suspense page | Manual page |
//! |------|---------------|-------------|
//! | `/` | [`ProductsPage`] | [`ManualProductsPage`] |
//! | `/product/$productId` | [`ProductDetailPage`] | [`ManualProductDetailPage`] |
//!
//! On the suspense table each route supplies the pending and error renderers; on the
//! manual table the pages show those states themselves.

pub mod pages;

pub use pages::*;

use crate::hooks::CatalogContext;
use crate::model::ProductId;
use query_framework::{FetchError, QueryClient, Route, Router, View};
use std::sync::Arc;

pub const PRODUCTS_PATH: &str = "/";
pub const PRODUCT_PATH: &str = "/product/$productId";

pub fn product_path(id: ProductId) -> String {
    format!("/product/{id}")
}

pub fn loading_view() -> View {
    View::new().spinner("Loading product...")
}

/// Shows the failure message exactly as the service reported it.
pub fn error_view(error: &FetchError) -> View {
    View::new()
        .heading("Something went wrong")
        .alert(format!("Error: {}", error.message()))
}

pub fn suspense_routes(client: QueryClient, context: Arc<CatalogContext>) -> Router<CatalogContext> {
    Router::new(client, context)
        .route(
            Route::new(PRODUCTS_PATH, ProductsPage)
                .pending_component(|| View::new().spinner("Loading products..."))
                .error_component(error_view),
        )
        .route(
            Route::new(PRODUCT_PATH, ProductDetailPage)
                .pending_component(loading_view)
                .error_component(error_view),
        )
}

pub fn manual_routes(client: QueryClient, context: Arc<CatalogContext>) -> Router<CatalogContext> {
    Router::new(client, context)
        .route(Route::new(PRODUCTS_PATH, ManualProductsPage))
        .route(Route::new(PRODUCT_PATH, ManualProductDetailPage))
}
