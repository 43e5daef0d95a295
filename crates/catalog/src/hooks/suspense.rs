//! Suspense-convention hooks: the data, or an interrupt for the route boundary.
//!
//! ```rust,ignore
//! let product = suspense::use_product(cx).await?;
//! // `product` is always present here
//! ```

use super::{product_id_param, product_key, product_producer, products_key, products_producer, CatalogContext};
use crate::model::{Product, ProductsResponse};
use query_framework::{FetchError, Interrupt, Scope};
use std::sync::Arc;

pub async fn use_products(
    cx: &mut Scope<'_, CatalogContext>,
) -> Result<Arc<ProductsResponse>, Interrupt> {
    let producer = products_producer(cx.context().service());
    cx.use_suspense_query(products_key(), producer).await
}

/// Reads the product named by the `productId` route parameter.
///
/// A missing or malformed parameter fails the route without calling the service.
pub async fn use_product(cx: &mut Scope<'_, CatalogContext>) -> Result<Arc<Product>, Interrupt> {
    let id = product_id_param(cx).map_err(FetchError::new)?;
    let producer = product_producer(cx.context().service(), id);
    cx.use_suspense_query(product_key(id), producer).await
}
