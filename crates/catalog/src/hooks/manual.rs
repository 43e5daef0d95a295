//! Manual-convention hooks: the caller branches on `data`, `is_loading` and `error`.

use super::{product_id_param, product_key, product_producer, products_key, products_producer, CatalogContext};
use crate::model::{Product, ProductId, ProductsResponse};
use query_framework::{QueryState, Scope};
use tracing::debug;

pub async fn use_products(cx: &mut Scope<'_, CatalogContext>) -> QueryState<ProductsResponse> {
    let producer = products_producer(cx.context().service());
    cx.use_query(products_key(), producer, true).await
}

/// Reads the product named by the `productId` route parameter.
///
/// While the parameter is missing, malformed or zero the query is disabled: the service
/// is not called and the state carries neither data nor a loading flag.
pub async fn use_product(cx: &mut Scope<'_, CatalogContext>) -> QueryState<Product> {
    let parsed = product_id_param(cx);
    if let Err(error) = &parsed {
        debug!(%error, "Product query disabled");
    }
    let enabled = parsed.is_ok();
    let id = parsed.unwrap_or(ProductId(0));

    let producer = product_producer(cx.context().service(), id);
    cx.use_query(product_key(id), producer, enabled).await
}
