//! # Fetch Hooks
//!
//! Each hook binds a cache key to a [`ProductService`] call and reads it through the
//! component's [`Scope`]:
//!
//! | Hook | Key | Producer |
//! |------|-----|----------|
//! | `use_products` | `["products"]` | `get_products()` |
//! | `use_product` | `["product", id]` | `get_product(id)` |
//!
//! Both come in two calling conventions with the same keys, so pages can move from one
//! to the other without touching the cache:
//!
//! - [`manual`]: returns a [`QueryState`](query_framework::QueryState) and never interrupts.
//! - [`suspense`]: returns the data or an [`Interrupt`](query_framework::Interrupt) for the
//!   route boundary.
//!
//! Service errors reach the caller unchanged; [`FetchError::downcast_ref`] recovers the
//! original [`ServiceError`](crate::service::ServiceError).

pub mod manual;
pub mod suspense;

use crate::model::{InvalidProductId, ProductId};
use crate::service::ProductService;
use query_framework::{producer, FetchError, Producer, QueryKey, Scope};
use std::sync::Arc;

/// Name of the route parameter holding the product id.
pub const PRODUCT_ID_PARAM: &str = "productId";

/// What catalog components receive from the router.
#[derive(Clone)]
pub struct CatalogContext {
    service: Arc<dyn ProductService>,
}

impl CatalogContext {
    pub fn new(service: Arc<dyn ProductService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &Arc<dyn ProductService> {
        &self.service
    }
}

pub fn products_key() -> QueryKey {
    QueryKey::new("products")
}

pub fn product_key(id: ProductId) -> QueryKey {
    QueryKey::new("product").with(id.0)
}

pub fn products_producer(service: &Arc<dyn ProductService>) -> Producer {
    let service = Arc::clone(service);
    producer(move || {
        let service = Arc::clone(&service);
        async move { service.get_products().await.map_err(FetchError::new) }
    })
}

pub fn product_producer(service: &Arc<dyn ProductService>, id: ProductId) -> Producer {
    let service = Arc::clone(service);
    producer(move || {
        let service = Arc::clone(&service);
        async move { service.get_product(id).await.map_err(FetchError::new) }
    })
}

/// Reads and parses the current `productId` route parameter.
pub fn product_id_param(cx: &Scope<'_, CatalogContext>) -> Result<ProductId, InvalidProductId> {
    let param = cx.param(PRODUCT_ID_PARAM).unwrap_or_default();
    ProductId::from_param(param)
}
