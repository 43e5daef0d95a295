//! # Product Service
//!
//! The capability the catalog loads data from. Pages never call it directly; the
//! [hooks](crate::hooks) wrap each call in a query so results are cached and shared.
//!
//! - [`InMemoryProductService`]: serves a JSON fixture, optionally with latency
//! - [`MockProductService`]: expectation-driven fake for tests

pub mod memory;
pub mod mock;

pub use memory::InMemoryProductService;
pub use mock::MockProductService;

use crate::model::{Product, ProductId, ProductsResponse};
use async_trait::async_trait;

/// Errors a product service can fail with.
///
/// The message of [`ServiceError::Failed`] is passed through verbatim, so a page shows
/// exactly what the service reported.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServiceError {
    #[error("Product not found: {0}")]
    NotFound(ProductId),

    #[error("{0}")]
    Failed(String),

    #[error("Invalid product data: {0}")]
    InvalidData(String),
}

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn get_products(&self) -> Result<ProductsResponse, ServiceError>;

    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError>;
}
