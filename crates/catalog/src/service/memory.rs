//! A [`ProductService`] backed by a JSON document held in memory.

use super::{ProductService, ServiceError};
use crate::model::{Product, ProductId, ProductsResponse};
use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, instrument};

const BUNDLED: &str = include_str!("../../data/products.json");

#[derive(Debug, Clone)]
pub struct InMemoryProductService {
    catalog: ProductsResponse,
    latency: Option<Duration>,
}

impl InMemoryProductService {
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            catalog: ProductsResponse::from_products(products),
            latency: None,
        }
    }

    /// Parses a `ProductsResponse` JSON document.
    pub fn from_json(json: &str) -> Result<Self, ServiceError> {
        let catalog: ProductsResponse =
            serde_json::from_str(json).map_err(|e| ServiceError::InvalidData(e.to_string()))?;
        Ok(Self {
            catalog,
            latency: None,
        })
    }

    /// The sample catalog shipped with the crate.
    pub fn bundled() -> Result<Self, ServiceError> {
        Self::from_json(BUNDLED)
    }

    /// Delays every response by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    pub fn products(&self) -> &[Product] {
        &self.catalog.products
    }

    async fn wait(&self) {
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl ProductService for InMemoryProductService {
    #[instrument(skip(self))]
    async fn get_products(&self) -> Result<ProductsResponse, ServiceError> {
        self.wait().await;
        debug!(count = self.catalog.products.len(), "Listing products");
        Ok(self.catalog.clone())
    }

    #[instrument(skip(self))]
    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        self.wait().await;
        self.catalog
            .products
            .iter()
            .find(|product| product.id == id)
            .cloned()
            .ok_or(ServiceError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bundled_catalog_loads() {
        let service = InMemoryProductService::bundled().unwrap();
        let response = service.get_products().await.unwrap();

        assert!(!response.products.is_empty());
        assert_eq!(response.total as usize, response.products.len());
        assert!(response.products.iter().any(|p| p.brand.is_none()));
        assert!(response.products.iter().any(|p| p.images.is_empty()));
    }

    #[tokio::test]
    async fn test_get_product_by_id() {
        let service = InMemoryProductService::new(vec![
            Product::new(1, "Mascara", 9.99, 5),
            Product::new(2, "Palette", 19.99, 0),
        ]);

        assert_eq!(service.get_product(ProductId(2)).await.unwrap().title, "Palette");
        assert_eq!(
            service.get_product(ProductId(9)).await,
            Err(ServiceError::NotFound(ProductId(9)))
        );
    }

    #[test]
    fn test_invalid_json_is_rejected() {
        let result = InMemoryProductService::from_json(r#"{"products": 3}"#);
        assert!(matches!(result, Err(ServiceError::InvalidData(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_latency_delays_responses() {
        let service = InMemoryProductService::new(vec![Product::new(1, "Mascara", 9.99, 5)])
            .with_latency(Duration::from_millis(500));

        let start = tokio::time::Instant::now();
        service.get_product(ProductId(1)).await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(500));
    }
}
