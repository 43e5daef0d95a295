//! # Mock Product Service
//!
//! `MockProductService` implements [`ProductService`] from a queue of expectations so
//! tests can script exactly what the service returns, and when.
//!
//! | Builder method | Call behaves like |
//! |----------------|-------------------|
//! | `return_ok(value)` | resolves immediately with `value` |
//! | `return_err(message)` | fails with [`ServiceError::Failed`] carrying `message` verbatim |
//! | `never_resolves()` | stays pending forever |
//! | `resolve_when()` | stays pending until the returned sender is used |
//!
//! ```rust
//! use catalog::model::{Product, ProductId};
//! use catalog::service::{MockProductService, ProductService};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mock = MockProductService::new();
//!     mock.expect_get_product(ProductId(1))
//!         .return_ok(Product::new(1, "Test Product", 99.99, 3));
//!     mock.expect_get_product(ProductId(2))
//!         .return_err("Failed to fetch product");
//!
//!     assert_eq!(mock.get_product(ProductId(1)).await.unwrap().title, "Test Product");
//!     let error = mock.get_product(ProductId(2)).await.unwrap_err();
//!     assert_eq!(error.to_string(), "Failed to fetch product");
//!
//!     mock.verify(); // Ensures all expectations were met
//! }
//! ```
//!
//! A call with no matching expectation fails with a descriptive error and is reported by
//! [`MockProductService::verify`].

use super::{ProductService, ServiceError};
use crate::model::{Product, ProductId, ProductsResponse};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::oneshot;
use tracing::debug;

// =============================================================================
// EXPECTATION BUILDER API
// =============================================================================

/// How a scripted call completes.
enum Response<T> {
    Ok(T),
    Err(String),
    Never,
    When(oneshot::Receiver<Result<T, String>>),
}

impl<T> Response<T> {
    async fn resolve(self) -> Result<T, ServiceError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::Err(message) => Err(ServiceError::Failed(message)),
            Self::Never => std::future::pending().await,
            Self::When(receiver) => match receiver.await {
                Ok(result) => result.map_err(ServiceError::Failed),
                Err(_) => Err(ServiceError::Failed(
                    "Mock response sender dropped".to_string(),
                )),
            },
        }
    }
}

#[derive(Default)]
struct MockState {
    products: VecDeque<Response<ProductsResponse>>,
    product: VecDeque<(ProductId, Response<Product>)>,
    products_calls: usize,
    product_calls: Vec<ProductId>,
    unexpected: Vec<String>,
}

/// Scripted [`ProductService`] for tests. Clones share the same expectations.
#[derive(Clone, Default)]
pub struct MockProductService {
    state: Arc<Mutex<MockState>>,
}

impl MockProductService {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        Self::default()
    }

    /// Expects a `get_products` call.
    pub fn expect_get_products(&self) -> ExpectationBuilder<ProductsResponse> {
        ExpectationBuilder {
            state: Arc::clone(&self.state),
            push: Box::new(|state: &mut MockState, response: Response<ProductsResponse>| {
                state.products.push_back(response)
            }),
        }
    }

    /// Expects a `get_product` call for `id`.
    pub fn expect_get_product(&self, id: ProductId) -> ExpectationBuilder<Product> {
        ExpectationBuilder {
            state: Arc::clone(&self.state),
            push: Box::new(move |state: &mut MockState, response: Response<Product>| {
                state.product.push_back((id, response))
            }),
        }
    }

    /// Number of `get_products` calls so far.
    pub fn products_calls(&self) -> usize {
        self.lock().products_calls
    }

    /// Number of `get_product` calls for `id` so far.
    pub fn product_calls(&self, id: ProductId) -> usize {
        self.lock()
            .product_calls
            .iter()
            .filter(|called| **called == id)
            .count()
    }

    /// Total number of calls of either kind.
    pub fn total_calls(&self) -> usize {
        let state = self.lock();
        state.products_calls + state.product_calls.len()
    }

    /// Verifies that all expectations were met and no unexpected call was made.
    pub fn verify(&self) {
        let state = self.lock();
        let remaining = state.products.len() + state.product.len();
        if remaining > 0 {
            panic!("Not all expectations were met. {remaining} remaining");
        }
        if !state.unexpected.is_empty() {
            panic!("Unexpected calls: {:?}", state.unexpected);
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl ProductService for MockProductService {
    async fn get_products(&self) -> Result<ProductsResponse, ServiceError> {
        let response = {
            let mut state = self.lock();
            state.products_calls += 1;
            let response = state.products.pop_front();
            if response.is_none() {
                state.unexpected.push("get_products()".to_string());
            }
            response
        };
        debug!(scripted = response.is_some(), "Mock get_products");
        match response {
            Some(response) => response.resolve().await,
            None => Err(ServiceError::Failed(
                "Unexpected call to get_products()".to_string(),
            )),
        }
    }

    async fn get_product(&self, id: ProductId) -> Result<Product, ServiceError> {
        let response = {
            let mut state = self.lock();
            state.product_calls.push(id);
            let position = state.product.iter().position(|(expected, _)| *expected == id);
            let response = position
                .and_then(|index| state.product.remove(index))
                .map(|(_, response)| response);
            if response.is_none() {
                state.unexpected.push(format!("get_product({id})"));
            }
            response
        };
        debug!(%id, scripted = response.is_some(), "Mock get_product");
        match response {
            Some(response) => response.resolve().await,
            None => Err(ServiceError::Failed(format!(
                "Unexpected call to get_product({id})"
            ))),
        }
    }
}

type Push<T> = Box<dyn FnOnce(&mut MockState, Response<T>) + Send>;

/// Builder returned by the `expect_*` methods. Each call of a terminal method queues one
/// expectation.
pub struct ExpectationBuilder<T> {
    state: Arc<Mutex<MockState>>,
    push: Push<T>,
}

impl<T> ExpectationBuilder<T> {
    fn add(self, response: Response<T>) {
        let Self { state, push } = self;
        let mut guard = state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        push(&mut guard, response);
    }

    /// Sets the expectation to return a successful result.
    pub fn return_ok(self, value: T) {
        self.add(Response::Ok(value));
    }

    /// Sets the expectation to fail with `message`.
    pub fn return_err(self, message: impl Into<String>) {
        self.add(Response::Err(message.into()));
    }

    /// Sets the expectation to never complete.
    pub fn never_resolves(self) {
        self.add(Response::Never);
    }

    /// Sets the expectation to complete when the returned sender is used.
    pub fn resolve_when(self) -> oneshot::Sender<Result<T, String>> {
        let (sender, receiver) = oneshot::channel();
        self.add(Response::When(receiver));
        sender
    }
}
