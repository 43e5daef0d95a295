//! # Product Catalog
//!
//! A product catalog rendered through the query framework: a listing page and a detail
//! page, available on both the manual and the suspense fetch conventions.
//!
//! ## 🚀 Core Components
//!
//! - **[model]**: [`Product`](model::Product) and the [`ProductsResponse`](model::ProductsResponse) envelope.
//! - **[service]**: the [`ProductService`](service::ProductService) capability, an in-memory
//!   implementation and a scriptable mock.
//! - **[hooks]**: `use_products` / `use_product` in [`manual`](hooks::manual) and
//!   [`suspense`](hooks::suspense) flavors, keyed `["products"]` and `["product", id]`.
//! - **[components]**: pure renderers over a resolved product, plus guarded variants.
//! - **[routes]**: the pages and the two route tables.
//! - **[lifecycle]**: [`CatalogApp`](lifecycle::CatalogApp), which starts and stops everything.
//!
//! ## 🧪 Testing
//!
//! See [`service::mock`] for scripting service responses, and `tests/` for end-to-end
//! page scenarios.

pub mod components;
pub mod hooks;
pub mod lifecycle;
pub mod model;
pub mod routes;
pub mod service;
