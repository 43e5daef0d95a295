//! Page components mounted by the route table.
//!
//! The suspense pages contain no loading or error branches at all; the manual pages
//! render both inline.

use super::{error_view, loading_view, PRODUCTS_PATH};
use crate::components::{guarded, product_detail, product_list};
use crate::hooks::{manual, suspense, CatalogContext};
use async_trait::async_trait;
use query_framework::{Component, Render, Scope, View};

fn back_link() -> View {
    View::new().link(PRODUCTS_PATH, "Back to products")
}

/// Product listing on the suspense convention.
pub struct ProductsPage;

#[async_trait]
impl Component<CatalogContext> for ProductsPage {
    async fn render(&self, cx: &mut Scope<'_, CatalogContext>) -> Render {
        let response = suspense::use_products(cx).await?;
        Ok(product_list(&response))
    }
}

/// Product detail on the suspense convention.
pub struct ProductDetailPage;

#[async_trait]
impl Component<CatalogContext> for ProductDetailPage {
    async fn render(&self, cx: &mut Scope<'_, CatalogContext>) -> Render {
        let product = suspense::use_product(cx).await?;
        Ok(back_link().append(product_detail(&product)))
    }
}

/// Product listing on the manual convention.
pub struct ManualProductsPage;

#[async_trait]
impl Component<CatalogContext> for ManualProductsPage {
    async fn render(&self, cx: &mut Scope<'_, CatalogContext>) -> Render {
        let state = manual::use_products(cx).await;

        if state.is_loading {
            return Ok(View::new().spinner("Loading products..."));
        }
        if let Some(error) = &state.error {
            return Ok(error_view(error));
        }
        Ok(match &state.data {
            Some(response) => product_list(response),
            None => View::new().heading("Products").text("No products"),
        })
    }
}

/// Product detail on the manual convention.
pub struct ManualProductDetailPage;

#[async_trait]
impl Component<CatalogContext> for ManualProductDetailPage {
    async fn render(&self, cx: &mut Scope<'_, CatalogContext>) -> Render {
        let state = manual::use_product(cx).await;

        if state.is_loading {
            return Ok(loading_view());
        }
        if let Some(error) = &state.error {
            return Ok(error_view(error));
        }
        Ok(back_link().append(guarded::product_detail(state.data.as_deref())))
    }
}
