//! Component variants for the manual convention, where the product may not be loaded yet.
//!
//! Every field access is guarded: a missing product renders
//! [`PLACEHOLDER`](crate::model::PLACEHOLDER) in each slot instead of failing.

use crate::model::{Product, PLACEHOLDER};
use query_framework::View;

fn field<'a>(product: Option<&'a Product>, read: impl FnOnce(&'a Product) -> &'a str) -> &'a str {
    product.map(read).unwrap_or(PLACEHOLDER)
}

pub fn product_info(product: Option<&Product>) -> View {
    View::new()
        .heading(field(product, |p| p.title.as_str()))
        .field(
            "Price",
            product.map_or_else(|| PLACEHOLDER.to_string(), Product::formatted_price),
        )
        .text(field(product, |p| p.description.as_str()))
}

pub fn product_meta(product: Option<&Product>) -> View {
    View::new()
        .field("Brand", field(product, Product::brand_or_placeholder))
        .field("Category", field(product, |p| p.category.as_str()))
        .field(
            "Rating",
            product.map_or_else(|| PLACEHOLDER.to_string(), |p| format!("{:.1} / 5", p.rating)),
        )
        .field("Availability", field(product, |p| p.availability_status.as_str()))
        .field("Return Policy", field(product, |p| p.return_policy.as_str()))
}

pub fn product_image(product: Option<&Product>) -> View {
    match product {
        Some(product) => super::product_image(product),
        None => View::new(),
    }
}

pub fn product_actions(product: Option<&Product>) -> View {
    match product {
        Some(product) => super::product_actions(product),
        None => View::new().button("Add to Cart", false),
    }
}

pub fn product_detail(product: Option<&Product>) -> View {
    product_image(product)
        .append(product_info(product))
        .append(product_meta(product))
        .append(product_actions(product))
}
