//! # Consumer Components
//!
//! Pure renderers over a resolved [`Product`]. They never fetch; pages hand them data
//! that the suspense hooks guarantee is present. Only genuinely optional fields (the
//! brand) fall back to [`PLACEHOLDER`](crate::model::PLACEHOLDER).
//!
//! The [`guarded`] variants take `Option<&Product>` for pages on the manual convention,
//! where the entity itself may still be missing.

pub mod guarded;

use crate::model::{Product, ProductsResponse};
use query_framework::View;

/// Title, price and description.
pub fn product_info(product: &Product) -> View {
    View::new()
        .heading(product.title.as_str())
        .field("Price", product.formatted_price())
        .text(product.description.as_str())
}

pub fn product_meta(product: &Product) -> View {
    View::new()
        .field("Brand", product.brand_or_placeholder())
        .field("Category", product.category.as_str())
        .field("Rating", format!("{:.1} / 5", product.rating))
        .field("Availability", product.availability_status.as_str())
        .field("Return Policy", product.return_policy.as_str())
}

/// The first gallery image, or the thumbnail when the gallery is empty.
pub fn product_image(product: &Product) -> View {
    View::new().image(product.display_image(), product.title.as_str())
}

pub fn product_actions(product: &Product) -> View {
    let stock = if product.in_stock() {
        format!("{} in stock", product.stock)
    } else {
        "Out of stock".to_string()
    };
    View::new()
        .text(stock)
        .button("Add to Cart", product.in_stock())
}

/// Listing entry linking to the detail page.
pub fn product_card(product: &Product) -> View {
    View::new()
        .image(product.thumbnail.as_str(), product.title.as_str())
        .link(format!("/product/{}", product.id), product.title.as_str())
        .field("Price", product.formatted_price())
}

pub fn product_detail(product: &Product) -> View {
    product_image(product)
        .append(product_info(product))
        .append(product_meta(product))
        .append(product_actions(product))
}

pub fn product_list(response: &ProductsResponse) -> View {
    let summary = format!(
        "Showing {} of {} products",
        response.products.len(),
        response.total
    );
    response
        .products
        .iter()
        .map(product_card)
        .fold(View::new().heading("Products").text(summary), View::append)
}
