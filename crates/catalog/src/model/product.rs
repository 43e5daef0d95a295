use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// Shown in place of a missing optional field.
pub const PLACEHOLDER: &str = "N/A";

/// Type-safe identifier for Products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(pub u32);

impl From<u32> for ProductId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl Display for ProductId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A route parameter that is not a positive integer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid product id: {0:?}")]
pub struct InvalidProductId(pub String);

impl ProductId {
    /// Parses the `productId` route parameter. Zero is rejected.
    pub fn from_param(param: &str) -> Result<Self, InvalidProductId> {
        match param.trim().parse::<u32>() {
            Ok(id) if id > 0 => Ok(Self(id)),
            _ => Err(InvalidProductId(param.to_string())),
        }
    }
}

/// A product in the catalog, as returned by the product service.
///
/// Field names follow the service's JSON (`availabilityStatus`, `returnPolicy`, ...).
/// Only `id`, `title`, `price` and `stock` are required when deserializing; the other
/// fields default to empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    pub price: f64,
    #[serde(default)]
    pub rating: f64,
    pub stock: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
    #[serde(default)]
    pub availability_status: String,
    #[serde(default)]
    pub return_policy: String,
    #[serde(default)]
    pub thumbnail: String,
    #[serde(default)]
    pub images: Vec<String>,
}

impl Product {
    /// Creates a product with the required fields; everything else starts empty.
    pub fn new(id: impl Into<ProductId>, title: impl Into<String>, price: f64, stock: u32) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            description: String::new(),
            category: String::new(),
            price,
            rating: 0.0,
            stock,
            brand: None,
            availability_status: String::new(),
            return_policy: String::new(),
            thumbnail: String::new(),
            images: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn with_rating(mut self, rating: f64) -> Self {
        self.rating = rating;
        self
    }

    #[must_use]
    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    #[must_use]
    pub fn with_availability_status(mut self, status: impl Into<String>) -> Self {
        self.availability_status = status.into();
        self
    }

    #[must_use]
    pub fn with_return_policy(mut self, policy: impl Into<String>) -> Self {
        self.return_policy = policy.into();
        self
    }

    #[must_use]
    pub fn with_thumbnail(mut self, thumbnail: impl Into<String>) -> Self {
        self.thumbnail = thumbnail.into();
        self
    }

    #[must_use]
    pub fn with_images<I, S>(mut self, images: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.images = images.into_iter().map(Into::into).collect();
        self
    }

    /// The image to show: the first gallery image, or the thumbnail when there is none.
    pub fn display_image(&self) -> &str {
        self.images
            .first()
            .map(String::as_str)
            .unwrap_or(self.thumbnail.as_str())
    }

    /// Price with a dollar sign and exactly two decimals, e.g. `$99.99`.
    pub fn formatted_price(&self) -> String {
        format!("${:.2}", self.price)
    }

    pub fn brand_or_placeholder(&self) -> &str {
        self.brand.as_deref().unwrap_or(PLACEHOLDER)
    }

    pub fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// A page of products.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductsResponse {
    pub products: Vec<Product>,
    pub total: u32,
    pub skip: u32,
    pub limit: u32,
}

impl ProductsResponse {
    /// A single page holding every product.
    pub fn from_products(products: Vec<Product>) -> Self {
        let count = u32::try_from(products.len()).unwrap_or(u32::MAX);
        Self {
            products,
            total: count,
            skip: 0,
            limit: count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserializes_service_json() {
        let json = r#"{
            "id": 3,
            "title": "Powder Canister",
            "description": "Fine setting powder",
            "category": "beauty",
            "price": 14.99,
            "rating": 4.64,
            "stock": 89,
            "availabilityStatus": "In Stock",
            "returnPolicy": "60 days return policy",
            "thumbnail": "https://cdn.example.com/3/thumbnail.png",
            "images": []
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId(3));
        assert_eq!(product.brand, None);
        assert_eq!(product.availability_status, "In Stock");
        assert_eq!(product.return_policy, "60 days return policy");

        let value = serde_json::to_value(&product).unwrap();
        assert!(value.get("availabilityStatus").is_some());
        assert!(value.get("brand").is_none());
    }

    #[test]
    fn test_formatted_price_has_two_decimals() {
        assert_eq!(Product::new(1, "A", 99.99, 1).formatted_price(), "$99.99");
        assert_eq!(Product::new(1, "A", 5.0, 1).formatted_price(), "$5.00");
        assert_eq!(Product::new(1, "A", 0.5, 1).formatted_price(), "$0.50");
    }

    #[test]
    fn test_display_image_falls_back_to_thumbnail() {
        let product = Product::new(1, "A", 1.0, 1).with_thumbnail("thumb.png");
        assert_eq!(product.display_image(), "thumb.png");

        let product = product.with_images(["first.png", "second.png"]);
        assert_eq!(product.display_image(), "first.png");
    }

    #[test]
    fn test_brand_placeholder() {
        let product = Product::new(1, "A", 1.0, 1);
        assert_eq!(product.brand_or_placeholder(), "N/A");
        assert_eq!(product.with_brand("Essence").brand_or_placeholder(), "Essence");
    }

    #[test]
    fn test_product_id_from_param() {
        assert_eq!(ProductId::from_param("7"), Ok(ProductId(7)));
        assert!(ProductId::from_param("0").is_err());
        assert!(ProductId::from_param("abc").is_err());
        assert!(ProductId::from_param("").is_err());
        assert!(ProductId::from_param("-1").is_err());
    }
}
