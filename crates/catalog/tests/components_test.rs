use catalog::components::{guarded, product_image, product_info, product_meta};
use catalog::model::Product;
use catalog::service::InMemoryProductService;

/// The bundled catalog plus edge cases the fixture does not cover.
fn products() -> Vec<Product> {
    let mut products = InMemoryProductService::bundled()
        .expect("bundled catalog parses")
        .products()
        .to_vec();
    products.push(Product::new(90, "Free Sample", 0.0, 1).with_thumbnail("https://cdn.example.com/90.png"));
    products.push(
        Product::new(91, "Bulk Pack", 1234.5, 7)
            .with_description("  Leading and trailing spaces are kept.  ")
            .with_brand("")
            .with_images(["https://cdn.example.com/91/a.png", "https://cdn.example.com/91/b.png"]),
    );
    products
}

#[test]
fn test_info_shows_title_price_and_description() {
    for product in products() {
        let view = product_info(&product);

        assert!(view.contains_text(&product.title), "{}", product.title);
        assert_eq!(
            view.field_value("Price"),
            Some(format!("${:.2}", product.price).as_str())
        );
        assert!(view
            .nodes()
            .iter()
            .any(|node| node.text() == product.description));
    }
}

#[test]
fn test_meta_brand_is_verbatim_or_placeholder() {
    for product in products() {
        let view = product_meta(&product);
        let expected = match &product.brand {
            Some(brand) => brand.as_str(),
            None => "N/A",
        };
        assert_eq!(view.field_value("Brand"), Some(expected), "{}", product.title);
    }
}

#[test]
fn test_image_falls_back_to_thumbnail() {
    for product in products() {
        let view = product_image(&product);
        let expected = product
            .images
            .first()
            .unwrap_or(&product.thumbnail)
            .as_str();
        assert_eq!(view.first_image(), Some(expected), "{}", product.title);
    }
}

#[test]
fn test_guarded_components_agree_when_product_is_present() {
    for product in products() {
        assert_eq!(guarded::product_info(Some(&product)), product_info(&product));
        assert_eq!(guarded::product_meta(Some(&product)), product_meta(&product));
        assert_eq!(guarded::product_image(Some(&product)), product_image(&product));
    }
}

#[test]
fn test_guarded_components_use_placeholder_when_missing() {
    assert_eq!(guarded::product_meta(None).field_value("Brand"), Some("N/A"));
    assert_eq!(guarded::product_info(None).field_value("Price"), Some("N/A"));
    assert!(guarded::product_image(None).is_empty());
}
