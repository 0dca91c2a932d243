//! Wire types for the products endpoint and product presentation helpers

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use tracing::warn;

/// Image used when a product carries no usable image reference
pub const PLACEHOLDER_IMAGE: &str = "";

/// Decoded body of `GET /products`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductPage {
    #[serde(default)]
    pub data: Option<Vec<Product>>,

    #[serde(default)]
    pub meta: Option<PageMetadata>,
}

/// Server-supplied pagination descriptors; every field may be absent
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
    pub page: Option<u32>,
    pub total_pages: Option<u32>,
    pub has_next_page: Option<bool>,
    pub has_previous_page: Option<bool>,
    /// Total number of products across all pages
    pub total: Option<u64>,
}

/// Product identifiers arrive as numbers or strings depending on the backend
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProductId {
    Number(i64),
    Text(String),
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProductId::Number(n) => write!(f, "{}", n),
            ProductId::Text(s) => f.write_str(s),
        }
    }
}

/// The `images` field: a literal list, a JSON-encoded list, or junk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ImageField {
    List(Vec<Value>),
    Encoded(String),
    Other(Value),
}

/// A catalog product. Unknown fields are carried through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,

    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "lenient_price")]
    pub price: Option<f64>,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub images: Option<ImageField>,

    #[serde(default)]
    pub image: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Product {
    /// Price formatted for display, e.g. `$12.50`
    pub fn display_price(&self) -> Option<String> {
        self.price.map(format_price)
    }

    #[cfg(test)]
    pub fn named(id: i64, name: &str) -> Self {
        Self {
            id: ProductId::Number(id),
            name: name.to_string(),
            price: None,
            description: None,
            images: None,
            image: None,
            extra: Map::new(),
        }
    }
}

pub fn format_price(price: f64) -> String {
    format!("${:.2}", price)
}

// Accepts 12.5, "12.5", null; anything else is treated as no price.
fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    })
}

/// First image URL carried by `images`, decoding JSON-encoded strings.
///
/// Undecodable input yields `None`; the error is logged, never returned.
fn first_listed_image(images: &ImageField) -> Option<String> {
    let decoded;
    let list = match images {
        ImageField::List(list) => list,
        ImageField::Encoded(raw) => match serde_json::from_str::<Vec<Value>>(raw) {
            Ok(list) => {
                decoded = list;
                &decoded
            }
            Err(e) => {
                warn!("Error parsing product images: {}", e);
                return None;
            }
        },
        ImageField::Other(_) => return None,
    };

    list.first()
        .and_then(Value::as_str)
        .filter(|url| !url.is_empty())
        .map(str::to_string)
}

/// Primary image for a product, falling back to `image`, then `placeholder`
pub fn resolve_primary_image_or(product: &Product, placeholder: &str) -> String {
    product
        .images
        .as_ref()
        .and_then(first_listed_image)
        .or_else(|| product.image.clone().filter(|url| !url.is_empty()))
        .unwrap_or_else(|| placeholder.to_string())
}

/// Primary image for a product with the default placeholder
pub fn resolve_primary_image(product: &Product) -> String {
    resolve_primary_image_or(product, PLACEHOLDER_IMAGE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Product {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_decode_full_page() {
        let body = json!({
            "data": [
                {"id": 1, "name": "Lamp", "price": 19.5, "images": ["https://img/1.png"]},
                {"id": "sku-2", "name": "Chair", "price": "45", "category": "furniture"}
            ],
            "meta": {"page": 2, "totalPages": 7, "hasNextPage": true, "hasPreviousPage": true, "total": 130}
        });
        let page: ProductPage = serde_json::from_value(body).unwrap();

        let meta = page.meta.unwrap();
        assert_eq!(meta.page, Some(2));
        assert_eq!(meta.total_pages, Some(7));
        assert_eq!(meta.has_next_page, Some(true));
        assert_eq!(meta.total, Some(130));

        let data = page.data.unwrap();
        assert_eq!(data[0].id, ProductId::Number(1));
        assert_eq!(data[1].id.to_string(), "sku-2");
        assert_eq!(data[1].price, Some(45.0));
        assert_eq!(data[1].extra.get("category"), Some(&json!("furniture")));
    }

    #[test]
    fn test_decode_partial_meta() {
        let page: ProductPage = serde_json::from_value(json!({"meta": {"page": 3}})).unwrap();
        assert!(page.data.is_none());
        let meta = page.meta.unwrap();
        assert_eq!(meta.page, Some(3));
        assert_eq!(meta.total_pages, None);
        assert_eq!(meta.has_next_page, None);
    }

    #[test]
    fn test_price_display() {
        let product = parse(json!({"id": 1, "name": "A", "price": 12.5}));
        assert_eq!(product.display_price().as_deref(), Some("$12.50"));

        let product = parse(json!({"id": 1, "name": "A", "price": "n/a"}));
        assert_eq!(product.display_price(), None);
    }

    #[test]
    fn test_image_from_list() {
        let product = parse(json!({"id": 1, "images": ["a.png", "b.png"], "image": "c.png"}));
        assert_eq!(resolve_primary_image(&product), "a.png");
    }

    #[test]
    fn test_image_from_encoded_list() {
        let product = parse(json!({"id": 1, "images": "[\"a.png\",\"b.png\"]"}));
        assert_eq!(resolve_primary_image(&product), "a.png");
    }

    #[test]
    fn test_invalid_encoded_images_fall_back() {
        let product = parse(json!({"id": 1, "images": "not json", "image": "c.png"}));
        assert_eq!(resolve_primary_image(&product), "c.png");

        let product = parse(json!({"id": 1, "images": "[\"unterminated"}));
        assert_eq!(resolve_primary_image_or(&product, "placeholder.png"), "placeholder.png");
    }

    #[test]
    fn test_missing_or_empty_images_fall_back() {
        let product = parse(json!({"id": 1}));
        assert_eq!(resolve_primary_image(&product), PLACEHOLDER_IMAGE);

        let product = parse(json!({"id": 1, "images": null, "image": "c.png"}));
        assert_eq!(resolve_primary_image(&product), "c.png");

        let product = parse(json!({"id": 1, "images": [], "image": ""}));
        assert_eq!(resolve_primary_image_or(&product, "none.png"), "none.png");

        let product = parse(json!({"id": 1, "images": "[]", "image": "c.png"}));
        assert_eq!(resolve_primary_image(&product), "c.png");
    }

    #[test]
    fn test_unexpected_image_shapes_fall_back() {
        let product = parse(json!({"id": 1, "images": 42, "image": "c.png"}));
        assert_eq!(resolve_primary_image(&product), "c.png");

        let product = parse(json!({"id": 1, "images": [7, "b.png"], "image": "c.png"}));
        assert_eq!(resolve_primary_image(&product), "c.png");

        let product = parse(json!({"id": 1, "images": "\"a.png\""}));
        assert_eq!(resolve_primary_image_or(&product, "p.png"), "p.png");
    }
}
