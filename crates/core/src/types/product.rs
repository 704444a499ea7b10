//! Catalog records.
//!
//! Field names follow the hosted backend's `products` table so rows can be
//! deserialized directly. Presentation extras (`badge`, `gallery`,
//! `features`, `specifications`) are optional columns and default to empty.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;

/// Category name that disables filtering.
pub const ALL_CATEGORIES: &str = "All";

/// A product as read from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: Decimal,
    /// Pre-discount price, shown struck through when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<Decimal>,
    pub image_url: String,
    pub category: String,
    #[serde(default)]
    pub stock_quantity: i32,
    #[serde(default)]
    pub rating: f32,
    #[serde(default)]
    pub review_count: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub badge: Option<String>,
    /// Additional images for the detail page gallery (the main image is
    /// always shown first).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gallery: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub features: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub specifications: Vec<Specification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Whether the product belongs to `category` (`"All"` matches everything).
    #[must_use]
    pub fn in_category(&self, category: &str) -> bool {
        category == ALL_CATEGORIES || self.category == category
    }

    /// Amount saved against the original price, if the product is discounted.
    #[must_use]
    pub fn savings(&self) -> Option<Decimal> {
        self.original_price
            .filter(|original| *original > self.price)
            .map(|original| original - self.price)
    }

    /// Whole stars to fill when rendering the rating (0-5).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn filled_stars(&self) -> u8 {
        self.rating.clamp(0.0, 5.0).floor() as u8
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock_quantity > 0
    }
}

/// A named product specification (e.g. "Weight" / "250g").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Specification {
    pub name: String,
    pub value: String,
}

/// A catalog category shown in the "Shop by Category" grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub name: String,
    pub image_url: String,
    /// Marketing label such as "120+ Products".
    pub count_label: String,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::str::FromStr;

    use super::*;

    fn product(price: &str, original: Option<&str>, rating: f32) -> Product {
        Product {
            id: ProductId::new("1"),
            name: "Headphones".to_string(),
            description: String::new(),
            price: Decimal::from_str(price).unwrap(),
            original_price: original.map(|o| Decimal::from_str(o).unwrap()),
            image_url: "https://img.example.com/1.jpg".to_string(),
            category: "Electronics".to_string(),
            stock_quantity: 3,
            rating,
            review_count: 10,
            badge: None,
            gallery: Vec::new(),
            features: Vec::new(),
            specifications: Vec::new(),
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_in_category() {
        let p = product("10", None, 4.0);
        assert!(p.in_category("All"));
        assert!(p.in_category("Electronics"));
        assert!(!p.in_category("Fashion"));
    }

    #[test]
    fn test_savings() {
        let p = product("99.99", Some("149.99"), 4.5);
        assert_eq!(p.savings(), Some(Decimal::from(50)));

        assert_eq!(product("99.99", None, 4.5).savings(), None);
        assert_eq!(product("99.99", Some("50"), 4.5).savings(), None);
    }

    #[test]
    fn test_filled_stars() {
        assert_eq!(product("1", None, 4.8).filled_stars(), 4);
        assert_eq!(product("1", None, 7.0).filled_stars(), 5);
        assert_eq!(product("1", None, -1.0).filled_stars(), 0);
    }

    #[test]
    fn test_deserialize_backend_row() {
        let row = r#"{
            "id": "b7e0",
            "name": "Smart Watch",
            "description": "A watch",
            "price": 299.99,
            "original_price": null,
            "image_url": "https://img.example.com/w.jpg",
            "category": "Electronics",
            "stock_quantity": 12,
            "rating": 4.8,
            "review_count": 89,
            "created_at": "2024-05-01T10:00:00+00:00",
            "updated_at": "2024-05-02T10:00:00+00:00"
        }"#;

        let p: Product = serde_json::from_str(row).unwrap();
        assert_eq!(p.id.as_str(), "b7e0");
        assert_eq!(p.price, Decimal::from_str("299.99").unwrap());
        assert!(p.original_price.is_none());
        assert!(p.features.is_empty());
        assert!(p.created_at.is_some());
    }
}
