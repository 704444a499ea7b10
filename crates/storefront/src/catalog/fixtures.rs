//! Built-in catalog used when no hosted backend is configured.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use shopfront_core::{Category, Product, ProductId, Specification};

const IMAGE_PARAMS: &str = "?ixlib=rb-4.0.3&auto=format&fit=crop&w=500&q=80";
const DETAIL_IMAGE_PARAMS: &str = "?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80";

/// Creation time of the newest built-in product (2024-06-01T00:00:00Z).
const NEWEST_CREATED_AT: i64 = 1_717_200_000;
const DAY_SECONDS: i64 = 86_400;

fn unsplash(photo: &str) -> String {
    format!("https://images.unsplash.com/photo-{photo}{IMAGE_PARAMS}")
}

fn unsplash_large(photo: &str) -> String {
    format!("https://images.unsplash.com/photo-{photo}{DETAIL_IMAGE_PARAMS}")
}

struct Seed {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price: Decimal,
    original_price: Decimal,
    photo: &'static str,
    category: &'static str,
    stock: i32,
    rating: f32,
    reviews: i32,
    badge: &'static str,
}

impl Seed {
    fn into_product(self, position: i64) -> Product {
        let created_at = DateTime::<Utc>::from_timestamp(NEWEST_CREATED_AT - position * DAY_SECONDS, 0);
        Product {
            id: ProductId::new(self.id),
            name: self.name.to_string(),
            description: self.description.to_string(),
            price: self.price,
            original_price: Some(self.original_price),
            image_url: unsplash(self.photo),
            category: self.category.to_string(),
            stock_quantity: self.stock,
            rating: self.rating,
            review_count: self.reviews,
            badge: Some(self.badge.to_string()),
            gallery: Vec::new(),
            features: Vec::new(),
            specifications: Vec::new(),
            created_at,
            updated_at: created_at,
        }
    }
}

fn seeds() -> Vec<Seed> {
    vec![
        Seed {
            id: "1",
            name: "Wireless Bluetooth Headphones",
            description: "Premium wireless headphones with active noise cancellation, 30-hour battery life, and superior sound quality. Perfect for music lovers and professionals.",
            price: Decimal::new(9999, 2),
            original_price: Decimal::new(14999, 2),
            photo: "1505740420928-5e560c06d30e",
            category: "Electronics",
            stock: 15,
            rating: 4.5,
            reviews: 128,
            badge: "Best Seller",
        },
        Seed {
            id: "2",
            name: "Smart Watch Series 8",
            description: "Track workouts, heart rate and sleep from your wrist, with an always-on display and all-day battery.",
            price: Decimal::new(29999, 2),
            original_price: Decimal::new(39999, 2),
            photo: "1523275335684-37898b6baf30",
            category: "Electronics",
            stock: 23,
            rating: 4.8,
            reviews: 89,
            badge: "New",
        },
        Seed {
            id: "3",
            name: "Premium Coffee Maker",
            description: "Brew cafe-quality coffee at home with programmable strength, a built-in grinder and a thermal carafe.",
            price: Decimal::new(19999, 2),
            original_price: Decimal::new(24999, 2),
            photo: "1559056199-641a0ac8b55e",
            category: "Home & Garden",
            stock: 8,
            rating: 4.6,
            reviews: 156,
            badge: "Sale",
        },
        Seed {
            id: "4",
            name: "Ergonomic Office Chair",
            description: "Adjustable lumbar support, breathable mesh and 4D armrests keep you comfortable through long workdays.",
            price: Decimal::new(24999, 2),
            original_price: Decimal::new(34999, 2),
            photo: "1586023492125-27b2c045efd7",
            category: "Home & Garden",
            stock: 12,
            rating: 4.4,
            reviews: 203,
            badge: "Popular",
        },
        Seed {
            id: "5",
            name: "Running Shoes",
            description: "Lightweight, responsive cushioning and a grippy outsole for road runs of any distance.",
            price: Decimal::new(12999, 2),
            original_price: Decimal::new(17999, 2),
            photo: "1542291026-7eec264c27ff",
            category: "Sports",
            stock: 30,
            rating: 4.7,
            reviews: 95,
            badge: "Sale",
        },
        Seed {
            id: "6",
            name: "Leather Backpack",
            description: "Full-grain leather backpack with a padded laptop sleeve and plenty of room for the daily commute.",
            price: Decimal::new(8999, 2),
            original_price: Decimal::new(11999, 2),
            photo: "1553062407-98eeb64c6a62",
            category: "Fashion",
            stock: 5,
            rating: 4.3,
            reviews: 67,
            badge: "Popular",
        },
    ]
}

/// Detail-page extras for the headphones.
fn enrich_headphones(product: &mut Product) {
    product.gallery = vec![
        unsplash_large("1505740420928-5e560c06d30e"),
        unsplash_large("1484704849700-f032a568e944"),
    ];
    product.features = [
        "Active Noise Cancellation",
        "30-hour battery life",
        "Quick charge: 5 min = 3 hours",
        "Premium sound quality",
        "Comfortable over-ear design",
        "Built-in microphone",
    ]
    .into_iter()
    .map(String::from)
    .collect();
    product.specifications = [
        ("Driver Size", "40mm"),
        ("Frequency Response", "20Hz - 20kHz"),
        ("Impedance", "32 ohms"),
        ("Weight", "250g"),
        ("Connectivity", "Bluetooth 5.0"),
        ("Battery", "30 hours"),
    ]
    .into_iter()
    .map(|(name, value)| Specification {
        name: name.to_string(),
        value: value.to_string(),
    })
    .collect();
}

/// The built-in products, newest first.
#[must_use]
pub fn products() -> Vec<Product> {
    seeds()
        .into_iter()
        .zip(0_i64..)
        .map(|(seed, position)| {
            let mut product = seed.into_product(position);
            if product.id.as_str() == "1" {
                enrich_headphones(&mut product);
            }
            product
        })
        .collect()
}

/// The "Shop by Category" grid.
#[must_use]
pub fn categories() -> Vec<Category> {
    [
        ("Electronics", "1498049794561-7780e7231661", "120+ Products"),
        ("Fashion", "1445205170230-053b83016050", "200+ Products"),
        ("Home & Garden", "1586023492125-27b2c045efd7", "150+ Products"),
        ("Sports", "1571019613454-1cb2f99b2d8b", "80+ Products"),
        ("Books", "1481627834876-b7833e8f5570", "300+ Products"),
        ("Beauty", "1596462502278-27bfdc403348", "90+ Products"),
    ]
    .into_iter()
    .map(|(name, photo, count)| Category {
        name: name.to_string(),
        image_url: unsplash(photo),
        count_label: count.to_string(),
    })
    .collect()
}

/// Category names offered as listing filters.
pub const FILTER_CATEGORIES: &[&str] = &["All", "Electronics", "Fashion", "Home & Garden", "Sports"];
