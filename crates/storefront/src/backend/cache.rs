//! Cache types for hosted catalog reads.

use shopfront_core::{Product, ProductId};

/// Cache key for catalog reads.
#[derive(Debug, Clone, Hash, PartialEq, Eq)]
pub enum CacheKey {
    /// Listing for a category name (`"All"` for the unfiltered list).
    Products(String),
    Product(ProductId),
}

/// Cached value types.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Products(Vec<Product>),
    Product(Box<Product>),
}
