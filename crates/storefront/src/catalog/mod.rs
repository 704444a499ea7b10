//! Read-only product catalog.
//!
//! Products come either from the hosted backend or from the built-in
//! catalog. Reads never fail from the caller's point of view: backend
//! errors are logged and degrade to an empty list or `None`.

pub mod fixtures;

use std::sync::Arc;

use shopfront_core::{Category, Product, ProductId};
use tracing::instrument;

use crate::backend::BackendClient;

/// Where product records come from.
#[derive(Debug, Clone)]
pub enum Catalog {
    /// Hosted backend `products` table.
    Hosted(BackendClient),
    /// Built-in records, newest first.
    Builtin(Arc<Vec<Product>>),
}

impl Catalog {
    /// The built-in catalog.
    #[must_use]
    pub fn builtin() -> Self {
        Self::Builtin(Arc::new(fixtures::products()))
    }

    #[must_use]
    pub const fn source(&self) -> &'static str {
        match self {
            Self::Hosted(_) => "hosted",
            Self::Builtin(_) => "builtin",
        }
    }

    /// All products, newest first. A category other than `"All"` filters by
    /// exact category name.
    #[instrument(skip(self), fields(source = self.source()))]
    pub async fn products(&self, category: &str) -> Vec<Product> {
        match self {
            Self::Hosted(client) => client.products(category).await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Error fetching products");
                Vec::new()
            }),
            Self::Builtin(products) => products
                .iter()
                .filter(|product| product.in_category(category))
                .cloned()
                .collect(),
        }
    }

    /// A single product, or `None` if it does not exist or cannot be read.
    #[instrument(skip(self), fields(source = self.source()))]
    pub async fn product(&self, id: &ProductId) -> Option<Product> {
        match self {
            Self::Hosted(client) => client.product(id).await.unwrap_or_else(|e| {
                tracing::error!(error = %e, "Error fetching product");
                None
            }),
            Self::Builtin(products) => products.iter().find(|product| &product.id == id).cloned(),
        }
    }

    /// The first `limit` products of the unfiltered listing.
    pub async fn featured(&self, limit: usize) -> Vec<Product> {
        let mut products = self.products(shopfront_core::ALL_CATEGORIES).await;
        products.truncate(limit);
        products
    }

    /// Categories for the "Shop by Category" grid.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        fixtures::categories()
    }
}

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    /// Catalog order.
    #[default]
    Featured,
    PriceAsc,
    PriceDesc,
    /// Highest rating first.
    Rating,
    /// Most recently created first.
    Newest,
}

impl SortOrder {
    pub const ALL: [Self; 5] = [
        Self::Featured,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Rating,
        Self::Newest,
    ];

    /// Parse a `sort` query value. Unknown or missing values mean `Featured`.
    #[must_use]
    pub fn from_query(value: Option<&str>) -> Self {
        value
            .and_then(|value| Self::ALL.into_iter().find(|order| order.slug() == value))
            .unwrap_or_default()
    }

    /// Query-string value.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Rating => "rating",
            Self::Newest => "newest",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Featured => "Featured",
            Self::PriceAsc => "Price: Low to High",
            Self::PriceDesc => "Price: High to Low",
            Self::Rating => "Rating",
            Self::Newest => "Newest",
        }
    }

    /// Sort in place. Ties keep their catalog order.
    pub fn apply(self, products: &mut [Product]) {
        match self {
            Self::Featured => {}
            Self::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price)),
            Self::PriceDesc => products.sort_by(|a, b| b.price.cmp(&a.price)),
            Self::Rating => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
            Self::Newest => products.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    fn ids(products: &[Product]) -> Vec<&str> {
        products.iter().map(|p| p.id.as_str()).collect()
    }

    #[tokio::test]
    async fn test_builtin_lists_everything_for_all() {
        let catalog = Catalog::builtin();
        let products = catalog.products("All").await;
        assert_eq!(ids(&products), vec!["1", "2", "3", "4", "5", "6"]);
    }

    #[tokio::test]
    async fn test_builtin_filters_by_category() {
        let catalog = Catalog::builtin();
        let products = catalog.products("Home & Garden").await;
        assert_eq!(ids(&products), vec!["3", "4"]);

        assert!(catalog.products("Books").await.is_empty());
    }

    #[tokio::test]
    async fn test_builtin_product_lookup() {
        let catalog = Catalog::builtin();

        let headphones = catalog.product(&ProductId::new("1")).await.unwrap();
        assert_eq!(headphones.name, "Wireless Bluetooth Headphones");
        assert_eq!(headphones.stock_quantity, 15);
        assert_eq!(headphones.specifications.len(), 6);

        assert!(catalog.product(&ProductId::new("999")).await.is_none());
    }

    #[tokio::test]
    async fn test_featured_takes_first_products() {
        let catalog = Catalog::builtin();
        assert_eq!(ids(&catalog.featured(4).await), vec!["1", "2", "3", "4"]);
    }

    #[test]
    fn test_sort_order_from_query() {
        assert_eq!(SortOrder::from_query(Some("price-asc")), SortOrder::PriceAsc);
        assert_eq!(SortOrder::from_query(Some("newest")), SortOrder::Newest);
        assert_eq!(SortOrder::from_query(Some("bogus")), SortOrder::Featured);
        assert_eq!(SortOrder::from_query(None), SortOrder::Featured);
    }

    #[test]
    fn test_sort_orders() {
        let base = fixtures::products();

        let mut by_price = base.clone();
        SortOrder::PriceAsc.apply(&mut by_price);
        assert_eq!(ids(&by_price), vec!["6", "1", "5", "3", "4", "2"]);

        let mut by_price_desc = base.clone();
        SortOrder::PriceDesc.apply(&mut by_price_desc);
        assert_eq!(ids(&by_price_desc), vec!["2", "4", "3", "5", "1", "6"]);

        let mut by_rating = base.clone();
        SortOrder::Rating.apply(&mut by_rating);
        assert_eq!(ids(&by_rating), vec!["2", "5", "3", "1", "4", "6"]);

        let mut newest = base.clone();
        newest.reverse();
        SortOrder::Newest.apply(&mut newest);
        assert_eq!(ids(&newest), ids(&base));

        let mut featured = base.clone();
        SortOrder::Featured.apply(&mut featured);
        assert_eq!(featured, base);
    }

    #[test]
    fn test_categories_grid() {
        let categories = Catalog::builtin().categories();
        assert_eq!(categories.len(), 6);
        assert_eq!(categories[0].name, "Electronics");
        assert_eq!(categories[0].count_label, "120+ Products");
    }
}
