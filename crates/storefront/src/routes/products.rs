//! Product route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shopfront_core::{ALL_CATEGORIES, Price, Product, ProductId, Specification};
use tracing::instrument;

use super::PageChrome;
use crate::catalog::{SortOrder, fixtures::FILTER_CATEGORIES};
use crate::filters;
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub description: String,
    pub price: String,
    pub original_price: Option<String>,
    pub savings: Option<String>,
    pub image_url: String,
    pub category: String,
    pub rating: String,
    pub review_count: i32,
    pub badge: Option<String>,
    /// CSS class per rating star.
    pub stars: Vec<&'static str>,
    pub in_stock: bool,
    pub stock_quantity: i32,
    pub gallery: Vec<String>,
    pub features: Vec<String>,
    pub specifications: Vec<Specification>,
}

fn format_price(amount: Decimal) -> String {
    Price::usd(amount).display()
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        let filled = usize::from(product.filled_stars());
        let gallery = if product.gallery.is_empty() {
            vec![product.image_url.clone()]
        } else {
            product.gallery.clone()
        };

        Self {
            id: product.id.to_string(),
            href: format!("/products/{}", product.id),
            name: product.name.clone(),
            description: product.description.clone(),
            price: format_price(product.price),
            original_price: product.original_price.map(format_price),
            savings: product.savings().map(format_price),
            image_url: product.image_url.clone(),
            category: product.category.clone(),
            rating: format!("{:.1}", product.rating),
            review_count: product.review_count,
            badge: product.badge.clone(),
            stars: (0..5)
                .map(|i| if i < filled { "star filled" } else { "star" })
                .collect(),
            in_stock: product.in_stock(),
            stock_quantity: product.stock_quantity,
            gallery,
            features: product.features.clone(),
            specifications: product.specifications.clone(),
        }
    }
}

/// Category filter button.
pub struct FilterView {
    pub name: String,
    pub href: String,
    pub active: bool,
}

/// Sort dropdown option.
pub struct SortView {
    pub slug: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Listing query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ProductsQuery {
    pub category: Option<String>,
    pub sort: Option<String>,
}

/// Listing URL for `category` and `sort`, omitting defaults.
#[must_use]
pub fn listing_href(category: &str, sort: SortOrder) -> String {
    let mut query = url::form_urlencoded::Serializer::new(String::new());
    if category != ALL_CATEGORIES {
        query.append_pair("category", category);
    }
    if sort != SortOrder::Featured {
        query.append_pair("sort", sort.slug());
    }

    let query = query.finish();
    if query.is_empty() {
        "/products".to_string()
    } else {
        format!("/products?{query}")
    }
}

/// Product listing page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/index.html")]
pub struct ProductsIndexTemplate {
    pub chrome: PageChrome,
    pub products: Vec<ProductView>,
    pub category_filters: Vec<FilterView>,
    pub sorts: Vec<SortView>,
    pub category: String,
    pub show_category: bool,
    /// Where add-to-cart sends the shopper back to.
    pub return_to: String,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductShowTemplate {
    pub chrome: PageChrome,
    pub product: ProductView,
}

/// Product not found page template.
#[derive(Template, WebTemplate)]
#[template(path = "products/not_found.html")]
pub struct ProductNotFoundTemplate {
    pub chrome: PageChrome,
}

/// Display product listing page.
#[instrument(skip(state, chrome))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ProductsQuery>,
    chrome: PageChrome,
) -> impl IntoResponse {
    let category = query
        .category
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| ALL_CATEGORIES.to_string());
    let sort = SortOrder::from_query(query.sort.as_deref());

    let mut products = state.catalog().products(&category).await;
    sort.apply(&mut products);

    let category_filters = FILTER_CATEGORIES
        .iter()
        .map(|name| FilterView {
            name: (*name).to_string(),
            href: listing_href(name, sort),
            active: *name == category,
        })
        .collect();
    let sorts = SortOrder::ALL
        .iter()
        .map(|s| SortView {
            slug: s.slug(),
            label: s.label(),
            selected: *s == sort,
        })
        .collect();

    ProductsIndexTemplate {
        chrome,
        products: products.iter().map(ProductView::from).collect(),
        category_filters,
        sorts,
        show_category: category != ALL_CATEGORIES,
        return_to: listing_href(&category, sort),
        category,
    }
}

/// Display product detail page.
#[instrument(skip(state, chrome))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
    chrome: PageChrome,
) -> Response {
    match state.catalog().product(&ProductId::new(id)).await {
        Some(product) => ProductShowTemplate {
            chrome,
            product: ProductView::from(&product),
        }
        .into_response(),
        None => (StatusCode::NOT_FOUND, ProductNotFoundTemplate { chrome }).into_response(),
    }
}
