//! Home page route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use super::PageChrome;
use super::categories::{CategoryView, category_views};
use super::products::ProductView;
use crate::filters;
use crate::state::AppState;

// =============================================================================
// Hero Configuration (static content)
// =============================================================================

/// A call-to-action link in the hero.
#[derive(Clone)]
pub struct HeroLink {
    pub text: String,
    pub url: String,
}

/// Hero section content.
#[derive(Clone)]
pub struct HeroConfig {
    pub title: String,
    pub highlight: String,
    pub subtitle: String,
    pub primary: HeroLink,
    pub secondary: HeroLink,
    pub image_url: String,
    pub image_alt: String,
    /// Small cards floating over the hero image.
    pub floating_cards: Vec<String>,
}

impl Default for HeroConfig {
    fn default() -> Self {
        Self {
            title: "Discover".to_string(),
            highlight: "Amazing Products".to_string(),
            subtitle: "Shop the latest trends and premium quality products at unbeatable prices. \
                       Your satisfaction is our priority."
                .to_string(),
            primary: HeroLink {
                text: "Shop Now".to_string(),
                url: "/products".to_string(),
            },
            secondary: HeroLink {
                text: "Browse Categories".to_string(),
                url: "/categories".to_string(),
            },
            image_url: "https://images.unsplash.com/photo-1441986300917-64674bd600d8?ixlib=rb-4.0.3&auto=format&fit=crop&w=1000&q=80"
                .to_string(),
            image_alt: "Shopping".to_string(),
            floating_cards: vec!["50% Off Today".to_string(), "Free Shipping".to_string()],
        }
    }
}

/// Number of products in the featured grid.
const FEATURED_PRODUCTS: usize = 4;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub chrome: PageChrome,
    pub hero: HeroConfig,
    pub featured_products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
}

/// Display the home page.
#[instrument(skip(state, chrome))]
pub async fn home(State(state): State<AppState>, chrome: PageChrome) -> impl IntoResponse {
    let featured_products = state
        .catalog()
        .featured(FEATURED_PRODUCTS)
        .await
        .iter()
        .map(ProductView::from)
        .collect();

    HomeTemplate {
        chrome,
        hero: HeroConfig::default(),
        featured_products,
        categories: category_views(&state),
    }
}
