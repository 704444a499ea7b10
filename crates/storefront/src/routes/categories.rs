//! Category grid route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use shopfront_core::Category;
use tracing::instrument;

use super::PageChrome;
use super::products::listing_href;
use crate::catalog::SortOrder;
use crate::filters;
use crate::state::AppState;

/// Category tile display data for templates.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub href: String,
    pub image_url: String,
    pub count_label: String,
}

impl From<&Category> for CategoryView {
    fn from(category: &Category) -> Self {
        Self {
            name: category.name.clone(),
            href: listing_href(&category.name, SortOrder::Featured),
            image_url: category.image_url.clone(),
            count_label: category.count_label.clone(),
        }
    }
}

/// Category views for every category the catalog offers.
pub(crate) fn category_views(state: &AppState) -> Vec<CategoryView> {
    state
        .catalog()
        .categories()
        .iter()
        .map(CategoryView::from)
        .collect()
}

/// Category grid page template.
#[derive(Template, WebTemplate)]
#[template(path = "categories.html")]
pub struct CategoriesTemplate {
    pub chrome: PageChrome,
    pub categories: Vec<CategoryView>,
}

/// Display the category grid.
#[instrument(skip(state, chrome))]
pub async fn index(State(state): State<AppState>, chrome: PageChrome) -> impl IntoResponse {
    CategoriesTemplate {
        chrome,
        categories: category_views(&state),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_links_to_filtered_listing() {
        let category = Category {
            name: "Home & Garden".to_string(),
            image_url: "https://images.unsplash.com/photo-1".to_string(),
            count_label: "150+ Products".to_string(),
        };

        let view = CategoryView::from(&category);
        assert_eq!(view.href, "/products?category=Home+%26+Garden");
    }
}
