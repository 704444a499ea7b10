//! Cart route handlers.
//!
//! Mutations are plain form posts answered with a 303 redirect and a flash
//! notice. The visitor's cart is keyed by the client key held in their
//! session and persisted through the shared cart storage.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect},
};
use rust_decimal::Decimal;
use serde::Deserialize;
use shopfront_core::{CartLine, NewCartLine, Price, ProductId};
use tower_sessions::Session;
use tracing::instrument;

use super::{PageChrome, safe_return_path};
use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CartClient, OptionalCartClient, set_flash};
use crate::models::Notice;
use crate::state::AppState;

/// Largest quantity accepted by a single add.
const MAX_ADD_QUANTITY: u32 = 99;

/// Where an add without a valid return path lands.
const DEFAULT_RETURN: &str = "/products";

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub href: String,
    pub name: String,
    pub image: String,
    pub price: String,
    pub line_total: String,
    pub quantity: u32,
    /// Quantity posted by the minus button (0 removes the line).
    pub decrement: u32,
    pub increment: u32,
}

impl From<&CartLine> for CartItemView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.id.to_string(),
            href: format!("/products/{}", line.id),
            name: line.name.clone(),
            image: line.image.clone(),
            price: Price::usd(line.price).display(),
            line_total: Price::usd(line.line_total()).display(),
            quantity: line.quantity,
            decrement: line.quantity.saturating_sub(1),
            increment: line.quantity.saturating_add(1),
        }
    }
}

/// Order summary shown next to the cart lines.
///
/// Amounts are rounded to cents only here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderSummaryView {
    pub subtotal: String,
    pub shipping: String,
    pub tax: String,
    pub total: String,
}

impl OrderSummaryView {
    /// Summary for `subtotal` with tax at `tax_rate`; shipping is free.
    #[must_use]
    pub fn new(subtotal: Decimal, tax_rate: Decimal) -> Self {
        let tax = subtotal * tax_rate;
        Self {
            subtotal: Price::usd(subtotal).display(),
            shipping: "Free".to_string(),
            tax: Price::usd(tax).display(),
            total: Price::usd(subtotal + tax).display(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub id: String,
    /// Omitted by one-click buttons, which add a single unit.
    pub quantity: Option<u32>,
    pub redirect_to: Option<String>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: i64,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub chrome: PageChrome,
    pub items: Vec<CartItemView>,
    pub summary: OrderSummaryView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u64,
}

/// Display cart page.
#[instrument(skip(state, chrome))]
pub async fn show(
    State(state): State<AppState>,
    OptionalCartClient(client): OptionalCartClient,
    chrome: PageChrome,
) -> Result<impl IntoResponse> {
    let (lines, subtotal) = match client {
        Some(client) => {
            state
                .with_cart(client, |cart| Ok((cart.lines().to_vec(), cart.total_price())))
                .await?
        }
        None => (Vec::new(), Decimal::ZERO),
    };

    Ok(CartShowTemplate {
        chrome,
        items: lines.iter().map(CartItemView::from).collect(),
        summary: OrderSummaryView::new(subtotal, state.config().tax_rate),
    })
}

/// Add a product to the cart.
///
/// Adds the requested quantity in one commit, snapshotting the product's
/// current name, price, and image on first add.
#[instrument(skip(state, session))]
pub async fn add(
    State(state): State<AppState>,
    CartClient(client): CartClient,
    session: Session,
    Form(form): Form<AddToCartForm>,
) -> Result<Redirect> {
    let quantity = form.quantity.unwrap_or(1);
    if quantity == 0 || quantity > MAX_ADD_QUANTITY {
        return Err(AppError::BadRequest(format!(
            "quantity must be between 1 and {MAX_ADD_QUANTITY}"
        )));
    }

    let id = ProductId::new(form.id);
    let product = state
        .catalog()
        .product(&id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    let candidate = NewCartLine::from(&product);
    state
        .with_cart(client, move |cart| cart.add_units(candidate, quantity))
        .await?;

    add_breadcrumb("cart", "Added to cart", Some(&[("product_id", id.as_str())]));

    let message = if form.quantity.is_some() {
        format!("Added {quantity} item(s) to cart!")
    } else {
        "Added to cart!".to_string()
    };
    set_flash(&session, Notice::success(message)).await;

    Ok(Redirect::to(safe_return_path(
        form.redirect_to.as_deref(),
        DEFAULT_RETURN,
    )))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    CartClient(client): CartClient,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.id);
    let quantity = form.quantity;
    state
        .with_cart(client, move |cart| cart.update_quantity(&id, quantity))
        .await?;

    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
#[instrument(skip(state, session))]
pub async fn remove(
    State(state): State<AppState>,
    CartClient(client): CartClient,
    session: Session,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Redirect> {
    let id = ProductId::new(form.id);
    state
        .with_cart(client, move |cart| cart.remove_item(&id))
        .await?;

    set_flash(&session, Notice::success("Removed from cart.")).await;
    Ok(Redirect::to("/cart"))
}

/// Empty the cart.
#[instrument(skip(state, session))]
pub async fn clear(
    State(state): State<AppState>,
    CartClient(client): CartClient,
    session: Session,
) -> Result<Redirect> {
    state.with_cart(client, |cart| cart.clear_cart()).await?;

    set_flash(&session, Notice::success("Cart cleared.")).await;
    Ok(Redirect::to("/cart"))
}

/// Get cart count badge.
#[instrument(skip(state))]
pub async fn count(
    State(state): State<AppState>,
    OptionalCartClient(client): OptionalCartClient,
) -> Result<CartCountTemplate> {
    let count = match client {
        Some(client) => {
            state
                .with_cart(client, |cart| Ok(cart.total_items()))
                .await?
        }
        None => 0,
    };

    Ok(CartCountTemplate { count })
}
