//! Checkout route handlers.
//!
//! Checkout is a hand-off: the cart is posted to the hosted payment page and
//! the shopper is redirected there. A return to the success page only counts
//! once the provider reports the started session as paid; then the order is
//! written (when a backend is configured) and the cart emptied.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::Redirect,
};
use serde::Deserialize;
use shopfront_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use super::PageChrome;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::{CartClient, OptionalCartClient, set_flash};
use crate::models::{Notice, PendingCheckout, session_keys};
use crate::services::orders::record_order;
use crate::state::AppState;

/// Notice shown for any checkout failure.
pub const CHECKOUT_FAILED: &str = "Checkout failed. Please try again.";

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub email: String,
}

/// Query string the payment provider appends on success.
#[derive(Debug, Deserialize)]
pub struct SuccessQuery {
    pub session_id: Option<String>,
}

/// Checkout confirmation page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout/success.html")]
pub struct CheckoutSuccessTemplate {
    pub chrome: PageChrome,
    /// Payment was confirmed and the cart emptied.
    pub confirmed: bool,
    pub order_id: Option<String>,
}

impl CheckoutSuccessTemplate {
    const fn unconfirmed(chrome: PageChrome) -> Self {
        Self {
            chrome,
            confirmed: false,
            order_id: None,
        }
    }
}

/// Send the cart to the hosted payment page.
///
/// Nothing is sent for an invalid email or an empty cart. Every failure
/// leaves the cart untouched and lands back on the cart page with a notice.
#[instrument(skip(state, session, form))]
pub async fn start(
    State(state): State<AppState>,
    CartClient(client): CartClient,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Redirect> {
    let Ok(email) = Email::parse(&form.email) else {
        set_flash(&session, Notice::error("Please enter a valid email address.")).await;
        return Ok(Redirect::to("/cart"));
    };

    let lines = state
        .with_cart(client, |cart| Ok(cart.lines().to_vec()))
        .await?;
    if lines.is_empty() {
        set_flash(&session, Notice::error("Your cart is empty.")).await;
        return Ok(Redirect::to("/cart"));
    }

    let Some(payments) = state.payments() else {
        tracing::warn!("Checkout requested but no payment provider is configured");
        set_flash(&session, Notice::error(CHECKOUT_FAILED)).await;
        return Ok(Redirect::to("/cart"));
    };

    match payments.create_checkout_session(&lines, &email).await {
        Ok(checkout) => {
            let pending = PendingCheckout {
                session_id: checkout.id.clone(),
                email: email.as_str().to_string(),
            };
            if let Err(e) = session
                .insert(session_keys::PENDING_CHECKOUT, pending)
                .await
            {
                tracing::warn!(error = %e, "Failed to remember pending checkout");
            }
            add_breadcrumb("checkout", "Redirecting to checkout", None);
            tracing::info!(checkout_session = %checkout.id, "Redirecting to checkout");
            Ok(Redirect::to(&checkout.url))
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to create checkout session");
            set_flash(&session, Notice::error(CHECKOUT_FAILED)).await;
            Ok(Redirect::to("/cart"))
        }
    }
}

/// Display the confirmation page.
///
/// The return is confirmed only when `session_id` names the checkout this
/// session started and the provider reports it paid. A confirmed return
/// records the cart as an order when a backend is configured, then clears
/// the cart. Anything else renders the page and leaves the cart alone.
/// Order write failures are logged only.
#[instrument(skip(state, session, chrome))]
pub async fn success(
    State(state): State<AppState>,
    OptionalCartClient(client): OptionalCartClient,
    session: Session,
    Query(query): Query<SuccessQuery>,
    mut chrome: PageChrome,
) -> Result<CheckoutSuccessTemplate> {
    let pending = session
        .get::<PendingCheckout>(session_keys::PENDING_CHECKOUT)
        .await
        .ok()
        .flatten()
        .filter(|pending| query.session_id.as_deref() == Some(pending.session_id.as_str()));
    let Some(pending) = pending else {
        tracing::warn!("Success page reached without a matching checkout");
        return Ok(CheckoutSuccessTemplate::unconfirmed(chrome));
    };

    let Some(payments) = state.payments() else {
        return Ok(CheckoutSuccessTemplate::unconfirmed(chrome));
    };
    match payments.is_paid(&pending.session_id).await {
        Ok(true) => {}
        Ok(false) => {
            tracing::info!(checkout_session = %pending.session_id, "Checkout not paid yet");
            return Ok(CheckoutSuccessTemplate::unconfirmed(chrome));
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to confirm checkout session");
            return Ok(CheckoutSuccessTemplate::unconfirmed(chrome));
        }
    }

    if let Err(e) = session
        .remove::<PendingCheckout>(session_keys::PENDING_CHECKOUT)
        .await
    {
        tracing::warn!(error = %e, "Failed to clear pending checkout");
    }
    add_breadcrumb("checkout", "Checkout confirmed", None);

    let Some(client) = client else {
        return Ok(CheckoutSuccessTemplate {
            chrome,
            confirmed: true,
            order_id: None,
        });
    };

    let lines = state
        .with_cart(client.clone(), |cart| Ok(cart.lines().to_vec()))
        .await?;

    let mut order_id = None;
    if let Some(backend) = state.backend()
        && !lines.is_empty()
    {
        match record_order(
            backend,
            &lines,
            Some(pending.email.as_str()),
            Some(pending.session_id.as_str()),
        )
        .await
        {
            Ok(order) => order_id = Some(order.id.to_string()),
            Err(e) => tracing::error!(error = %e, "Failed to record order"),
        }
    }

    state.with_cart(client, |cart| cart.clear_cart()).await?;
    chrome.cart_count = 0;

    Ok(CheckoutSuccessTemplate {
        chrome,
        confirmed: true,
        order_id,
    })
}
