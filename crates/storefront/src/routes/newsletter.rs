//! Newsletter subscription route handler.
//!
//! The sign-up form posts here from any page and is sent back where it came
//! from with a flash notice.

use axum::{Form, extract::State, response::Redirect};
use serde::Deserialize;
use shopfront_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use super::safe_return_path;
use crate::middleware::set_flash;
use crate::models::Notice;
use crate::state::AppState;

/// Newsletter subscription form data.
#[derive(Debug, Deserialize)]
pub struct SubscribeForm {
    pub email: String,
    pub redirect_to: Option<String>,
}

/// Subscribe to the newsletter.
///
/// Invalid addresses are never sent to the provider. Provider failures are
/// logged and shown as a generic notice.
#[instrument(skip(state, session, form))]
pub async fn subscribe(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<SubscribeForm>,
) -> Redirect {
    let back = safe_return_path(form.redirect_to.as_deref(), "/");

    let notice = match Email::parse(&form.email) {
        Err(e) => {
            tracing::debug!(error = %e, "Rejected newsletter email");
            Notice::error("Please enter a valid email address.")
        }
        Ok(email) => match state.newsletter().subscribe(&email).await {
            Ok(()) => {
                tracing::info!(domain = email.domain(), "Newsletter subscription successful");
                Notice::success("Successfully subscribed to newsletter!")
            }
            Err(e) => {
                tracing::warn!(error = %e, "Newsletter subscription failed");
                Notice::error("Something went wrong. Please try again.")
            }
        },
    };

    set_flash(&session, notice).await;
    Redirect::to(back)
}
