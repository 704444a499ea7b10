//! Session extractors for the visitor's cart key and flash notices.

use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::cart::ClientKey;
use crate::error::AppError;
use crate::models::{Notice, session_keys};

/// Extractor that yields the visitor's client key, minting and storing a new
/// one on first use.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(CartClient(client): CartClient) -> impl IntoResponse {
///     format!("cart for {client}")
/// }
/// ```
pub struct CartClient(pub ClientKey);

impl<S> FromRequestParts<S> for CartClient
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let session = session_from_parts(parts)?;

        if let Some(client) = stored_client_key(session).await {
            return Ok(Self(client));
        }

        let client = ClientKey::generate();
        session
            .insert(session_keys::CLIENT_KEY, &client)
            .await
            .map_err(|e| AppError::Session(e).into_response())?;
        tracing::debug!(%client, "Minted cart client key");

        Ok(Self(client))
    }
}

/// Extractor that yields the visitor's client key if one exists, without
/// creating a session for read-only pages.
pub struct OptionalCartClient(pub Option<ClientKey>);

impl<S> FromRequestParts<S> for OptionalCartClient
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let client = match parts.extensions.get::<Session>() {
            Some(session) => stored_client_key(session).await,
            None => None,
        };

        Ok(Self(client))
    }
}

/// Extractor that takes (and removes) the pending flash notice.
pub struct Flash(pub Option<Notice>);

impl<S> FromRequestParts<S> for Flash
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let notice = match parts.extensions.get::<Session>() {
            Some(session) => session
                .remove::<Notice>(session_keys::FLASH)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(notice))
    }
}

/// Helper to queue a flash notice for the next page render.
///
/// Failures are logged; a lost notice never fails the request.
pub async fn set_flash(session: &Session, notice: Notice) {
    if let Err(e) = session.insert(session_keys::FLASH, notice).await {
        tracing::warn!(error = %e, "Failed to store flash notice");
    }
}

fn session_from_parts(parts: &Parts) -> Result<&Session, Response> {
    parts.extensions.get::<Session>().ok_or_else(|| {
        AppError::Internal("session layer missing".to_string()).into_response()
    })
}

async fn stored_client_key(session: &Session) -> Option<ClientKey> {
    match session.get::<ClientKey>(session_keys::CLIENT_KEY).await {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "Unreadable cart client key in session");
            None
        }
    }
}
