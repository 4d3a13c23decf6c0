//! Caller identity from the `token` session cookie.

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use readrise_core::model::UserId;

use super::{ApiError, AppState};

/// Name of the session cookie.
pub const TOKEN_COOKIE: &str = "token";

/// A verified player; rejects anonymous callers with 401.
#[derive(Debug, Clone)]
pub struct Player(pub UserId);

/// The caller, if they presented a valid session token.
#[derive(Debug, Clone)]
pub struct MaybePlayer(pub Option<UserId>);

/// Value of the `token` cookie across all `Cookie` headers.
#[must_use]
pub fn token_cookie(headers: &HeaderMap) -> Option<&str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == TOKEN_COOKIE)
        .map(|(_, value)| value.trim_matches('"'))
        .filter(|value| !value.is_empty())
}

fn identify(parts: &Parts, state: &AppState) -> Option<UserId> {
    let token = token_cookie(&parts.headers);
    state.tokens.as_ref()?.identify(token)
}

impl FromRequestParts<AppState> for MaybePlayer {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        Ok(MaybePlayer(identify(parts, state)))
    }
}

impl FromRequestParts<AppState> for Player {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, ApiError> {
        identify(parts, state)
            .map(Player)
            .ok_or(ApiError::Unauthorized)
    }
}
