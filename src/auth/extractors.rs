use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use base64ct::{Base64, Encoding};
use tracing::warn;

use super::BearerTokenOwner;
use crate::{error::AppError, state::AppState, users::repo_types::User};

fn authorization<'a>(parts: &'a Parts, scheme: &str) -> Result<&'a str, AppError> {
    let header = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or(AppError::Unauthorized)?;
    let (given, rest) = header.split_once(' ').ok_or(AppError::Unauthorized)?;
    if !given.eq_ignore_ascii_case(scheme) {
        return Err(AppError::Unauthorized);
    }
    Ok(rest.trim())
}

/// `Authorization: Basic base64(username:password)`.
pub struct BasicCredentials {
    pub username: String,
    pub password: String,
}

impl BasicCredentials {
    fn decode(encoded: &str) -> Option<Self> {
        let raw = Base64::decode_vec(encoded).ok()?;
        let raw = String::from_utf8(raw).ok()?;
        let (username, password) = raw.split_once(':')?;
        Some(Self {
            username: username.to_string(),
            password: password.to_string(),
        })
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for BasicCredentials
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let encoded = authorization(parts, "Basic")?;
        BasicCredentials::decode(encoded).ok_or_else(|| {
            warn!("malformed basic credentials");
            AppError::Unauthorized
        })
    }
}

/// Resolves `Authorization: Bearer <token>` to the token's owner.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let value = authorization(parts, "Bearer")?;

        let token = match state.store.find_token(value).await? {
            Some(t) if t.is_valid() => t,
            _ => {
                warn!("unknown or invalid bearer token");
                return Err(AppError::Unauthorized);
            }
        };

        match state.store.find_user_by_id(token.owner_id()).await? {
            Some(user) => Ok(CurrentUser(user)),
            None => {
                warn!(token_id = %token.id, "bearer token without owner");
                Err(AppError::Unauthorized)
            }
        }
    }
}
