use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tracing::warn;

use super::guard::require_admin;
use super::token::TokenCodec;
use crate::error::AppError;
use crate::state::AppState;
use crate::users::repo::{User, UserStore};

/// Resolve a bearer token to a user record.
///
/// Every failure branch (expired, malformed, subject missing, subject no
/// longer exists) keeps its specific variant internally but renders as the
/// same generic 401, so the caller learns nothing about why.
pub async fn resolve_identity(
    token: &str,
    codec: &TokenCodec,
    users: &dyn UserStore,
) -> Result<User, AppError> {
    let claims = codec.decode(token)?;
    users
        .find_by_email(&claims.subject)
        .await
        .map_err(AppError::Internal)?
        .ok_or(AppError::TokenSubjectUnknown)
}

/// The authenticated identity of the current request.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // A missing or non-Bearer header gets the same outward signal as a
        // bad token.
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(AppError::TokenMalformed)?;
        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or(AppError::TokenMalformed)?;

        let codec = TokenCodec::from_ref(state);
        match resolve_identity(token, &codec, state.users.as_ref()).await {
            Ok(user) => Ok(CurrentUser(user)),
            Err(e) => {
                warn!(kind = e.kind(), "authentication failed");
                Err(e)
            }
        }
    }
}

/// `CurrentUser` plus the admin role gate.
#[derive(Debug)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        require_admin(&user)?;
        Ok(AdminUser(user))
    }
}
