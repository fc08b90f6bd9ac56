use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, TokenResponse},
        extractors::CurrentUser,
        password,
        token::TokenCodec,
    },
    error::AppError,
    state::AppState,
    users::dto::PublicUser,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/auth/token", post(login))
        .route("/me", get(me))
}

/// Exchange email + password for a bearer token.
///
/// Unknown email and wrong password take different internal branches but
/// share one outward response.
#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .users
        .find_by_email(&form.username)
        .await
        .map_err(AppError::Internal)?;

    let Some(user) = user else {
        warn!(kind = "invalid_credentials", "login failed");
        return Err(AppError::InvalidCredentials);
    };

    let ok = password::verify_password_async(form.password, user.password_hash.clone()).await?;
    if !ok {
        warn!(kind = "invalid_credentials", user_id = user.id, "login failed");
        return Err(AppError::InvalidCredentials);
    }

    let codec = TokenCodec::from_ref(&state);
    let access_token = codec.issue(&user.email)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(PublicUser::from(user))
}
