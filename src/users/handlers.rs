use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info, instrument};

use crate::{
    auth::{extractors::AdminUser, password},
    error::AppError,
    state::AppState,
    users::dto::{PublicUser, RegisterRequest},
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/users", post(register))
        .route("/users/all", get(list_all))
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<PublicUser>), AppError> {
    if !is_valid_email(&payload.email) {
        return Err(AppError::Validation("invalid email address".into()));
    }
    if payload.password.len() < 8 {
        return Err(AppError::Validation(
            "password must be at least 8 characters".into(),
        ));
    }

    if state
        .users
        .find_by_email(&payload.email)
        .await
        .map_err(AppError::Internal)?
        .is_some()
    {
        return Err(AppError::EmailTaken);
    }

    let digest = password::hash_password_async(payload.password).await?;
    let user = state
        .users
        .create(&payload.email, &digest)
        .await
        .map_err(AppError::Internal)?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((StatusCode::CREATED, Json(PublicUser::from(user))))
}

/// Admin-only listing of every registered user.
#[instrument(skip(state, admin))]
pub async fn list_all(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
) -> Result<Json<Vec<PublicUser>>, AppError> {
    debug!(admin_id = admin.id, "admin listing all users");
    let users = state.users.list().await.map_err(AppError::Internal)?;
    Ok(Json(users.into_iter().map(PublicUser::from).collect()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::testing::{fake_state, MemoryUserStore};
    use crate::users::repo::UserStore;
    use std::sync::Arc;

    fn request(email: &str, password: &str) -> Json<RegisterRequest> {
        Json(RegisterRequest {
            email: email.into(),
            password: password.into(),
        })
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("alice@example.com"));
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("a b@example.com"));
    }

    #[tokio::test]
    async fn register_stores_digest_not_plaintext() {
        let store = Arc::new(MemoryUserStore::default());
        let state = fake_state(store.clone());
        register(State(state), request("alice@example.com", "password123"))
            .await
            .unwrap();
        let user = store
            .find_by_email("alice@example.com")
            .await
            .unwrap()
            .unwrap();
        assert_ne!(user.password_hash, "password123");
        assert!(password::verify_password("password123", &user.password_hash).unwrap());
    }

    #[tokio::test]
    async fn register_rejects_short_password_and_bad_email() {
        let state = fake_state(Arc::new(MemoryUserStore::default()));
        let err = register(State(state.clone()), request("alice@example.com", "short"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        let err = register(State(state), request("not-an-email", "password123"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let state = fake_state(Arc::new(MemoryUserStore::default()));
        register(State(state.clone()), request("alice@example.com", "password123"))
            .await
            .unwrap();
        let err = register(State(state), request("alice@example.com", "otherpass99"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EmailTaken));
    }

    #[tokio::test]
    async fn registration_never_grants_admin() {
        let store = Arc::new(MemoryUserStore::default());
        let state = fake_state(store.clone());
        let (_, Json(user)) = register(State(state), request("alice@example.com", "password123"))
            .await
            .unwrap();
        assert!(!user.is_admin);
    }
}
