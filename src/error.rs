use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;
use tracing::{error, warn};

use crate::auth::password::HashError;
use crate::auth::token::TokenError;

/// Internal failure taxonomy. Variants stay specific for logging; the
/// [`IntoResponse`] impl collapses them at the boundary so clients cannot
/// distinguish between, say, an expired token and a deleted account.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("token expired")]
    TokenExpired,
    #[error("token malformed")]
    TokenMalformed,
    #[error("token subject missing")]
    TokenSubjectMissing,
    #[error("token subject unknown")]
    TokenSubjectUnknown,
    #[error("administrator privileges required")]
    InsufficientPrivilege,
    #[error("not the owner of this {0}")]
    OwnershipViolation(&'static str),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("email already registered")]
    EmailTaken,
    #[error("{0}")]
    Validation(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

impl AppError {
    /// Stable failure-kind tag for structured logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidCredentials => "invalid_credentials",
            Self::TokenExpired => "token_expired",
            Self::TokenMalformed => "token_malformed",
            Self::TokenSubjectMissing => "token_subject_missing",
            Self::TokenSubjectUnknown => "token_subject_unknown",
            Self::InsufficientPrivilege => "insufficient_privilege",
            Self::OwnershipViolation(_) => "ownership_violation",
            Self::NotFound(_) => "not_found",
            Self::EmailTaken => "email_taken",
            Self::Validation(_) => "validation",
            Self::Internal(_) => "internal",
        }
    }
}

impl From<TokenError> for AppError {
    fn from(e: TokenError) -> Self {
        match e {
            TokenError::Expired => Self::TokenExpired,
            TokenError::Malformed => Self::TokenMalformed,
            TokenError::MissingSubject => Self::TokenSubjectMissing,
        }
    }
}

impl From<HashError> for AppError {
    fn from(e: HashError) -> Self {
        match e {
            HashError::EmptyPassword => Self::Validation("password must not be empty".into()),
            // An unparsable stored digest means the record is corrupt, not
            // that the caller did anything wrong.
            other => Self::Internal(anyhow::anyhow!(other)),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        let (status, detail, bearer) = match &self {
            Self::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "incorrect email or password".to_string(),
                true,
            ),
            Self::TokenExpired
            | Self::TokenMalformed
            | Self::TokenSubjectMissing
            | Self::TokenSubjectUnknown => (
                StatusCode::UNAUTHORIZED,
                "could not validate credentials".to_string(),
                true,
            ),
            Self::InsufficientPrivilege => (
                StatusCode::FORBIDDEN,
                "administrator privileges required".to_string(),
                false,
            ),
            // Ownership violations render exactly like a missing row so the
            // existence of another user's resource is never disclosed.
            Self::OwnershipViolation(resource) | Self::NotFound(resource) => {
                (StatusCode::NOT_FOUND, format!("{resource} not found"), false)
            }
            Self::EmailTaken => (
                StatusCode::BAD_REQUEST,
                "email already registered".to_string(),
                false,
            ),
            Self::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone(), false),
            Self::Internal(e) => {
                error!(error = %e, "internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal server error".to_string(),
                    false,
                )
            }
        };
        if status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!(kind, status = %status, "request failed");
        }
        let mut response = (status, Json(ErrorBody { detail })).into_response();
        if bearer {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static("Bearer"),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_of(err: AppError) -> (StatusCode, bool, Vec<u8>) {
        let resp = err.into_response();
        let status = resp.status();
        let bearer = resp.headers().contains_key(header::WWW_AUTHENTICATE);
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, bearer, bytes.to_vec())
    }

    #[tokio::test]
    async fn all_token_failures_collapse_to_one_response() {
        let (s1, b1, body1) = body_of(AppError::TokenExpired).await;
        let (s2, b2, body2) = body_of(AppError::TokenMalformed).await;
        let (s3, b3, body3) = body_of(AppError::TokenSubjectMissing).await;
        let (s4, b4, body4) = body_of(AppError::TokenSubjectUnknown).await;
        assert_eq!(s1, StatusCode::UNAUTHORIZED);
        assert_eq!([s1, s2, s3], [s2, s3, s4]);
        assert!(b1 && b2 && b3 && b4);
        assert_eq!(body1, body2);
        assert_eq!(body2, body3);
        assert_eq!(body3, body4);
    }

    #[tokio::test]
    async fn login_failure_is_generic_with_bearer_challenge() {
        let (status, bearer, body) = body_of(AppError::InvalidCredentials).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(bearer);
        let text = String::from_utf8(body).unwrap();
        assert!(text.contains("incorrect email or password"));
        assert!(!text.contains("user"));
        assert!(!text.contains("password mismatch"));
    }

    #[tokio::test]
    async fn ownership_violation_renders_as_not_found() {
        let (s1, _, body1) = body_of(AppError::OwnershipViolation("task")).await;
        let (s2, _, body2) = body_of(AppError::NotFound("task")).await;
        assert_eq!(s1, StatusCode::NOT_FOUND);
        assert_eq!(s1, s2);
        assert_eq!(body1, body2);
    }

    #[tokio::test]
    async fn privilege_failure_is_distinguishable() {
        let (status, bearer, body) = body_of(AppError::InsufficientPrivilege).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(!bearer);
        assert!(String::from_utf8(body)
            .unwrap()
            .contains("administrator privileges required"));
    }

    #[tokio::test]
    async fn internal_errors_never_leak_details() {
        let (status, _, body) = body_of(AppError::Internal(anyhow::anyhow!("db password: hunter2"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!String::from_utf8(body).unwrap().contains("hunter2"));
    }
}
