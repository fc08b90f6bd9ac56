use std::time::Duration;

use axum::extract::FromRef;
use jsonwebtoken::{encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use time::OffsetDateTime;
use tracing::debug;

use crate::state::AppState;

/// Fixed signing algorithm; not configurable.
pub const ALGORITHM: Algorithm = Algorithm::HS256;

/// Decode failures. Signature mismatch and structural garbage are folded
/// into `Malformed` so callers cannot probe which one it was.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum TokenError {
    #[error("token expired")]
    Expired,
    #[error("token malformed or signature invalid")]
    Malformed,
    #[error("token subject claim missing")]
    MissingSubject,
}

/// Wire-format claims. `sub` is optional in the serde model so a signed
/// token without a subject is detectable rather than a parse error.
#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    #[serde(skip_serializing_if = "Option::is_none")]
    sub: Option<String>,
    exp: i64,
    iat: i64,
}

/// Verified claims handed back to the resolver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenClaims {
    pub subject: String,
    pub expires_at: i64,
}

/// Encodes and decodes signed access tokens with the process-wide secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_ttl: Duration,
}

impl FromRef<AppState> for TokenCodec {
    fn from_ref(state: &AppState) -> Self {
        let auth = &state.config.auth;
        Self::new(
            &auth.secret,
            Duration::from_secs((auth.token_ttl_minutes.max(0) as u64) * 60),
        )
    }
}

impl TokenCodec {
    pub fn new(secret: &str, access_ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_ttl,
        }
    }

    /// Sign a token for `subject` that expires `ttl` from now.
    pub fn encode(&self, subject: &str, ttl: Duration) -> anyhow::Result<String> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = Claims {
            sub: Some(subject.to_string()),
            exp: now + ttl.as_secs() as i64,
            iat: now,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(subject, ttl_secs = ttl.as_secs(), "access token signed");
        Ok(token)
    }

    /// Sign a token with the configured default lifetime.
    pub fn issue(&self, subject: &str) -> anyhow::Result<String> {
        self.encode(subject, self.access_ttl)
    }

    /// Verify signature, then expiry, then the subject claim.
    pub fn decode(&self, token: &str) -> Result<TokenClaims, TokenError> {
        // Expiry is checked by hand below: the library's leeway would let a
        // freshly expired token pass for another minute.
        let mut validation = Validation::new(ALGORITHM);
        validation.validate_exp = false;
        validation.required_spec_claims = Default::default();

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map_err(|_| TokenError::Malformed)?;

        let now = OffsetDateTime::now_utc().unix_timestamp();
        if data.claims.exp <= now {
            return Err(TokenError::Expired);
        }
        match data.claims.sub {
            Some(subject) if !subject.is_empty() => Ok(TokenClaims {
                subject,
                expires_at: data.claims.exp,
            }),
            _ => Err(TokenError::MissingSubject),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn codec() -> TokenCodec {
        TokenCodec::new("test-secret", Duration::from_secs(30 * 60))
    }

    #[test]
    fn encode_decode_roundtrip() {
        let codec = codec();
        let token = codec.issue("alice@example.com").expect("sign");
        let claims = codec.decode(&token).expect("decode");
        assert_eq!(claims.subject, "alice@example.com");
        assert!(claims.expires_at > OffsetDateTime::now_utc().unix_timestamp());
    }

    #[test]
    fn zero_ttl_is_expired_immediately() {
        let codec = codec();
        let token = codec.encode("alice@example.com", Duration::ZERO).expect("sign");
        assert_eq!(codec.decode(&token), Err(TokenError::Expired));
    }

    #[test]
    fn tampered_signature_is_malformed() {
        let codec = codec();
        let token = codec.issue("alice@example.com").expect("sign");
        // Flip the last character of the signature segment.
        let mut tampered = token.clone();
        let last = tampered.pop().unwrap();
        tampered.push(if last == 'A' { 'B' } else { 'A' });
        assert_ne!(token, tampered);
        assert_eq!(codec.decode(&tampered), Err(TokenError::Malformed));
    }

    #[test]
    fn foreign_secret_is_malformed() {
        let token = codec().issue("alice@example.com").expect("sign");
        let other = TokenCodec::new("another-secret", Duration::from_secs(60));
        assert_eq!(other.decode(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn valid_signature_without_subject_is_missing_subject() {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let claims = serde_json::json!({ "exp": now + 600, "iat": now });
        let token = encode(
            &Header::new(ALGORITHM),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .expect("sign");
        assert_eq!(codec().decode(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn empty_subject_counts_as_missing() {
        let token = codec().issue("").expect("sign");
        assert_eq!(codec().decode(&token), Err(TokenError::MissingSubject));
    }

    #[test]
    fn structural_garbage_is_malformed() {
        assert_eq!(codec().decode("not.a.token"), Err(TokenError::Malformed));
        assert_eq!(codec().decode(""), Err(TokenError::Malformed));
    }
}
