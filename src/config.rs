use serde::Deserialize;
use tracing::warn;

/// Insecure fallback signing secret for local development only.
pub const DEV_SECRET: &str = "dev-secret-do-not-deploy";

#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    pub secret: String,
    pub token_ttl_minutes: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub auth: AuthConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let secret = match std::env::var("AUTH_SECRET") {
            Ok(s) if !s.is_empty() => s,
            _ => {
                warn!("AUTH_SECRET not set; using the insecure development default");
                DEV_SECRET.to_string()
            }
        };
        let auth = AuthConfig {
            secret,
            token_ttl_minutes: std::env::var("TOKEN_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(30),
        };
        Ok(Self { database_url, auth })
    }
}
