use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::AppConfig;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("password hashing failed: {0}")]
    Hash(#[from] bcrypt::BcryptError),

    #[error("token signing failed: {0}")]
    Signing(jsonwebtoken::errors::Error),

    #[error("invalid or expired token")]
    InvalidToken,

    #[error("hashing task failed: {0}")]
    Task(String),
}

// --- Passwords ---

/// One-way salted hash of `password` with the given bcrypt cost.
pub fn hash_password(password: &str, cost: u32) -> Result<String, CredentialError> {
    Ok(bcrypt::hash(password, cost)?)
}

/// Returns false for a wrong password and for a malformed hash alike.
pub fn verify_password(password: &str, hash: &str) -> bool {
    bcrypt::verify(password, hash).unwrap_or(false)
}

/// Runs `hash_password` on the blocking pool.
pub async fn hash_password_blocking(password: String, cost: u32) -> Result<String, CredentialError> {
    tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| CredentialError::Task(e.to_string()))?
}

pub async fn verify_password_blocking(password: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .unwrap_or(false)
}

// --- Tokens ---

/// Claims
///
/// The payload signed into every bearer token. Stateless: nothing is stored
/// server-side, expiry is the only revocation.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the user's id.
    pub sub: Uuid,
    /// Expiration Time (exp), seconds since the epoch.
    pub exp: usize,
    /// Issued At (iat), seconds since the epoch.
    pub iat: usize,
}

/// TokenService
///
/// Issues and verifies HS256 JWTs with a shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.jwt_secret, Duration::hours(config.token_ttl_hours))
    }

    pub fn issue_token(&self, user_id: Uuid) -> Result<String, CredentialError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now.max(0) as usize,
            exp: (now + self.ttl.num_seconds()).max(0) as usize,
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(CredentialError::Signing)
    }

    /// Fails with `InvalidToken` on expiry, signature mismatch or malformed input.
    pub fn verify_token(&self, token: &str) -> Result<Uuid, CredentialError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| {
                tracing::debug!(reason = ?e.kind(), "token rejected");
                CredentialError::InvalidToken
            })
    }
}
