//! Platform authentication helpers.
//!
//! Passwords are stored as argon2 PHC strings; callers carry an HS256 JWT
//! whose `sub` is the user id.

use argon2::Argon2;
use argon2::password_hash::{
    PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Shortest signing secret accepted at startup.
pub const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Error)]
pub enum AuthnError {
    #[error("token signing secret must be at least {MIN_SECRET_LEN} bytes")]
    WeakSecret,
    #[error("token lifetime must be a positive number of minutes, got {0}")]
    InvalidTtl(i64),
    #[error("invalid token")]
    InvalidToken,
    #[error("token expired")]
    TokenExpired,
    #[error("failed to issue token")]
    Issue(#[source] jsonwebtoken::errors::Error),
    #[error("password processing failed")]
    PasswordHash,
}

pub type AuthnResult<T> = Result<T, AuthnError>;

#[derive(Clone)]
pub struct TokenConfig {
    secret: Vec<u8>,
    ttl: Duration,
}

impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("secret", &"<redacted>")
            .field("ttl", &self.ttl)
            .finish()
    }
}

impl TokenConfig {
    pub fn new(secret: impl Into<Vec<u8>>, ttl_minutes: i64) -> AuthnResult<Self> {
        let secret = secret.into();
        if secret.len() < MIN_SECRET_LEN {
            return Err(AuthnError::WeakSecret);
        }
        let ttl = Duration::try_minutes(ttl_minutes)
            .filter(|ttl| *ttl > Duration::zero())
            .filter(|ttl| Utc::now().checked_add_signed(*ttl).is_some())
            .ok_or(AuthnError::InvalidTtl(ttl_minutes))?;
        Ok(Self { secret, ttl })
    }

    fn encoding_key(&self) -> EncodingKey {
        EncodingKey::from_secret(&self.secret)
    }

    fn decoding_key(&self) -> DecodingKey {
        DecodingKey::from_secret(&self.secret)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: Uuid,
    /// Role at issuance. Informational only; the stored user row is authoritative.
    pub role: String,
    pub iat: i64,
    pub exp: i64,
}

pub fn issue_token(user_id: Uuid, role: &str, config: &TokenConfig) -> AuthnResult<String> {
    let now = Utc::now();
    let exp = now.checked_add_signed(config.ttl).unwrap_or(now);
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };
    jsonwebtoken::encode(&Header::default(), &claims, &config.encoding_key())
        .map_err(AuthnError::Issue)
}

pub fn verify_token(token: &str, config: &TokenConfig) -> AuthnResult<Claims> {
    jsonwebtoken::decode::<Claims>(token, &config.decoding_key(), &Validation::default())
        .map(|data| data.claims)
        .map_err(|err| match err.kind() {
            ErrorKind::ExpiredSignature => AuthnError::TokenExpired,
            _ => AuthnError::InvalidToken,
        })
}

pub fn hash_password(password: &str) -> AuthnResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthnError::PasswordHash)
}

/// `Ok(false)` on mismatch; `Err` only when the stored hash is unreadable.
pub fn verify_password(password: &str, stored_hash: &str) -> AuthnResult<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|_| AuthnError::PasswordHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
