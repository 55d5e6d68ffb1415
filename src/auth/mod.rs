use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::database::models::User;
use crate::database::DatabaseError;

pub mod provider;

pub use provider::{CredentialVerifier, HttpCredentialVerifier, ProviderError};

const ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User email
    pub sub: String,
    pub user_id: i32,
    pub name: String,
    pub exp: i64,
    pub iat: i64,
    pub jti: String,
}

impl Claims {
    pub fn new(user: &User, expire_minutes: i64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::minutes(expire_minutes)).timestamp();

        Self {
            sub: user.email.clone(),
            user_id: user.id,
            name: user.name.clone(),
            exp,
            iat: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Incorrect email or password")]
    InvalidCredentials,

    #[error("Missing bearer token: {0}")]
    MissingToken(&'static str),

    #[error("Token has expired")]
    TokenExpired,

    #[error("Could not validate credentials: {0}")]
    TokenInvalid(String),

    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Database(#[from] DatabaseError),
}

/// Sign a token for `user`, valid for the configured number of minutes.
pub fn issue_token(user: &User, security: &SecurityConfig) -> Result<String, AuthError> {
    let claims = Claims::new(user, security.access_token_expire_minutes);
    encode_claims(&claims, security)
}

pub fn encode_claims(claims: &Claims, security: &SecurityConfig) -> Result<String, AuthError> {
    if security.secret_key.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(security.secret_key.as_bytes());
    encode(&Header::new(ALGORITHM), claims, &encoding_key)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))
}

/// Check signature and expiry and return the token's claims. Any unexpired
/// token with a valid signature is accepted; there is no revocation list.
pub fn verify_token(token: &str, security: &SecurityConfig) -> Result<Claims, AuthError> {
    if security.secret_key.is_empty() {
        return Err(AuthError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(security.secret_key.as_bytes());
    let mut validation = Validation::new(ALGORITHM);
    validation.leeway = 0;

    decode::<Claims>(token, &decoding_key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            _ => AuthError::TokenInvalid(e.to_string()),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    fn security() -> SecurityConfig {
        let mut security = AppConfig::development().security;
        security.secret_key = "test-secret-key".to_string();
        security
    }

    fn grace() -> User {
        User {
            id: 1,
            name: "Grace Hopper".to_string(),
            email: "grace@plymouth.ac.uk".to_string(),
        }
    }

    #[test]
    fn issued_token_verifies() {
        let security = security();
        let token = issue_token(&grace(), &security).unwrap();
        let claims = verify_token(&token, &security).unwrap();

        assert_eq!(claims.sub, "grace@plymouth.ac.uk");
        assert_eq!(claims.user_id, 1);
        assert_eq!(claims.name, "Grace Hopper");
        assert_eq!(claims.exp - claims.iat, 30 * 60);
    }

    #[test]
    fn tokens_get_distinct_ids() {
        let security = security();
        let a = verify_token(&issue_token(&grace(), &security).unwrap(), &security).unwrap();
        let b = verify_token(&issue_token(&grace(), &security).unwrap(), &security).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn expired_token_is_rejected() {
        let security = security();
        let mut claims = Claims::new(&grace(), 30);
        claims.iat -= 7200;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = encode_claims(&claims, &security).unwrap();

        assert!(matches!(verify_token(&token, &security), Err(AuthError::TokenExpired)));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = issue_token(&grace(), &security()).unwrap();
        let mut other = security();
        other.secret_key = "another-secret".to_string();

        assert!(matches!(verify_token(&token, &other), Err(AuthError::TokenInvalid(_))));
    }

    #[test]
    fn garbage_token_is_rejected() {
        assert!(matches!(
            verify_token("not.a.token", &security()),
            Err(AuthError::TokenInvalid(_))
        ));
    }

    #[test]
    fn empty_secret_cannot_sign() {
        let mut security = security();
        security.secret_key.clear();
        assert!(matches!(issue_token(&grace(), &security), Err(AuthError::InvalidSecret)));
    }
}
