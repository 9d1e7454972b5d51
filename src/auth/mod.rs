pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::SecurityConfig;
use crate::types::RecordId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user id the token was issued to
    pub sub: String,
    /// Token id, keeps tokens issued within the same second distinct
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: &RecordId, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            sub: user_id.to_string(),
            jti: Uuid::new_v4().simple().to_string(),
            exp,
            iat: now.timestamp(),
        }
    }

    pub fn user_id(&self) -> Result<RecordId, JwtError> {
        RecordId::parse(&self.sub).map_err(|_| JwtError::InvalidSubject)
    }
}

#[derive(Debug, Error)]
pub enum JwtError {
    #[error("JWT generation error: {0}")]
    TokenGeneration(String),

    #[error("Invalid JWT secret")]
    InvalidSecret,

    #[error("Token has expired")]
    Expired,

    #[error("Invalid token: {0}")]
    Invalid(String),

    #[error("Token subject is not a valid user id")]
    InvalidSubject,
}

/// Signs and verifies HS256 bearer tokens
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry_hours: u64,
}

impl TokenIssuer {
    pub fn new(secret: &str, expiry_hours: u64) -> Result<Self, JwtError> {
        if secret.is_empty() {
            return Err(JwtError::InvalidSecret);
        }
        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            expiry_hours,
        })
    }

    pub fn from_config(security: &SecurityConfig) -> Result<Self, JwtError> {
        Self::new(&security.jwt_secret, security.jwt_expiry_hours)
    }

    /// Issue a token for the given user, valid for the configured window
    pub fn issue(&self, user_id: &RecordId) -> Result<String, JwtError> {
        self.encode(&Claims::new(user_id, self.expiry_hours))
    }

    pub fn encode(&self, claims: &Claims) -> Result<String, JwtError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| JwtError::TokenGeneration(e.to_string()))
    }

    /// Check signature and expiry, returning the embedded claims
    pub fn verify(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
                _ => JwtError::Invalid(e.to_string()),
            })
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer")
            .field("expiry_hours", &self.expiry_hours)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn issuer() -> TokenIssuer {
        TokenIssuer::new("test-secret", 12).unwrap()
    }

    #[test]
    fn issued_token_verifies_with_subject() {
        let user_id = RecordId::generate();
        let token = issuer().issue(&user_id).unwrap();

        let claims = issuer().verify(&token).unwrap();
        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.exp - claims.iat, 12 * 3600);
    }

    #[test]
    fn tokens_issued_back_to_back_differ() {
        let user_id = RecordId::generate();
        let a = issuer().issue(&user_id).unwrap();
        let b = issuer().issue(&user_id).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let other = TokenIssuer::new("another-secret", 12).unwrap();
        let token = other.issue(&RecordId::generate()).unwrap();

        assert!(matches!(issuer().verify(&token), Err(JwtError::Invalid(_))));
    }

    #[test]
    fn rejects_expired_token() {
        let mut claims = Claims::new(&RecordId::generate(), 12);
        claims.iat -= 13 * 3600;
        claims.exp = Utc::now().timestamp() - 3600;
        let token = issuer().encode(&claims).unwrap();

        assert!(matches!(issuer().verify(&token), Err(JwtError::Expired)));
    }

    #[test]
    fn rejects_garbage() {
        assert!(issuer().verify("not-a-token").is_err());
        assert!(matches!(TokenIssuer::new("", 12), Err(JwtError::InvalidSecret)));
    }
}
