use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// bcrypt work factor; matches the account base this service migrated from
const BCRYPT_COST: u32 = 10;

/// Token lifetime: seven days
const TOKEN_TTL_SECS: i64 = 7 * 24 * 60 * 60;

/// Authentication errors
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Missing bearer token")]
    MissingToken,
}

/// JWT claims carried by every bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: Uuid,
    pub iat: i64,
    pub exp: i64,
}

/// Password hashing and token issuance/verification
#[derive(Clone)]
pub struct AuthService {
    jwt_secret: String,
}

impl AuthService {
    pub fn new(jwt_secret: String) -> Self {
        Self { jwt_secret }
    }

    /// Hash a plain-text password with bcrypt
    pub fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        bcrypt::hash(password, BCRYPT_COST).map_err(|e| AuthError::HashingFailed(e.to_string()))
    }

    /// Compare a plain-text password against a stored hash
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AuthError> {
        bcrypt::verify(password, hash).map_err(|e| AuthError::HashingFailed(e.to_string()))
    }

    /// Issue a signed JWT for a user id
    pub fn generate_token(&self, user_id: Uuid) -> Result<String, AuthError> {
        let now = Utc::now().timestamp();
        let claims = Claims {
            sub: user_id,
            iat: now,
            exp: now + TOKEN_TTL_SECS,
        };

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_bytes()),
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))
    }

    /// Verify and decode a JWT, returning its claims
    pub fn verify_token(&self, token: &str) -> Result<Claims, AuthError> {
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_bytes()),
            &validation,
        )
        .map_err(|e| AuthError::InvalidToken(e.to_string()))?;

        Ok(token_data.claims)
    }
}
