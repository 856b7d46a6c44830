//! HS256 JWT verification.
//!
//! Tokens are issued by the login service; this side only verifies them.

use async_trait::async_trait;
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::domain::{AuthError, AuthVerifier, Identity, UserId, Username};

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtClaims {
    pub user_id: i64,
    pub username: String,
    /// Expiry, seconds since the Unix epoch
    pub exp: u64,
}

pub struct JwtAuthVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl JwtAuthVerifier {
    pub fn new(secret: &[u8]) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        Self {
            key: DecodingKey::from_secret(secret),
            validation,
        }
    }
}

#[async_trait]
impl AuthVerifier for JwtAuthVerifier {
    async fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        if token.is_empty() {
            return Err(AuthError::MissingToken);
        }

        let data = decode::<JwtClaims>(token, &self.key, &self.validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                _ => AuthError::InvalidToken(e.to_string()),
            }
        })?;

        let username = Username::new(data.claims.username)
            .map_err(|e| AuthError::InvalidToken(e.to_string()))?;
        Ok(Identity::new(UserId::new(data.claims.user_id), username))
    }
}
