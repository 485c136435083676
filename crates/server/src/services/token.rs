//! Stateless bearer tokens.
//!
//! Tokens are HS256-signed JWTs carrying the account id and role. They are
//! never persisted; every request verifies the signature and expiry anew.

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, errors::ErrorKind};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use shoplite_core::{AccountId, Role};

use crate::models::User;

/// Default token lifetime: one hour.
pub const DEFAULT_TTL_SECS: i64 = 3600;

/// Errors that can occur when issuing or verifying a token.
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// The token's expiry is in the past.
    #[error("token expired")]
    Expired,

    /// The token is malformed, has a bad signature, or carries
    /// unexpected claims.
    #[error("invalid token")]
    Invalid,

    /// Signing failed. Indicates a key configuration problem.
    #[error("token signing failed")]
    Signing,
}

/// The claim set embedded in every session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Account identifier.
    pub sub: AccountId,
    /// Account role at issue time.
    pub role: Role,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Issues and verifies session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    /// Create a token service from a signing secret and token lifetime.
    #[must_use]
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
            ttl,
        }
    }

    /// Issue a token asserting `user`'s identity and role.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Signing`] if encoding fails.
    pub fn issue(&self, user: &User) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        jsonwebtoken::encode(&Header::default(), &claims, &self.encoding)
            .map_err(|_| TokenError::Signing)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns [`TokenError::Expired`] for a well-formed but expired token
    /// and [`TokenError::Invalid`] for anything else that fails validation.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let mut validation = Validation::default();
        validation.leeway = 0;

        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => TokenError::Expired,
                _ => TokenError::Invalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> SecretString {
        SecretString::from("kY8#mQ2$vL9@xR4!nT6^wZ1&pC3*uB5%")
    }

    fn test_user(role: Role) -> User {
        User {
            id: AccountId::new("68b1f0c2ab34cd56ef789012"),
            username: shoplite_core::Username::parse("alice").unwrap(),
            email: None,
            role,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_roundtrip_preserves_identity() {
        let service = TokenService::new(&secret(), Duration::seconds(DEFAULT_TTL_SECS));
        let user = test_user(Role::Admin);

        let token = service.issue(&user).unwrap();
        let claims = service.verify(&token).unwrap();

        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn test_expired_token_rejected() {
        let service = TokenService::new(&secret(), Duration::seconds(-120));
        let token = service.issue(&test_user(Role::User)).unwrap();

        assert!(matches!(service.verify(&token), Err(TokenError::Expired)));
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let issuer = TokenService::new(&secret(), Duration::seconds(DEFAULT_TTL_SECS));
        let verifier = TokenService::new(
            &SecretString::from("aB3$xY9!mK2@nL5#pQ7&rT0*uW4^zC6%"),
            Duration::seconds(DEFAULT_TTL_SECS),
        );

        let token = issuer.issue(&test_user(Role::User)).unwrap();
        assert!(matches!(verifier.verify(&token), Err(TokenError::Invalid)));
    }

    #[test]
    fn test_garbage_rejected() {
        let service = TokenService::new(&secret(), Duration::seconds(DEFAULT_TTL_SECS));
        assert!(matches!(
            service.verify("not-a-token"),
            Err(TokenError::Invalid)
        ));
    }
}
