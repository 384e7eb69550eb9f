//! # JWT Token Management
//!
//! Issuing and verifying signed, time-limited bearer tokens.
//!
//! A [`TokenService`] is built once from the signing secret and the token lifetime
//! and then shared (it is cheap to clone). Tokens are HS256 JWTs carrying the user id
//! and an `exp` claim. Verification collapses every failure (bad format, bad
//! signature, wrong algorithm, expired) into `None`; the reason is logged at debug
//! level and never handed to the caller.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use lib_utils::now_utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

// region:    --- Error
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to encode token: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("failed to decode token: {0}")]
    Decode(jsonwebtoken::errors::Error),
}
// endregion: --- Error

/// JWT claims carried by every issued token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Id of the authenticated user
    pub user_id: i64,
    /// Issued at time (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Issues and verifies tokens with a process-wide signing secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    lifetime: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("secret", &"***REDACTED***")
            .field("lifetime", &self.lifetime)
            .finish()
    }
}

impl TokenService {
    /// Create a token service signing with `secret`; tokens live for `lifetime`.
    pub fn new(secret: &str, lifetime: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            lifetime,
        }
    }

    pub fn lifetime(&self) -> Duration {
        self.lifetime
    }

    /// Issue a token for `user_id`, valid from now for the configured lifetime.
    pub fn issue(&self, user_id: i64) -> Result<String, Error> {
        self.issue_at(user_id, now_utc())
    }

    /// Issue a token as if it had been created at `issued_at`.
    pub fn issue_at(&self, user_id: i64, issued_at: DateTime<Utc>) -> Result<String, Error> {
        let claims = Claims {
            user_id,
            iat: issued_at.timestamp(),
            exp: (issued_at + self.lifetime).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key).map_err(Error::Encode)
    }

    /// Decode a token, checking signature, algorithm and expiry.
    pub fn decode(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(Error::Decode)
    }

    /// Verify a token and return the user id it was issued for.
    pub fn verify(&self, token: &str) -> Option<i64> {
        match self.decode(token) {
            Ok(claims) => Some(claims.user_id),
            Err(e) => {
                debug!("[TOKEN] Rejected token: {}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "test-secret-key-must-be-at-least-32-chars-long!";

    fn service() -> TokenService {
        TokenService::new(SECRET, Duration::minutes(60))
    }

    #[test]
    fn test_issue_then_verify() {
        let tokens = service();
        let token = tokens.issue(7).expect("Token issuing should succeed");

        assert_eq!(tokens.verify(&token), Some(7));
    }

    #[test]
    fn test_claims_expiry_matches_lifetime() {
        let tokens = service();
        let token = tokens.issue(7).unwrap();
        let claims = tokens.decode(&token).unwrap();

        assert_eq!(claims.user_id, 7);
        assert_eq!(claims.exp - claims.iat, tokens.lifetime().num_seconds());
        assert_eq!(tokens.lifetime(), Duration::minutes(60));
    }

    #[test]
    fn test_expired_token_rejected() {
        let tokens = TokenService::new(SECRET, Duration::minutes(1));
        let issued_at = now_utc() - Duration::minutes(2);
        let token = tokens.issue_at(7, issued_at).unwrap();

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn test_token_expires_after_lifetime_elapses() {
        let tokens = TokenService::new(SECRET, Duration::seconds(1));
        let token = tokens.issue(7).unwrap();

        std::thread::sleep(std::time::Duration::from_millis(2100));

        assert_eq!(tokens.verify(&token), None);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let token = service().issue(7).unwrap();
        let other = TokenService::new("another-secret-key-that-is-32-chars-long!!", Duration::minutes(60));

        assert_eq!(other.verify(&token), None);
    }

    #[test]
    fn test_tampered_token_rejected() {
        let tokens = service();
        let token = tokens.issue(7).unwrap();

        // Swap the payload for one issued to another user, keeping the original signature.
        let forged_source = tokens.issue(8).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged_source.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], forged_parts[1], parts[2]);

        assert_eq!(tokens.verify(&forged), None);
    }

    #[test]
    fn test_garbage_rejected() {
        let tokens = service();

        assert_eq!(tokens.verify(""), None);
        assert_eq!(tokens.verify("garbage"), None);
        assert_eq!(tokens.verify("a.b.c"), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let rendered = format!("{:?}", service());
        assert!(!rendered.contains(SECRET));
    }
}
